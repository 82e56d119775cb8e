//! TOML simulator description files
//!
//! Describes a simulator in a file rather than in code:
//!
//! ```toml
//! name = "gpiosim_test"          # optional
//!
//! [[bank]]
//! label = "left"
//! num_lines = 8
//! names = { 3 = "LED0", 5 = "BUTTON1" }
//!
//! [[bank.hog]]
//! offset = 2
//! consumer = "piggy"
//! direction = "output-low"       # input (default), output-low or output-high
//!
//! [[bank]]
//! label = "right"
//! num_lines = 42
//! ```

use crate::bank::{Bank, Direction, Offset};
use crate::builder::{builder, Builder};
use crate::error::{GpioSimError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Simulator file structure
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlSimFile {
    name: Option<String>,
    #[serde(default)]
    bank: Vec<TomlBank>,
}

/// Bank definition in TOML
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlBank {
    label: String,
    num_lines: u32,
    /// TOML keys are always strings, so offsets are parsed afterwards
    #[serde(default)]
    names: BTreeMap<String, String>,
    #[serde(default)]
    hog: Vec<TomlHog>,
}

/// Hog definition in TOML
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlHog {
    offset: Offset,
    consumer: String,
    direction: Option<String>,
}

/// A simulator description loaded from a file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimConfig {
    /// Name of the simulator, generated if not set
    pub name: Option<String>,
    /// The banks to simulate, in order
    pub banks: Vec<Bank>,
}

impl SimConfig {
    /// Load a simulator description from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GpioSimError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a simulator description from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TomlSimFile =
            toml::from_str(content).map_err(|e| GpioSimError::Config(e.to_string()))?;

        let mut banks = Vec::with_capacity(file.bank.len());
        for toml_bank in file.bank {
            let mut bank = Bank::new(toml_bank.label, toml_bank.num_lines);
            for (offset, name) in toml_bank.names {
                let offset = offset.trim().parse::<Offset>().map_err(|_| {
                    GpioSimError::Config(format!(
                        "invalid line offset '{}' in bank '{}'",
                        offset, bank.label
                    ))
                })?;
                bank = bank.name(offset, name);
            }
            for hog in toml_bank.hog {
                let direction = match hog.direction.as_deref() {
                    None => Direction::default(),
                    Some(d) => d.parse::<Direction>().map_err(|_| {
                        GpioSimError::Config(format!("invalid hog direction '{}'", d))
                    })?,
                };
                bank = bank.hog(hog.offset, hog.consumer, direction);
            }
            banks.push(bank);
        }

        Ok(Self {
            name: file.name,
            banks,
        })
    }

    /// A builder for the described simulator
    pub fn builder(&self) -> Builder {
        let mut b = builder();
        if let Some(name) = &self.name {
            b = b.with_name(name.clone());
        }
        for bank in &self.banks {
            b = b.with_bank(bank);
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_BANKS: &str = r#"
name = "gpiosim_test"

[[bank]]
label = "left"
num_lines = 8
names = { 3 = "LED0" }

[[bank.hog]]
offset = 2
consumer = "piggy"
direction = "output-low"

[[bank]]
label = "right"
num_lines = 42
names = { 3 = "BUTTON2", 4 = "LED2" }

[[bank.hog]]
offset = 7
consumer = "hogster"
direction = "output-high"

[[bank.hog]]
offset = 9
consumer = "piggy"
"#;

    #[test]
    fn test_parse_toml() {
        let config = SimConfig::from_toml_str(TWO_BANKS).unwrap();
        assert_eq!(config.name.as_deref(), Some("gpiosim_test"));
        assert_eq!(config.banks.len(), 2);
        assert_eq!(
            config.banks[0],
            Bank::new("left", 8)
                .name(3, "LED0")
                .hog(2, "piggy", Direction::OutputLow)
        );
        let right = &config.banks[1];
        assert_eq!(right.num_lines, 42);
        assert_eq!(right.names.len(), 2);
        assert_eq!(right.hogs.len(), 2);
        assert_eq!(right.hogs[&9].direction, Direction::Input);

        let b = config.builder();
        assert_eq!(b.banks(), config.banks.as_slice());
    }

    #[test]
    fn test_parse_errors() {
        let bad_offset = "[[bank]]\nlabel = \"x\"\nnum_lines = 4\nnames = { three = \"LED\" }\n";
        assert!(matches!(
            SimConfig::from_toml_str(bad_offset),
            Err(GpioSimError::Config(_))
        ));

        let bad_direction = "[[bank]]\nlabel = \"x\"\nnum_lines = 4\n[[bank.hog]]\noffset = 1\nconsumer = \"c\"\ndirection = \"sideways\"\n";
        assert!(matches!(
            SimConfig::from_toml_str(bad_direction),
            Err(GpioSimError::Config(_))
        ));

        assert!(SimConfig::from_toml_str("[[bank]]\nlabel = \"x\"\n").is_err());
        assert!(SimConfig::from_toml_str("bogus = 1\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.toml");
        fs::write(&path, TWO_BANKS).unwrap();
        let config = SimConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.banks.len(), 2);

        let err = SimConfig::from_toml_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, GpioSimError::Config(_)));
    }
}
