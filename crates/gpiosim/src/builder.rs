//! Building simulators and taking them live

use crate::bank::Bank;
use crate::env::Environment;
use crate::error::{GpioSimError, Result};
use crate::name::unique_name;
use crate::sim::Sim;
use log::{debug, info, warn};

/// Start building a simulator
pub fn builder() -> Builder {
    Builder::default()
}

/// Description of a simulator to be taken live.
///
/// ```no_run
/// use gpiosim::{Bank, Direction};
///
/// let sim = gpiosim::builder()
///     .with_name("gpiosim_test")
///     .with_bank(
///         &Bank::new("left", 8)
///             .name(3, "LED0")
///             .name(5, "BUTTON1")
///             .hog(2, "piggy", Direction::OutputLow),
///     )
///     .with_bank(&Bank::new("right", 42).hog(7, "hogster", Direction::OutputHigh))
///     .live()?;
///
/// let chip = &sim.chips()[0];
/// chip.pull_up(5)?;
/// let level = chip.level(3)?;
/// # Ok::<(), gpiosim::GpioSimError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    /// Name of the simulator in configfs.
    ///
    /// A unique name is generated if none is set when [`live`](Builder::live)
    /// is called.
    name: Option<String>,

    /// The banks to simulate, each of which becomes a chip
    banks: Vec<Bank>,

    /// Where to create the simulator, from [`Environment::from_env`] if unset
    env: Option<Environment>,
}

impl Builder {
    /// Set the name of the simulator.
    ///
    /// Only necessary in rare cases; if you don't know you need one then you
    /// don't. The name must not be in use by any other simulator on the system.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a bank to the simulator.
    pub fn with_bank(mut self, bank: &Bank) -> Self {
        self.banks.push(bank.clone());
        self
    }

    /// Create the simulator under the given roots rather than probing for them.
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// The banks added so far
    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }

    /// Create the gpio-sim configuration for the simulator and take it live.
    ///
    /// At least one bank must have been added. If anything fails once the
    /// simulator's configfs directory exists, everything created so far is
    /// removed again before the error is returned.
    pub fn live(&self) -> Result<Sim> {
        if self.banks.is_empty() {
            return Err(GpioSimError::InvalidSpecification(
                "no banks defined".into(),
            ));
        }
        let name = self.name.clone().unwrap_or_else(unique_name);
        let env = match &self.env {
            Some(env) => env.clone(),
            None => Environment::from_env()?,
        };

        let configfs_path = env.sim_path(&name);
        if configfs_path.exists() {
            return Err(GpioSimError::NameConflict(name));
        }
        // mkdir is the atomic claim on the name; losing a race to another
        // process shows up as EEXIST
        debug!("mkdir {}", configfs_path.display());
        if let Err(e) = std::fs::create_dir(&configfs_path) {
            return Err(match e.kind() {
                std::io::ErrorKind::AlreadyExists => GpioSimError::NameConflict(name),
                _ => GpioSimError::CreateDir {
                    path: configfs_path,
                    source: e,
                },
            });
        }

        let mut sim = Sim::new(name, self.banks.clone(), env);
        if let Err(e) = sim.setup() {
            if let Err(cleanup) = sim.close() {
                warn!("Failed to unwind gpio-sim {}: {}", sim.name(), cleanup);
            }
            return Err(e);
        }

        info!(
            "gpio-sim {} is live with {} chip(s): {}",
            sim.name(),
            sim.chips().len(),
            sim.chips()
                .iter()
                .map(|c| c.chip_name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(sim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::Direction;
    use std::fs;
    use std::path::Path;

    fn env(root: &Path) -> Environment {
        let env = Environment::with_roots(root.join("cfg"), root.join("sys"), root.join("dev"));
        fs::create_dir_all(&env.configfs).unwrap();
        env
    }

    #[test]
    fn test_no_banks() {
        let dir = tempfile::tempdir().unwrap();
        let env = env(dir.path());
        let err = builder().with_name("empty").with_env(env.clone()).live().unwrap_err();
        assert!(matches!(err, GpioSimError::InvalidSpecification(_)));
        // nothing was created
        assert!(fs::read_dir(&env.configfs).unwrap().next().is_none());
    }

    #[test]
    fn test_name_conflict_leaves_existing_sim() {
        let dir = tempfile::tempdir().unwrap();
        let env = env(dir.path());
        let existing = env.sim_path("taken");
        fs::create_dir_all(existing.join("bank0")).unwrap();
        fs::write(existing.join("live"), "1").unwrap();

        let err = builder()
            .with_name("taken")
            .with_bank(&Bank::new("left", 8))
            .with_env(env.clone())
            .live()
            .unwrap_err();
        match err {
            GpioSimError::NameConflict(name) => assert_eq!(name, "taken"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(existing.join("bank0").is_dir());
        assert_eq!(fs::read_to_string(existing.join("live")).unwrap(), "1");
    }

    #[test]
    fn test_missing_configfs_root() {
        let dir = tempfile::tempdir().unwrap();
        let env = Environment::with_roots(
            dir.path().join("absent"),
            dir.path().join("sys"),
            dir.path().join("dev"),
        );
        let err = builder()
            .with_bank(&Bank::new("left", 8))
            .with_env(env)
            .live()
            .unwrap_err();
        assert!(matches!(err, GpioSimError::CreateDir { .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_failed_activation_returns_original_error() {
        let dir = tempfile::tempdir().unwrap();
        let env = env(dir.path());
        // without the kernel module there is no dev_name to read back, and
        // the plain directories left behind can't be unwound, but the
        // error reported is still the activation failure
        let err = builder()
            .with_name("nokernel")
            .with_bank(&Bank::new("left", 8).hog(1, "piggy", Direction::Input))
            .with_env(env)
            .live()
            .unwrap_err();
        assert!(matches!(err, GpioSimError::AttrRead { ref path, .. } if path.ends_with("dev_name")));
    }

    #[test]
    fn test_builder_keeps_bank_order() {
        let b = builder()
            .with_bank(&Bank::new("left", 8))
            .with_bank(&Bank::new("right", 42));
        let labels: Vec<_> = b.banks().iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["left", "right"]);
    }
}
