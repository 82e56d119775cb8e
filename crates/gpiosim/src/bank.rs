//! Declarative description of a simulated chip

use crate::error::GpioSimError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Offset of a line within a chip
pub type Offset = u32;

/// The information required to configure one chip of a simulator.
///
/// Each bank becomes a [`Chip`](crate::Chip) when the simulator goes live.
///
/// Offsets used in `names` and `hogs` must be less than `num_lines`. This is
/// not checked here; the kernel refuses to take such a simulator live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bank {
    /// Number of lines simulated by the chip
    pub num_lines: u32,

    /// Label of the chip, as reported in the uAPI chip info
    pub label: String,

    /// Lines assigned an identifying name.
    ///
    /// Line names do not need to be unique.
    pub names: BTreeMap<Offset, String>,

    /// Lines that appear to be already in use by some other consumer
    pub hogs: BTreeMap<Offset, Hog>,
}

impl Bank {
    /// Create a bank with the given label and number of lines.
    ///
    /// The label is informational. In a test it can be used to identify the
    /// role of the chip.
    pub fn new(label: impl Into<String>, num_lines: u32) -> Self {
        Self {
            num_lines,
            label: label.into(),
            ..Default::default()
        }
    }

    /// Assign a name to a line
    pub fn name(mut self, offset: Offset, name: impl Into<String>) -> Self {
        self.names.insert(offset, name.into());
        self
    }

    /// Hog a line, making it appear in use by `consumer`
    pub fn hog(mut self, offset: Offset, consumer: impl Into<String>, direction: Direction) -> Self {
        self.hogs.insert(
            offset,
            Hog {
                consumer: consumer.into(),
                direction,
            },
        );
        self
    }
}

/// A line hog, i.e. some other user of a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hog {
    /// Name of the consumer that appears to be using the line
    pub consumer: String,

    /// Requested direction of the hogged line, and for outputs the level
    pub direction: Direction,
}

/// Direction of a hogged line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Requested as an input
    #[default]
    Input,
    /// Requested as an output driven low
    OutputLow,
    /// Requested as an output driven high
    OutputHigh,
}

impl Direction {
    /// The configfs `hog/direction` value for this direction
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::OutputLow => "output-low",
            Direction::OutputHigh => "output-high",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = GpioSimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(Direction::Input),
            "output-low" => Ok(Direction::OutputLow),
            "output-high" => Ok(Direction::OutputHigh),
            _ => Err(GpioSimError::UnexpectedAttributeValue {
                path: PathBuf::from("direction"),
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_builder() {
        let bank = Bank::new("left", 8)
            .name(3, "LED0")
            .name(5, "BUTTON1")
            .name(3, "LED1")
            .hog(2, "piggy", Direction::OutputLow);
        assert_eq!(bank.label, "left");
        assert_eq!(bank.num_lines, 8);
        assert_eq!(bank.names.len(), 2);
        assert_eq!(bank.names[&3], "LED1");
        assert_eq!(
            bank.hogs[&2],
            Hog {
                consumer: "piggy".into(),
                direction: Direction::OutputLow
            }
        );
    }

    #[test]
    fn test_direction_vocabulary() {
        for d in [Direction::Input, Direction::OutputLow, Direction::OutputHigh] {
            assert_eq!(d.as_str().parse::<Direction>().unwrap(), d);
        }
        assert_eq!(Direction::default(), Direction::Input);
        assert!(matches!(
            "output".parse::<Direction>(),
            Err(GpioSimError::UnexpectedAttributeValue { .. })
        ));
    }
}
