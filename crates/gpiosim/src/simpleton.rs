//! A simulator with a single chip

use crate::bank::Bank;
use crate::builder::builder;
use crate::chip::Chip;
use crate::env::Environment;
use crate::error::Result;
use crate::sim::Sim;
use std::ops::Deref;

/// Label given to the chip of a [`Simpleton`]
pub const SIMPLETON_LABEL: &str = "simpleton";

/// A simulator with one chip of vanilla lines, no names or hogs.
///
/// Derefs to its [`Chip`], so line operations can be called on it directly.
///
/// ```no_run
/// let s = gpiosim::Simpleton::new(12)?;
/// s.pull_up(5)?;
/// let level = s.level(3)?;
/// # Ok::<(), gpiosim::GpioSimError>(())
/// ```
///
/// Closing consumes the simulator, so the chip can't be used afterwards:
///
/// ```compile_fail
/// let s = gpiosim::Simpleton::new(12)?;
/// s.close()?;
/// s.pull_up(5)?;
/// # Ok::<(), gpiosim::GpioSimError>(())
/// ```
#[derive(Debug)]
pub struct Simpleton {
    sim: Sim,
    chip: Chip,
}

impl Simpleton {
    /// Take a single chip simulator with `num_lines` lines live.
    pub fn new(num_lines: u32) -> Result<Self> {
        Self::build(builder(), num_lines)
    }

    /// As [`Simpleton::new`], but created under the given roots.
    pub fn with_env(env: Environment, num_lines: u32) -> Result<Self> {
        Self::build(builder().with_env(env), num_lines)
    }

    fn build(b: crate::Builder, num_lines: u32) -> Result<Self> {
        let sim = b.with_bank(&Bank::new(SIMPLETON_LABEL, num_lines)).live()?;
        let chip = sim.chips()[0].clone();
        Ok(Self { sim, chip })
    }

    /// The chip being simulated
    pub fn chip(&self) -> &Chip {
        &self.chip
    }

    /// The underlying simulator
    pub fn sim(&self) -> &Sim {
        &self.sim
    }

    /// Close the simulator, removing the chip.
    ///
    /// Dropping the `Simpleton` does the same, but without the result.
    pub fn close(mut self) -> Result<()> {
        self.sim.close()
    }
}

impl Deref for Simpleton {
    type Target = Chip;

    fn deref(&self) -> &Chip {
        &self.chip
    }
}
