//! Live simulated chips and control of their lines
//!
//! Once a simulator is live each line of each chip has a directory in sysfs,
//! `/sys/devices/platform/<dev_name>/<chip_name>/sim_gpio<offset>`, holding:
//!
//! - `pull`: the pull applied to the line by the simulator, `pull-up` or
//!   `pull-down`. For input lines this is the level userspace will read.
//! - `value`: the level the line is being driven to, `0` or `1`. For output
//!   lines this is the level userspace has requested.
//!
//! Lines are identified by offset, in the range `0..num_lines`. Offsets are
//! not checked here; an out of range offset fails with the I/O error from
//! the missing attribute.

use crate::attr::{read_attr, write_attr};
use crate::bank::{Bank, Offset};
use crate::env::Environment;
use crate::error::{GpioSimError, Result};
use crate::sim;
use log::debug;
use std::fmt;
use std::ops::Not;
use std::path::{Path, PathBuf};

/// Logical level of a simulated line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Level {
    /// Line is inactive (low)
    #[default]
    Inactive,
    /// Line is active (high)
    Active,
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Inactive => Level::Active,
            Level::Active => Level::Inactive,
        }
    }
}

impl From<bool> for Level {
    fn from(active: bool) -> Self {
        if active {
            Level::Active
        } else {
            Level::Inactive
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Inactive => f.write_str("inactive"),
            Level::Active => f.write_str("active"),
        }
    }
}

const PULL_DOWN: &str = "pull-down";
const PULL_UP: &str = "pull-up";

/// A simulated gpiochip
///
/// Created when a simulator goes live, from one of its [`Bank`]s and the
/// names the kernel assigned to the device.
#[derive(Debug, Clone)]
pub struct Chip {
    /// The bank directory in configfs
    pub(crate) configfs_path: PathBuf,

    /// The gpiochip device file, e.g. "/dev/gpiochip0"
    pub(crate) dev_path: PathBuf,

    /// Name of the gpiochip in /dev and sysfs, e.g. "gpiochip0"
    pub(crate) chip_name: String,

    /// Name of the platform device in sysfs, e.g. "gpio-sim.0"
    pub(crate) dev_name: String,

    /// The chip directory in sysfs
    pub(crate) sysfs_path: PathBuf,

    /// The configuration the chip was created from
    pub(crate) cfg: Bank,
}

impl Chip {
    /// Build a chip for bank `index` of a live simulator from the identifiers
    /// the kernel assigned to it.
    ///
    /// Fails with [`GpioSimError::DeviceMasked`] if the device path is a
    /// symlink, as that would direct users of the device to some other chip.
    pub(crate) fn identify(
        env: &Environment,
        sim_path: &Path,
        index: usize,
        dev_name: &str,
        cfg: Bank,
    ) -> Result<Self> {
        let configfs_path = sim::bank_path(sim_path, index);
        let chip_name = read_attr(&configfs_path, "chip_name")?;
        let dev_path = env.dev.join(&chip_name);
        let meta = std::fs::symlink_metadata(&dev_path)?;
        if meta.file_type().is_symlink() {
            return Err(GpioSimError::DeviceMasked {
                path: dev_path,
                chip: chip_name,
            });
        }
        let sysfs_path = env.sysfs.join(dev_name).join(&chip_name);
        debug!(
            "bank{} is {} ({}), lines in {}",
            index,
            chip_name,
            dev_path.display(),
            sysfs_path.display()
        );
        Ok(Self {
            configfs_path,
            dev_path,
            chip_name,
            dev_name: dev_name.to_string(),
            sysfs_path,
            cfg,
        })
    }

    /// Get a handle to bank `index` of an already live simulator.
    ///
    /// The handle does not own the simulator; dropping it leaves the
    /// simulator in place. The configuration is read back from configfs.
    pub fn attach(env: &Environment, sim_name: &str, index: usize) -> Result<Self> {
        let sim_path = env.sim_path(sim_name);
        let dev_name = read_attr(&sim_path, "dev_name")?;
        let cfg = sim::read_bank(&sim::bank_path(&sim_path, index))?;
        Self::identify(env, &sim_path, index, &dev_name, cfg)
    }

    /// Name of the gpiochip, e.g. "gpiochip0"
    pub fn chip_name(&self) -> &str {
        &self.chip_name
    }

    /// Name of the simulator platform device, e.g. "gpio-sim.0"
    pub fn dev_name(&self) -> &str {
        &self.dev_name
    }

    /// Path to the gpiochip device, e.g. "/dev/gpiochip0"
    ///
    /// This is the path to open to access the chip via the uAPI.
    pub fn dev_path(&self) -> &Path {
        &self.dev_path
    }

    /// Path to the chip in sysfs
    pub fn sysfs_path(&self) -> &Path {
        &self.sysfs_path
    }

    /// Path to the bank in configfs
    pub fn configfs_path(&self) -> &Path {
        &self.configfs_path
    }

    /// The configuration used to create the chip
    pub fn config(&self) -> &Bank {
        &self.cfg
    }

    /// The level the line is being driven to.
    ///
    /// If the line is requested as an output this is the level userspace is
    /// driving it to. Otherwise it just echoes the pull; use [`Chip::pull`].
    pub fn level(&self, offset: Offset) -> Result<Level> {
        let value = self.attr(offset, "value")?;
        match value.as_str() {
            "0" => Ok(Level::Inactive),
            "1" => Ok(Level::Active),
            _ => Err(self.unexpected(offset, "value", value)),
        }
    }

    /// The current pull of the line
    pub fn pull(&self, offset: Offset) -> Result<Level> {
        let value = self.attr(offset, "pull")?;
        match value.as_str() {
            PULL_DOWN => Ok(Level::Inactive),
            PULL_UP => Ok(Level::Active),
            _ => Err(self.unexpected(offset, "pull", value)),
        }
    }

    /// Set the pull of the line
    pub fn set_pull(&self, offset: Offset, level: Level) -> Result<()> {
        let pull = match level {
            Level::Inactive => PULL_DOWN,
            Level::Active => PULL_UP,
        };
        self.set_attr(offset, "pull", pull)
    }

    /// Pull the line up
    pub fn pull_up(&self, offset: Offset) -> Result<()> {
        self.set_pull(offset, Level::Active)
    }

    /// Pull the line down
    pub fn pull_down(&self, offset: Offset) -> Result<()> {
        self.set_pull(offset, Level::Inactive)
    }

    /// Flip the pull of the line.
    ///
    /// Not atomic: a pull written by someone else between the read and the
    /// write is overwritten.
    pub fn toggle(&self, offset: Offset) -> Result<()> {
        let pull = self.pull(offset)?;
        self.set_pull(offset, !pull)
    }

    fn line_path(&self, offset: Offset) -> PathBuf {
        self.sysfs_path.join(format!("sim_gpio{}", offset))
    }

    fn attr(&self, offset: Offset, name: &str) -> Result<String> {
        read_attr(&self.line_path(offset), name)
    }

    fn set_attr(&self, offset: Offset, name: &str, value: &str) -> Result<()> {
        write_attr(&self.line_path(offset), name, value)
    }

    fn unexpected(&self, offset: Offset, name: &str, value: String) -> GpioSimError {
        GpioSimError::UnexpectedAttributeValue {
            path: self.line_path(offset).join(name),
            value,
        }
    }
}
