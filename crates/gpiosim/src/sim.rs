//! Live simulators and their configfs tree
//!
//! A simulator is configured by building a directory tree in configfs:
//!
//! ```text
//! gpio-sim/<name>/live                          "0" or "1"
//! gpio-sim/<name>/dev_name                      assigned by the kernel
//! gpio-sim/<name>/bank<i>/label
//! gpio-sim/<name>/bank<i>/num_lines
//! gpio-sim/<name>/bank<i>/chip_name             assigned by the kernel
//! gpio-sim/<name>/bank<i>/line<offset>/name
//! gpio-sim/<name>/bank<i>/line<offset>/hog/name
//! gpio-sim/<name>/bank<i>/line<offset>/hog/direction
//! ```
//!
//! Writing `1` to `live` creates the platform device and all its chips at
//! once. Removing the tree requires removing each directory individually,
//! deepest first, as configfs does not support recursive removal.

use crate::attr::{read_attr, write_attr};
use crate::bank::{Bank, Direction, Hog, Offset};
use crate::chip::Chip;
use crate::env::Environment;
use crate::error::{GpioSimError, Result};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// configfs directory of bank `index` of the simulator at `sim_path`
pub(crate) fn bank_path(sim_path: &Path, index: usize) -> PathBuf {
    sim_path.join(format!("bank{}", index))
}

/// configfs directory of a line within a bank
fn line_path(bank_path: &Path, offset: Offset) -> PathBuf {
    bank_path.join(format!("line{}", offset))
}

/// Create a configfs directory, along with any missing parents.
fn create_dir(path: &Path) -> Result<()> {
    debug!("mkdir {}", path.display());
    std::fs::create_dir_all(path).map_err(|e| GpioSimError::CreateDir {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Remove a configfs directory. A directory that is already gone is not an error.
fn remove_dir(path: &Path) -> Result<()> {
    match std::fs::remove_dir(path) {
        Ok(()) => {
            debug!("rmdir {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(GpioSimError::RemoveDir {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Read the configuration of a bank back from configfs.
pub(crate) fn read_bank(bank_path: &Path) -> Result<Bank> {
    let label = read_attr(bank_path, "label")?;
    let num_lines_str = read_attr(bank_path, "num_lines")?;
    let num_lines = num_lines_str
        .parse::<u32>()
        .map_err(|_| GpioSimError::UnexpectedAttributeValue {
            path: bank_path.join("num_lines"),
            value: num_lines_str.clone(),
        })?;

    let mut names = BTreeMap::new();
    let mut hogs = BTreeMap::new();
    for entry in std::fs::read_dir(bank_path)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(offset) = file_name
            .to_str()
            .and_then(|n| n.strip_prefix("line"))
            .and_then(|n| n.parse::<Offset>().ok())
        else {
            continue;
        };
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let hog_path = path.join("hog");
        let hogged = hog_path.is_dir();
        // configfs presents an empty name for lines that were only hogged, so
        // an empty name on a hogged line reads back as unnamed
        match read_attr(&path, "name") {
            Ok(name) if !name.is_empty() || !hogged => {
                names.insert(offset, name);
            }
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        if hogged {
            let consumer = read_attr(&hog_path, "name")?;
            let direction_str = read_attr(&hog_path, "direction")?;
            let direction = direction_str.parse::<Direction>().map_err(|_| {
                GpioSimError::UnexpectedAttributeValue {
                    path: hog_path.join("direction"),
                    value: direction_str.clone(),
                }
            })?;
            hogs.insert(offset, Hog { consumer, direction });
        }
    }

    Ok(Bank {
        num_lines,
        label,
        names,
        hogs,
    })
}

/// Keeps the first of a series of errors, logging the rest.
#[derive(Default)]
struct FirstError(Option<GpioSimError>);

impl FirstError {
    fn record(&mut self, result: Result<()>) {
        if let Err(e) = result {
            warn!("gpio-sim cleanup: {}", e);
            if self.0.is_none() {
                self.0 = Some(e);
            }
        }
    }

    fn into_result(self) -> Result<()> {
        match self.0 {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// A live gpio-sim simulator.
///
/// Each simulated chip is available through [`Sim::chips`], in the same order
/// the banks were added to the [`Builder`](crate::Builder).
///
/// The simulator is removed when closed or dropped, taking its chips with it.
#[derive(Debug)]
pub struct Sim {
    /// Name of the simulator in configfs and sysfs
    name: String,

    /// The simulated chips, empty once closed
    chips: Vec<Chip>,

    /// The configuration of each bank, used to unwind the configfs tree
    banks: Vec<Bank>,

    /// The simulator directory in configfs
    configfs_path: PathBuf,

    /// The roots the simulator was created in
    env: Environment,

    /// Set once `live` has been written, as gpio-sim rejects a repeated state
    live: bool,

    closed: bool,
}

impl Sim {
    /// Take ownership of the (empty) configfs directory of a new simulator.
    pub(crate) fn new(name: String, banks: Vec<Bank>, env: Environment) -> Self {
        let configfs_path = env.sim_path(&name);
        Self {
            name,
            chips: Vec::new(),
            banks,
            configfs_path,
            env,
            live: false,
            closed: false,
        }
    }

    /// Build the configfs tree for every bank and take the simulator live.
    ///
    /// On failure the caller is expected to [`close`](Sim::close) the sim.
    pub(crate) fn setup(&mut self) -> Result<()> {
        self.setup_configfs()?;
        write_attr(&self.configfs_path, "live", "1")?;
        self.live = true;
        let dev_name = read_attr(&self.configfs_path, "dev_name")?;
        debug!("{} is live as {}", self.name, dev_name);
        let chips = self
            .banks
            .iter()
            .enumerate()
            .map(|(i, bank)| {
                Chip::identify(&self.env, &self.configfs_path, i, &dev_name, bank.clone())
            })
            .collect::<Result<Vec<_>>>()?;
        self.chips = chips;
        Ok(())
    }

    fn setup_configfs(&self) -> Result<()> {
        for (i, bank) in self.banks.iter().enumerate() {
            let bank_path = bank_path(&self.configfs_path, i);
            create_dir(&bank_path)?;
            write_attr(&bank_path, "label", &bank.label)?;
            write_attr(&bank_path, "num_lines", &bank.num_lines.to_string())?;
            for (&offset, name) in &bank.names {
                let line_path = line_path(&bank_path, offset);
                create_dir(&line_path)?;
                write_attr(&line_path, "name", name)?;
            }
            for (&offset, hog) in &bank.hogs {
                let hog_path = line_path(&bank_path, offset).join("hog");
                create_dir(&hog_path)?;
                write_attr(&hog_path, "name", &hog.consumer)?;
                write_attr(&hog_path, "direction", hog.direction.as_str())?;
            }
        }
        Ok(())
    }

    /// Remove all the gpio-sim configuration for the sim.
    ///
    /// Every step is attempted, and paths that are already gone are skipped,
    /// so this also unwinds a partially built tree.
    fn cleanup_configfs(&self) -> Result<()> {
        let mut errors = FirstError::default();
        // the kernel tears down the device and its chips when live drops to 0
        if self.live && self.configfs_path.join("live").exists() {
            errors.record(write_attr(&self.configfs_path, "live", "0"));
        }
        for (i, bank) in self.banks.iter().enumerate() {
            let bank_path = bank_path(&self.configfs_path, i);
            if !bank_path.exists() {
                continue;
            }
            for &offset in bank.hogs.keys() {
                let line_path = line_path(&bank_path, offset);
                errors.record(remove_dir(&line_path.join("hog")));
                errors.record(remove_dir(&line_path));
            }
            for &offset in bank.names.keys() {
                errors.record(remove_dir(&line_path(&bank_path, offset)));
            }
            errors.record(remove_dir(&bank_path));
        }
        errors.record(remove_dir(&self.configfs_path));
        errors.into_result()
    }

    /// Close the simulator, removing its configuration and its chips.
    ///
    /// Returns the first error encountered, though every cleanup step is
    /// attempted regardless. Closing an already closed simulator does nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let result = self.cleanup_configfs();
        self.chips.clear();
        match &result {
            Ok(()) => info!("Closed gpio-sim {}", self.name),
            Err(e) => warn!("Closed gpio-sim {} with errors: {}", self.name, e),
        }
        result
    }

    /// Name of the simulator in configfs and sysfs.
    ///
    /// Not generally needed, other than to assist with debugging.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The simulated chips, in bank order. Empty once the sim is closed.
    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    /// The simulator directory in configfs
    pub fn configfs_path(&self) -> &Path {
        &self.configfs_path
    }

    /// The roots the simulator was created in
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Whether the simulator has been closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Read the configuration of bank `index` of the simulator `sim_name`
    /// back from configfs.
    pub fn read_bank(env: &Environment, sim_name: &str, index: usize) -> Result<Bank> {
        read_bank(&bank_path(&env.sim_path(sim_name), index))
    }

    /// Number of banks configured for the simulator `sim_name`.
    pub fn bank_count(env: &Environment, sim_name: &str) -> Result<usize> {
        let sim_path = env.sim_path(sim_name);
        let mut count = 0;
        while bank_path(&sim_path, count).is_dir() {
            count += 1;
        }
        if count == 0 && !sim_path.is_dir() {
            return Err(GpioSimError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no simulator named '{}'", sim_name),
            )));
        }
        Ok(count)
    }
}

impl Drop for Sim {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to clean up gpio-sim {}: {}", self.name, e);
        }
    }
}
