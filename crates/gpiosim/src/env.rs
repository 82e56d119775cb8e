//! Locating gpio-sim in configfs and the related sysfs and /dev roots
//!
//! gpio-sim is configured through configfs, normally mounted at
//! `/sys/kernel/config`, and the module creates a `gpio-sim` directory there
//! once it is loaded. The chips it creates appear as platform devices in sysfs
//! and as character devices in `/dev`.
//!
//! [`Environment::resolve`] probes the running system. For testing, or for
//! systems with an unusual layout, the roots can be given explicitly with
//! [`Environment::with_roots`] or through environment variables read by
//! [`Environment::from_env`]:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `GPIOSIM_CONFIGFS` | probed, usually `/sys/kernel/config/gpio-sim` |
//! | `GPIOSIM_SYSFS` | `/sys/devices/platform` |
//! | `GPIOSIM_DEVFS` | `/dev` |

use crate::error::{GpioSimError, Result};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Usual configfs mount point
const CONFIGFS_MOUNT: &str = "/sys/kernel/config";

/// Directory created in configfs by the gpio-sim module
const GPIO_SIM_DIR: &str = "gpio-sim";

/// Sysfs root of the platform devices created by gpio-sim
const SYSFS_PLATFORM_ROOT: &str = "/sys/devices/platform";

/// Device root
const DEV_ROOT: &str = "/dev";

/// Mount table of the current process
const PROC_MOUNTS: &str = "/proc/mounts";

const ENV_CONFIGFS: &str = "GPIOSIM_CONFIGFS";
const ENV_SYSFS: &str = "GPIOSIM_SYSFS";
const ENV_DEVFS: &str = "GPIOSIM_DEVFS";

/// Filesystem roots used to configure and control simulators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// gpio-sim directory in configfs (e.g. "/sys/kernel/config/gpio-sim")
    pub configfs: PathBuf,
    /// Parent of the platform devices created by gpio-sim
    pub sysfs: PathBuf,
    /// Directory containing the gpiochip character devices
    pub dev: PathBuf,
}

impl Environment {
    /// Create an environment from explicit roots, without probing the system.
    pub fn with_roots(
        configfs: impl Into<PathBuf>,
        sysfs: impl Into<PathBuf>,
        dev: impl Into<PathBuf>,
    ) -> Self {
        Self {
            configfs: configfs.into(),
            sysfs: sysfs.into(),
            dev: dev.into(),
        }
    }

    /// Use a known gpio-sim configfs root with the default sysfs and /dev roots.
    pub fn with_configfs(configfs: impl Into<PathBuf>) -> Self {
        Self::with_roots(configfs, SYSFS_PLATFORM_ROOT, DEV_ROOT)
    }

    /// Probe the system for gpio-sim, using the default sysfs and /dev roots.
    ///
    /// The configfs root is located by, in order:
    /// 1. checking the usual `/sys/kernel/config/gpio-sim`,
    /// 2. loading the gpio-sim module with `modprobe` and checking again,
    /// 3. finding (or mounting) configfs via the mount table and checking for
    ///    `gpio-sim` there.
    pub fn resolve() -> Result<Self> {
        Ok(Self::with_configfs(find_configfs_path()?))
    }

    /// Build the environment from the `GPIOSIM_*` environment variables,
    /// probing the system for whatever they leave unspecified.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var_os(key).map(PathBuf::from))
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<PathBuf>) -> Result<Self> {
        let configfs = match lookup(ENV_CONFIGFS) {
            Some(path) => {
                debug!("gpio-sim configfs root from {}: {}", ENV_CONFIGFS, path.display());
                path
            }
            None => find_configfs_path()?,
        };
        Ok(Self {
            configfs,
            sysfs: lookup(ENV_SYSFS).unwrap_or_else(|| PathBuf::from(SYSFS_PLATFORM_ROOT)),
            dev: lookup(ENV_DEVFS).unwrap_or_else(|| PathBuf::from(DEV_ROOT)),
        })
    }

    /// configfs directory of the simulator `name`
    pub fn sim_path(&self, name: &str) -> PathBuf {
        self.configfs.join(name)
    }
}

/// Find the gpio-sim directory in configfs.
fn find_configfs_path() -> Result<PathBuf> {
    let default = Path::new(CONFIGFS_MOUNT).join(GPIO_SIM_DIR);
    if default.exists() {
        return Ok(default);
    }

    debug!("{} not found, trying to load gpio-sim", default.display());
    match Command::new("modprobe").arg("gpio-sim").status() {
        Ok(status) if status.success() => {
            if default.exists() {
                return Ok(default);
            }
        }
        Ok(status) => debug!("modprobe gpio-sim failed: {}", status),
        Err(e) => debug!("failed to run modprobe: {}", e),
    }

    // configfs may be mounted somewhere unusual
    if let Ok(mount_point) = configfs_mount_point() {
        let path = mount_point.join(GPIO_SIM_DIR);
        if path.exists() {
            return Ok(path);
        }
    }

    Err(GpioSimError::EnvironmentUnavailable(
        "gpio-sim module not loaded".into(),
    ))
}

/// Find where configfs is mounted, mounting it at the usual place if it
/// is not mounted at all.
fn configfs_mount_point() -> Result<PathBuf> {
    let mounts = std::fs::read_to_string(PROC_MOUNTS)?;
    if let Some(path) = parse_configfs_mount(&mounts) {
        debug!("configfs is mounted at {}", path.display());
        return Ok(path);
    }

    debug!("configfs not mounted, mounting at {}", CONFIGFS_MOUNT);
    nix::mount::mount(
        Some("configfs"),
        CONFIGFS_MOUNT,
        Some("configfs"),
        nix::mount::MsFlags::empty(),
        None::<&str>,
    )
    .map_err(|e| {
        GpioSimError::EnvironmentUnavailable(format!("can't find configfs mountpoint: {}", e))
    })?;
    Ok(PathBuf::from(CONFIGFS_MOUNT))
}

/// Find the configfs mount point in the text of a mount table.
fn parse_configfs_mount(mounts: &str) -> Option<PathBuf> {
    mounts.lines().find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() >= 6 && fields[2] == "configfs" {
            Some(PathBuf::from(unescape_mount_field(fields[1])))
        } else {
            None
        }
    })
}

/// Undo the octal escaping (`\040` for space, etc.) used in mount tables.
fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let escaped = std::str::from_utf8(&bytes[i + 1..i + 4])
                .ok()
                .and_then(|digits| u8::from_str_radix(digits, 8).ok());
            if let Some(b) = escaped {
                out.push(b);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOUNTS: &str = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
configfs /sys/kernel/config configfs rw,nosuid,nodev,noexec,relatime 0 0
";

    #[test]
    fn test_parse_configfs_mount() {
        assert_eq!(
            parse_configfs_mount(MOUNTS),
            Some(PathBuf::from("/sys/kernel/config"))
        );
        assert_eq!(parse_configfs_mount("sysfs /sys sysfs rw 0 0\n"), None);
        // short lines are ignored
        assert_eq!(parse_configfs_mount("configfs /cfg configfs\n"), None);
    }

    #[test]
    fn test_parse_escaped_mount_point() {
        let mounts = "none /mnt/my\\040config configfs rw,relatime 0 0\n";
        assert_eq!(
            parse_configfs_mount(mounts),
            Some(PathBuf::from("/mnt/my config"))
        );
        assert_eq!(unescape_mount_field("/plain"), "/plain");
        assert_eq!(unescape_mount_field("/tail\\04"), "/tail\\04");
    }

    #[test]
    fn test_from_vars_overrides() {
        let env = Environment::from_vars(|key| match key {
            "GPIOSIM_CONFIGFS" => Some(PathBuf::from("/tmp/cfg")),
            "GPIOSIM_DEVFS" => Some(PathBuf::from("/tmp/dev")),
            _ => None,
        })
        .unwrap();
        assert_eq!(env.configfs, PathBuf::from("/tmp/cfg"));
        assert_eq!(env.sysfs, PathBuf::from(SYSFS_PLATFORM_ROOT));
        assert_eq!(env.dev, PathBuf::from("/tmp/dev"));
        assert_eq!(env.sim_path("sim0"), PathBuf::from("/tmp/cfg/sim0"));
    }
}
