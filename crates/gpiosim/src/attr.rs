//! Reading and writing configfs and sysfs attributes
//!
//! Both filesystems expose each attribute as a small text file. Reads come
//! back with a trailing newline which is stripped here, writes are a single
//! `write(2)` of the value.

use crate::error::{GpioSimError, Result};
use log::trace;
use std::path::Path;

/// Read an attribute from the directory `dir`, with trailing whitespace removed.
pub fn read_attr(dir: &Path, attr: &str) -> Result<String> {
    let path = dir.join(attr);
    let content = std::fs::read_to_string(&path).map_err(|e| GpioSimError::AttrRead {
        path: path.clone(),
        source: e,
    })?;
    let value = content.trim_end().to_string();
    trace!("read {} = '{}'", path.display(), value);
    Ok(value)
}

/// Write `value` to an attribute in the directory `dir`.
pub fn write_attr(dir: &Path, attr: &str, value: &str) -> Result<()> {
    let path = dir.join(attr);
    trace!("write {} = '{}'", path.display(), value);
    std::fs::write(&path, value).map_err(|e| GpioSimError::AttrWrite { path, source: e })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_trims_trailing_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pull"), "pull-up\n").unwrap();
        assert_eq!(read_attr(dir.path(), "pull").unwrap(), "pull-up");

        std::fs::write(dir.path().join("label"), "  left \t\n").unwrap();
        assert_eq!(read_attr(dir.path(), "label").unwrap(), "  left");
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        write_attr(dir.path(), "num_lines", "42").unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("num_lines")).unwrap(),
            "42"
        );
        assert_eq!(read_attr(dir.path(), "num_lines").unwrap(), "42");
    }

    #[test]
    fn test_missing_attribute() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_attr(dir.path(), "value").unwrap_err();
        assert!(err.is_not_found());
        match err {
            GpioSimError::AttrRead { path, .. } => assert_eq!(path, dir.path().join("value")),
            other => panic!("unexpected error: {other}"),
        }

        let err = write_attr(&dir.path().join("sim_gpio9"), "pull", "pull-up").unwrap_err();
        assert!(matches!(err, GpioSimError::AttrWrite { .. }));
        assert!(err.is_not_found());
    }
}
