//! Bank string parsing
//!
//! Banks are given on the command line as a label followed by options:
//!
//! ```text
//! left:lines=8,name=3/LED0,name=5/BUTTON1,hog=2/piggy/output-low
//! ```

use gpiosim::{Bank, Direction, Offset};
use thiserror::Error;

/// Errors in a --bank argument
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BankSpecError {
    /// Missing required option
    #[error("Missing required option '{0}' in bank '{1}'")]
    MissingOption(&'static str, String),

    /// Option without a value
    #[error("Malformed option '{0}', expected key=value")]
    MalformedOption(String),

    /// Unknown option
    #[error("Unknown bank option '{0}'")]
    UnknownOption(String),

    /// Invalid option value
    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Split a bank string into its label and its key=value options.
fn split_bank_string(s: &str) -> Result<(&str, Vec<(&str, &str)>), BankSpecError> {
    let Some((label, opts)) = s.split_once(':') else {
        return Ok((s, Vec::new()));
    };
    let options = opts
        .split(',')
        .filter(|opt| !opt.is_empty())
        .map(|opt| {
            opt.split_once('=')
                .ok_or_else(|| BankSpecError::MalformedOption(opt.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((label, options))
}

fn parse_offset(key: &'static str, value: &str) -> Result<Offset, BankSpecError> {
    value.parse().map_err(|_| BankSpecError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Parse a --bank argument into a [`Bank`]
pub fn parse_bank_string(s: &str) -> Result<Bank, BankSpecError> {
    let (label, options) = split_bank_string(s)?;
    let mut num_lines = None;
    let mut bank = Bank::new(label, 0);

    for (key, value) in options {
        match key {
            "lines" => {
                num_lines = Some(value.parse::<u32>().map_err(|_| BankSpecError::InvalidValue {
                    key: "lines",
                    value: value.to_string(),
                })?);
            }
            "name" => {
                let (offset, name) =
                    value
                        .split_once('/')
                        .ok_or_else(|| BankSpecError::InvalidValue {
                            key: "name",
                            value: value.to_string(),
                        })?;
                bank = bank.name(parse_offset("name", offset)?, name);
            }
            "hog" => {
                let mut parts = value.splitn(3, '/');
                let offset = parse_offset("hog", parts.next().unwrap_or_default())?;
                let consumer = parts.next().ok_or_else(|| BankSpecError::InvalidValue {
                    key: "hog",
                    value: value.to_string(),
                })?;
                let direction = match parts.next() {
                    Some(d) => d.parse::<Direction>().map_err(|_| BankSpecError::InvalidValue {
                        key: "hog",
                        value: value.to_string(),
                    })?,
                    None => Direction::Input,
                };
                bank = bank.hog(offset, consumer, direction);
            }
            _ => return Err(BankSpecError::UnknownOption(key.to_string())),
        }
    }

    bank.num_lines = num_lines.ok_or_else(|| BankSpecError::MissingOption("lines", label.to_string()))?;
    Ok(bank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bank_string() {
        let bank =
            parse_bank_string("left:lines=8,name=3/LED0,name=5/BUTTON1,hog=2/piggy/output-low")
                .unwrap();
        assert_eq!(
            bank,
            Bank::new("left", 8)
                .name(3, "LED0")
                .name(5, "BUTTON1")
                .hog(2, "piggy", Direction::OutputLow)
        );

        let bank = parse_bank_string("right:lines=42,hog=9/piggy").unwrap();
        assert_eq!(bank.hogs[&9].direction, Direction::Input);
    }

    #[test]
    fn test_parse_bank_string_errors() {
        assert_eq!(
            parse_bank_string("left"),
            Err(BankSpecError::MissingOption("lines", "left".into()))
        );
        assert_eq!(
            parse_bank_string("left:lines"),
            Err(BankSpecError::MalformedOption("lines".into()))
        );
        assert_eq!(
            parse_bank_string("left:lines=8,color=red"),
            Err(BankSpecError::UnknownOption("color".into()))
        );
        assert!(matches!(
            parse_bank_string("left:lines=eight"),
            Err(BankSpecError::InvalidValue { key: "lines", .. })
        ));
        assert!(matches!(
            parse_bank_string("left:lines=8,hog=2/piggy/sideways"),
            Err(BankSpecError::InvalidValue { key: "hog", .. })
        ));
        assert!(matches!(
            parse_bank_string("left:lines=8,name=LED0"),
            Err(BankSpecError::InvalidValue { key: "name", .. })
        ));
    }
}
