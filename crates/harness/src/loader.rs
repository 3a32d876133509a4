//! Loaders for the suite's input files.
//!
//! All three formats are line oriented:
//! - coefficient configuration: header, then `index,enable,hex_value`
//! - power-on-reset expectations: header, then `register,field,hex_value`
//! - stimulus vector: one hex value per line, order significant
//!
//! Blank lines are ignored. Any other malformed line fails the whole load,
//! since a silently dropped expectation would turn into a false PASS.

use std::fs;
use std::path::{Path, PathBuf};

use crate::common::error::LoadError;
use crate::common::parse_hex;
use crate::regs::coef::NUM_COEFS;
use crate::regs::{BitField, CoefficientConfigEntry, RegisterKind};

/// A named set of coefficient entries, one per configuration file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoefficientConfig {
    pub name: String,
    pub entries: Vec<CoefficientConfigEntry>,
}

/// One expected power-on-reset field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpectedFieldEntry {
    pub register: RegisterKind,
    pub field: BitField,
    pub expected: u32,
}

impl ExpectedFieldEntry {
    pub fn field_name(&self) -> &'static str {
        self.field.name
    }
}

struct Record<'a> {
    line: usize,
    columns: Vec<&'a str>,
}

/// Skips the header and splits the remaining non-blank lines on commas.
fn records<'a>(text: &'a str, origin: &str, arity: usize) -> Result<Vec<Record<'a>>, LoadError> {
    let mut lines = text.lines().enumerate();
    if !lines.by_ref().any(|(_, l)| !l.trim().is_empty()) {
        return Err(LoadError::MissingHeader {
            origin: origin.to_string(),
        });
    }

    let mut out = Vec::new();
    for (i, line) in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let columns: Vec<&str> = line.split(',').map(str::trim).collect();
        if columns.len() != arity {
            return Err(malformed(
                origin,
                i + 1,
                format!("expected {} columns, found {}", arity, columns.len()),
            ));
        }
        out.push(Record {
            line: i + 1,
            columns,
        });
    }
    Ok(out)
}

fn malformed(origin: &str, line: usize, reason: impl Into<String>) -> LoadError {
    LoadError::Malformed {
        origin: origin.to_string(),
        line,
        reason: reason.into(),
    }
}

fn hex_column(origin: &str, line: usize, what: &str, text: &str) -> Result<u32, LoadError> {
    parse_hex(text).ok_or_else(|| malformed(origin, line, format!("invalid hex {} '{}'", what, text)))
}

/// Parses a coefficient configuration; `origin` names the source in errors.
pub fn parse_coefficient_config(text: &str, origin: &str) -> Result<CoefficientConfig, LoadError> {
    let mut entries: Vec<CoefficientConfigEntry> = Vec::new();

    for Record { line, columns } in records(text, origin, 3)? {
        let index: usize = columns[0]
            .parse()
            .map_err(|_| malformed(origin, line, format!("invalid coefficient index '{}'", columns[0])))?;
        if index >= NUM_COEFS {
            return Err(malformed(
                origin,
                line,
                format!("coefficient index {} out of range 0..{}", index, NUM_COEFS),
            ));
        }
        if entries.iter().any(|e| e.index as usize == index) {
            return Err(malformed(origin, line, format!("coefficient {} listed twice", index)));
        }

        let enable = match columns[1] {
            "0" => false,
            "1" => true,
            other => {
                return Err(malformed(origin, line, format!("enable flag must be 0 or 1, found '{}'", other)));
            }
        };

        let value = hex_column(origin, line, "value", columns[2])?;
        let value = u8::try_from(value)
            .map_err(|_| malformed(origin, line, format!("coefficient value {:#x} exceeds 8 bits", value)))?;

        entries.push(CoefficientConfigEntry::new(index as u8, enable, value));
    }

    Ok(CoefficientConfig {
        name: origin.to_string(),
        entries,
    })
}

/// Parses a power-on-reset expectation table.
///
/// Registers are limited to `csr` and `coef`, and field names are checked
/// against the register's layout so a typo cannot pass unnoticed.
pub fn parse_expected_fields(text: &str, origin: &str) -> Result<Vec<ExpectedFieldEntry>, LoadError> {
    let mut entries = Vec::new();

    for Record { line, columns } in records(text, origin, 3)? {
        let register = match columns[0].parse::<RegisterKind>() {
            Ok(kind @ (RegisterKind::Csr | RegisterKind::Coef)) => kind,
            Ok(other) => {
                return Err(malformed(origin, line, format!("register '{}' has no power-on-reset check", other)));
            }
            Err(reason) => return Err(malformed(origin, line, reason)),
        };

        let field = *register.layout().field(columns[1]).ok_or_else(|| {
            malformed(origin, line, format!("register '{}' has no field '{}'", register, columns[1]))
        })?;

        let expected = hex_column(origin, line, "value", columns[2])?;
        if expected > field.max_value() {
            return Err(malformed(
                origin,
                line,
                format!(
                    "value {:#x} does not fit {}-bit field '{}'",
                    expected, field.width, field.name
                ),
            ));
        }

        entries.push(ExpectedFieldEntry {
            register,
            field,
            expected,
        });
    }

    if entries.is_empty() {
        return Err(LoadError::Empty {
            origin: origin.to_string(),
        });
    }
    Ok(entries)
}

/// Parses a stimulus vector. There is no header line.
pub fn parse_stimulus(text: &str, origin: &str) -> Result<Vec<u32>, LoadError> {
    let mut samples = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        samples.push(hex_column(origin, i + 1, "sample", line)?);
    }
    if samples.is_empty() {
        return Err(LoadError::Empty {
            origin: origin.to_string(),
        });
    }
    Ok(samples)
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: PathBuf::from(path),
        source,
    })
}

/// Short name for a source file: its file name, or the whole path if it has none.
pub fn origin_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn load_coefficient_config(path: &Path) -> Result<CoefficientConfig, LoadError> {
    parse_coefficient_config(&read(path)?, &origin_of(path))
}

pub fn load_expected_fields(path: &Path) -> Result<Vec<ExpectedFieldEntry>, LoadError> {
    parse_expected_fields(&read(path)?, &origin_of(path))
}

pub fn load_stimulus(path: &Path) -> Result<Vec<u32>, LoadError> {
    parse_stimulus(&read(path)?, &origin_of(path))
}
