//! Register model for the UAD filter block.
//!
//! Each register is described once, by a static [`RegisterLayout`] listing its
//! bit fields. The typed views in [`csr`], [`coef`] and [`outcap`] decode and
//! encode through the same field constants, and field-by-name lookups (used by
//! the power-on-reset check) go through the same table, so the three can never
//! disagree about where a field lives.

pub mod coef;
pub mod csr;
pub mod outcap;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::common::error::LayoutError;

pub use coef::{CoefficientConfigEntry, CoefficientRegister};
pub use csr::ControlStatusRegister;
pub use outcap::OutputCaptureRegister;

/// Bus address of the control/status register.
pub const CSR_ADDR: u32 = 0x0;
/// Bus address of the coefficient register.
pub const COEF_ADDR: u32 = 0x4;
/// Bus address of the output-capture register.
pub const OUTCAP_ADDR: u32 = 0x8;

/// A contiguous run of bits inside a 32-bit register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitField {
    pub name: &'static str,
    pub offset: u32,
    pub width: u32,
}

impl BitField {
    pub const fn new(name: &'static str, offset: u32, width: u32) -> Self {
        Self {
            name,
            offset,
            width,
        }
    }

    /// Right-aligned mask covering `width` bits.
    #[inline(always)]
    pub const fn mask(&self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1 << self.width) - 1
        }
    }

    /// Largest value the field can hold.
    pub const fn max_value(&self) -> u32 {
        self.mask()
    }

    #[inline(always)]
    pub const fn extract(&self, raw: u32) -> u32 {
        (raw >> self.offset) & self.mask()
    }

    /// Returns `raw` with this field replaced by `value` (truncated to width).
    #[inline(always)]
    pub const fn insert(&self, raw: u32, value: u32) -> u32 {
        let mask = self.mask() << self.offset;
        (raw & !mask) | ((value << self.offset) & mask)
    }

    pub const fn is_set(&self, raw: u32) -> bool {
        self.extract(raw) != 0
    }
}

/// Static description of one register.
#[derive(Debug)]
pub struct RegisterLayout {
    pub name: &'static str,
    pub address: u32,
    pub fields: &'static [BitField],
}

impl RegisterLayout {
    pub fn field(&self, name: &str) -> Option<&BitField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Extracts a named field from a raw register value.
    pub fn extract(&self, name: &str, raw: u32) -> Option<u32> {
        self.field(name).map(|f| f.extract(raw))
    }

    /// Checks that the fields tile all 32 bits exactly once with unique names.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let fail = |reason: String| LayoutError {
            register: self.name,
            reason,
        };

        let mut sorted: Vec<&BitField> = self.fields.iter().collect();
        sorted.sort_by_key(|f| f.offset);

        let mut next_bit = 0u32;
        for field in &sorted {
            if field.width == 0 {
                return Err(fail(format!("field '{}' has zero width", field.name)));
            }
            if field.offset != next_bit {
                return Err(fail(format!(
                    "field '{}' starts at bit {} but bit {} is {}",
                    field.name,
                    field.offset,
                    next_bit,
                    if field.offset > next_bit {
                        "unmapped"
                    } else {
                        "already mapped"
                    }
                )));
            }
            next_bit = field.offset + field.width;
        }
        if next_bit != 32 {
            return Err(fail(format!("fields cover {} of 32 bits", next_bit)));
        }

        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(fail(format!("duplicate field name '{}'", field.name)));
            }
        }
        Ok(())
    }
}

/// The three registers the harness knows how to address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterKind {
    Csr,
    Coef,
    Outcap,
}

impl RegisterKind {
    pub const ALL: [RegisterKind; 3] = [RegisterKind::Csr, RegisterKind::Coef, RegisterKind::Outcap];

    pub fn layout(&self) -> &'static RegisterLayout {
        match self {
            RegisterKind::Csr => &csr::LAYOUT,
            RegisterKind::Coef => &coef::LAYOUT,
            RegisterKind::Outcap => &outcap::LAYOUT,
        }
    }

    pub fn address(&self) -> u32 {
        self.layout().address
    }

    pub fn name(&self) -> &'static str {
        self.layout().name
    }
}

impl fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegisterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csr" => Ok(RegisterKind::Csr),
            "coef" => Ok(RegisterKind::Coef),
            "outcap" => Ok(RegisterKind::Outcap),
            other => Err(format!("unknown register '{}'", other)),
        }
    }
}

/// A typed view of one register.
///
/// `encode(decode(v)) == v` holds for every 32-bit `v`; reserved bits are
/// carried through untouched.
pub trait Register: Copy {
    const KIND: RegisterKind;

    fn decode(raw: u32) -> Self;
    fn encode(&self) -> u32;
}

/// Checks every register layout table. Run once before a suite starts.
pub fn validate_layouts() -> Result<(), LayoutError> {
    for kind in RegisterKind::ALL {
        kind.layout().validate()?;
    }
    Ok(())
}
