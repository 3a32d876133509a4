//! Coefficient register (COEF, address 0x4): four 8-bit taps c0..c3.

use super::{BitField, COEF_ADDR, Register, RegisterKind, RegisterLayout};

pub const C0: BitField = BitField::new("c0", 0, 8);
pub const C1: BitField = BitField::new("c1", 8, 8);
pub const C2: BitField = BitField::new("c2", 16, 8);
pub const C3: BitField = BitField::new("c3", 24, 8);

pub const COEFS: [BitField; 4] = [C0, C1, C2, C3];

pub static LAYOUT: RegisterLayout = RegisterLayout {
    name: "coef",
    address: COEF_ADDR,
    fields: &COEFS,
};

/// Number of coefficient taps in the register.
pub const NUM_COEFS: usize = COEFS.len();

/// One line of a coefficient configuration file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoefficientConfigEntry {
    /// Tap number. The loader only produces values below [`NUM_COEFS`];
    /// anything else is ignored when packing.
    pub index: u8,
    pub enable: bool,
    pub value: u8,
}

impl CoefficientConfigEntry {
    pub fn new(index: u8, enable: bool, value: u8) -> Self {
        debug_assert!((index as usize) < NUM_COEFS);
        Self {
            index,
            enable,
            value,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoefficientRegister {
    pub coefs: [u8; NUM_COEFS],
}

impl CoefficientRegister {
    /// Packs configuration entries into a register value.
    ///
    /// Taps not mentioned by any entry are zero. Entries are applied in order,
    /// so a later entry for the same tap wins. Entries naming a tap the
    /// register does not have are ignored.
    pub fn from_entries(entries: &[CoefficientConfigEntry]) -> Self {
        let mut reg = Self::default();
        for entry in entries {
            if let Some(coef) = reg.coefs.get_mut(entry.index as usize) {
                *coef = entry.value;
            }
        }
        reg
    }
}

impl Register for CoefficientRegister {
    const KIND: RegisterKind = RegisterKind::Coef;

    fn decode(raw: u32) -> Self {
        Self {
            coefs: COEFS.map(|f| f.extract(raw) as u8),
        }
    }

    fn encode(&self) -> u32 {
        COEFS
            .iter()
            .zip(&self.coefs)
            .fold(0, |raw, (field, &c)| field.insert(raw, c as u32))
    }
}
