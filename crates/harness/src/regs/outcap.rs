//! Output capture register (OUTCAP, address 0x8).

use super::{BitField, OUTCAP_ADDR, Register, RegisterKind, RegisterLayout};

pub const HCAP: BitField = BitField::new("hcap", 0, 8);
pub const LCAP: BitField = BitField::new("lcap", 8, 8);
pub const RESERVED: BitField = BitField::new("reserved", 16, 16);

pub static LAYOUT: RegisterLayout = RegisterLayout {
    name: "outcap",
    address: OUTCAP_ADDR,
    fields: &[HCAP, LCAP, RESERVED],
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputCaptureRegister {
    pub hcap: u8,
    pub lcap: u8,
    pub reserved: u16,
}

impl Register for OutputCaptureRegister {
    const KIND: RegisterKind = RegisterKind::Outcap;

    fn decode(raw: u32) -> Self {
        Self {
            hcap: HCAP.extract(raw) as u8,
            lcap: LCAP.extract(raw) as u8,
            reserved: RESERVED.extract(raw) as u16,
        }
    }

    fn encode(&self) -> u32 {
        let raw = HCAP.insert(0, self.hcap as u32);
        let raw = LCAP.insert(raw, self.lcap as u32);
        RESERVED.insert(raw, self.reserved as u32)
    }
}
