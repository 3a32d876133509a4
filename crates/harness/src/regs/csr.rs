//! Control/status register (CSR, address 0x0).

use super::{BitField, CSR_ADDR, Register, RegisterKind, RegisterLayout};
use super::coef::CoefficientConfigEntry;

// Filter enable
pub const FEN: BitField = BitField::new("fen", 0, 1);

// Per-coefficient enables
pub const C0EN: BitField = BitField::new("c0en", 1, 1);
pub const C1EN: BitField = BitField::new("c1en", 2, 1);
pub const C2EN: BitField = BitField::new("c2en", 3, 1);
pub const C3EN: BitField = BitField::new("c3en", 4, 1);

pub const HALT: BitField = BitField::new("halt", 5, 1);
pub const STS: BitField = BitField::new("sts", 6, 2);

// Input buffer count (saturating) and overflow flag
pub const IBCNT: BitField = BitField::new("ibcnt", 8, 8);
pub const IBOVF: BitField = BitField::new("ibovf", 16, 1);

// Write-one pulses: input buffer clear, timer clear
pub const IBCLR: BitField = BitField::new("ibclr", 17, 1);
pub const TCLR: BitField = BitField::new("tclr", 18, 1);

pub const RND: BitField = BitField::new("rnd", 19, 2);
pub const ICOEF: BitField = BitField::new("icoef", 21, 1);
pub const ICAP: BitField = BitField::new("icap", 22, 1);
pub const RESERVED: BitField = BitField::new("reserved", 23, 9);

/// Enable bits indexed by coefficient number; bit position is `index + 1`.
pub const COEF_ENABLES: [BitField; 4] = [C0EN, C1EN, C2EN, C3EN];

pub static LAYOUT: RegisterLayout = RegisterLayout {
    name: "csr",
    address: CSR_ADDR,
    fields: &[
        FEN, C0EN, C1EN, C2EN, C3EN, HALT, STS, IBCNT, IBOVF, IBCLR, TCLR, RND, ICOEF, ICAP,
        RESERVED,
    ],
};

/// Value `ibcnt` holds once the input buffer has saturated.
pub const IBCNT_SATURATED: u8 = IBCNT.max_value() as u8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlStatusRegister {
    pub fen: bool,
    pub coef_enable: [bool; 4],
    pub halt: bool,
    pub sts: u8,
    pub ibcnt: u8,
    pub ibovf: bool,
    pub ibclr: bool,
    pub tclr: bool,
    pub rnd: u8,
    pub icoef: bool,
    pub icap: bool,
    pub reserved: u16,
}

impl ControlStatusRegister {
    /// Requests a halt, pulsing the buffer and timer clears alongside it.
    pub fn request_halt(&mut self) {
        self.halt = true;
        self.ibclr = true;
        self.tclr = true;
    }

    /// Releases a halt and turns the filter on.
    pub fn request_run(&mut self) {
        self.halt = false;
        self.fen = true;
    }

    /// Sets or clears `cNen` for every entry, leaving other enables alone.
    /// Entries naming a tap the register does not have are ignored.
    pub fn apply_enables(&mut self, entries: &[CoefficientConfigEntry]) {
        for entry in entries {
            if let Some(bit) = self.coef_enable.get_mut(entry.index as usize) {
                *bit = entry.enable;
            }
        }
    }

    pub fn buffer_saturated(&self) -> bool {
        self.ibcnt == IBCNT_SATURATED && self.ibovf
    }
}

impl Register for ControlStatusRegister {
    const KIND: RegisterKind = RegisterKind::Csr;

    fn decode(raw: u32) -> Self {
        Self {
            fen: FEN.is_set(raw),
            coef_enable: COEF_ENABLES.map(|f| f.is_set(raw)),
            halt: HALT.is_set(raw),
            sts: STS.extract(raw) as u8,
            ibcnt: IBCNT.extract(raw) as u8,
            ibovf: IBOVF.is_set(raw),
            ibclr: IBCLR.is_set(raw),
            tclr: TCLR.is_set(raw),
            rnd: RND.extract(raw) as u8,
            icoef: ICOEF.is_set(raw),
            icap: ICAP.is_set(raw),
            reserved: RESERVED.extract(raw) as u16,
        }
    }

    fn encode(&self) -> u32 {
        let mut raw = FEN.insert(0, self.fen as u32);
        for (field, &enabled) in COEF_ENABLES.iter().zip(&self.coef_enable) {
            raw = field.insert(raw, enabled as u32);
        }
        raw = HALT.insert(raw, self.halt as u32);
        raw = STS.insert(raw, self.sts as u32);
        raw = IBCNT.insert(raw, self.ibcnt as u32);
        raw = IBOVF.insert(raw, self.ibovf as u32);
        raw = IBCLR.insert(raw, self.ibclr as u32);
        raw = TCLR.insert(raw, self.tclr as u32);
        raw = RND.insert(raw, self.rnd as u32);
        raw = ICOEF.insert(raw, self.icoef as u32);
        raw = ICAP.insert(raw, self.icap as u32);
        RESERVED.insert(raw, self.reserved as u32)
    }
}
