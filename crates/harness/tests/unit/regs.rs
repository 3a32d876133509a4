use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use uad_harness::regs::{
    coef, csr, outcap, validate_layouts, CoefficientConfigEntry, CoefficientRegister,
    ControlStatusRegister, OutputCaptureRegister, Register, RegisterKind,
};

fn entry_strategy() -> impl Strategy<Value = Vec<CoefficientConfigEntry>> {
    // One entry per distinct tap, in arbitrary order.
    proptest::sample::subsequence(vec![0u8, 1, 2, 3], 0..=4)
        .prop_flat_map(|taps| {
            let n = taps.len();
            (
                Just(taps).prop_shuffle(),
                proptest::collection::vec(any::<bool>(), n),
                proptest::collection::vec(any::<u8>(), n),
            )
        })
        .prop_map(|(taps, enables, values)| {
            taps.into_iter()
                .zip(enables)
                .zip(values)
                .map(|((i, e), v)| CoefficientConfigEntry::new(i, e, v))
                .collect()
        })
}

proptest! {
    #[test]
    fn csr_round_trips(raw in any::<u32>()) {
        prop_assert_eq!(ControlStatusRegister::decode(raw).encode(), raw);
    }

    #[test]
    fn coef_round_trips(raw in any::<u32>()) {
        prop_assert_eq!(CoefficientRegister::decode(raw).encode(), raw);
    }

    #[test]
    fn outcap_round_trips(raw in any::<u32>()) {
        prop_assert_eq!(OutputCaptureRegister::decode(raw).encode(), raw);
    }

    #[test]
    fn field_insert_touches_only_that_field(raw in any::<u32>(), value in any::<u32>(), which in 0usize..15) {
        let field = csr::LAYOUT.fields[which];
        let updated = field.insert(raw, value);
        prop_assert_eq!(field.extract(updated), value & field.mask());
        let outside = !(field.mask() << field.offset);
        prop_assert_eq!(updated & outside, raw & outside);
    }

    #[test]
    fn coefficient_packing(entries in entry_strategy(), base in any::<u32>()) {
        let coef = CoefficientRegister::from_entries(&entries).encode();
        let mut reg = ControlStatusRegister::decode(base);
        reg.apply_enables(&entries);
        let csr_raw = reg.encode();

        for e in &entries {
            prop_assert_eq!(coef::COEFS[e.index as usize].extract(coef), e.value as u32);
            prop_assert_eq!((csr_raw >> (e.index + 1)) & 1, e.enable as u32);
        }
        // Taps nobody mentioned are zero; enables nobody mentioned are kept.
        for tap in 0..4u8 {
            if entries.iter().all(|e| e.index != tap) {
                prop_assert_eq!(coef::COEFS[tap as usize].extract(coef), 0);
                prop_assert_eq!((csr_raw >> (tap + 1)) & 1, (base >> (tap + 1)) & 1);
            }
        }
        // Nothing outside the enables moves.
        prop_assert_eq!(csr_raw & !0b1_1110, base & !0b1_1110);
    }

    #[test]
    fn halt_then_run_leaves_filter_enabled(raw in any::<u32>()) {
        let mut reg = ControlStatusRegister::decode(raw);
        reg.request_halt();
        prop_assert!(reg.halt && reg.ibclr && reg.tclr);
        reg.request_run();
        prop_assert!(!reg.halt);
        prop_assert!(reg.fen);
    }
}

/// All-zero, all-one, alternating, then walking one and walking zero.
fn structured_patterns() -> Vec<u32> {
    let mut patterns = vec![0, u32::MAX, 0xAAAA_AAAA, 0x5555_5555];
    for bit in 0..32 {
        patterns.push(1 << bit);
        patterns.push(!(1 << bit));
    }
    patterns
}

#[test]
fn test_round_trip_structured_patterns() {
    let patterns = structured_patterns();
    assert_eq!(patterns.len(), 68);
    for p in patterns {
        assert_eq!(ControlStatusRegister::decode(p).encode(), p, "csr {:#010x}", p);
        assert_eq!(CoefficientRegister::decode(p).encode(), p, "coef {:#010x}", p);
        assert_eq!(OutputCaptureRegister::decode(p).encode(), p, "outcap {:#010x}", p);
    }
}

#[rstest]
#[case::walking_one_fen(1 << 0, "fen")]
#[case::walking_one_c2en(1 << 3, "c2en")]
#[case::walking_one_halt(1 << 5, "halt")]
#[case::walking_one_ibovf(1 << 16, "ibovf")]
#[case::walking_one_tclr(1 << 18, "tclr")]
#[case::walking_one_icap(1 << 22, "icap")]
#[case::walking_one_reserved(1 << 31, "reserved")]
fn test_single_bit_lands_in_one_csr_field(#[case] raw: u32, #[case] owner: &str) {
    for field in csr::LAYOUT.fields {
        let expected = field.name == owner;
        assert_eq!(field.is_set(raw), expected, "field {}", field.name);
    }
}

#[rstest]
#[case(0x0000_00FF, [0xFF, 0, 0, 0])]
#[case(0x0000_FF00, [0, 0xFF, 0, 0])]
#[case(0x00FF_0000, [0, 0, 0xFF, 0])]
#[case(0xFF00_0000, [0, 0, 0, 0xFF])]
#[case(0x0403_0201, [1, 2, 3, 4])]
fn test_coef_byte_lanes(#[case] raw: u32, #[case] coefs: [u8; 4]) {
    assert_eq!(CoefficientRegister::decode(raw).coefs, coefs);
}

#[test]
fn test_outcap_halves() {
    let reg = OutputCaptureRegister::decode(0xBEEF_12AB);
    assert_eq!(reg.hcap, 0xAB);
    assert_eq!(reg.lcap, 0x12);
    assert_eq!(reg.reserved, 0xBEEF);
    assert_eq!(outcap::LAYOUT.extract("lcap", 0xBEEF_12AB), Some(0x12));
}

#[test]
fn test_every_layout_tiles_32_bits() {
    assert_eq!(validate_layouts(), Ok(()));
    for kind in RegisterKind::ALL {
        let total: u32 = kind.layout().fields.iter().map(|f| f.width).sum();
        assert_eq!(total, 32, "{}", kind);
    }
}

#[test]
fn test_all_ones_and_zeros() {
    let ones = ControlStatusRegister::decode(u32::MAX);
    assert!(ones.fen && ones.halt && ones.ibovf);
    assert_eq!(ones.coef_enable, [true; 4]);
    assert_eq!(ones.ibcnt, csr::IBCNT_SATURATED);
    assert_eq!(ones.reserved, 0x1FF);
    assert_eq!(ControlStatusRegister::decode(0), ControlStatusRegister::default());
}
