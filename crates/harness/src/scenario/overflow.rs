//! TC3: input buffer overflow.
//!
//! Driving more samples than `ibcnt` can count must leave the counter
//! saturated at 255 with `ibovf` set. A counter that wrapped (300 samples
//! leave 44) fails.

use super::Outcome;
use crate::dut::DeviceHandle;

pub(crate) fn buffer_overflow(dev: &mut DeviceHandle<'_>, samples: usize, stimulus: u32) -> Outcome {
    dev.reset();
    dev.enable();

    for _ in 0..samples {
        dev.drive_signal(stimulus);
    }

    match dev.read_csr() {
        None => Outcome::fail(format!("CSR unavailable after {} samples", samples)),
        Some(csr) => {
            let detail = format!("IBCNT={}, IBOVF={}", csr.ibcnt, csr.ibovf as u8);
            if csr.buffer_saturated() {
                Outcome::pass(detail)
            } else {
                Outcome::fail(detail)
            }
        }
    }
}
