//! TC1: global enable/disable.
//!
//! While disabled the register interface may go silent; that counts as
//! correct. What must not happen is a readable CSR that claims `fen=1`.
//! After a fresh reset and enable the CSR must be readable with `fen=1`.

use super::Outcome;
use crate::dut::DeviceHandle;

pub(crate) fn global_enable(dev: &mut DeviceHandle<'_>) -> Outcome {
    dev.reset();
    dev.disable();
    let disabled = dev.read_csr();

    dev.reset();
    dev.enable();
    let enabled = dev.read_csr();

    let disabled_note = match disabled {
        None => "unavailable while disabled".to_string(),
        Some(csr) => format!("fen={} while disabled", csr.fen as u8),
    };
    let enabled_note = match enabled {
        None => "CSR unavailable after enable".to_string(),
        Some(csr) => format!("fen={} after enable", csr.fen as u8),
    };
    let detail = format!("{}; {}", disabled_note, enabled_note);

    let disabled_ok = disabled.is_none_or(|csr| !csr.fen);
    let enabled_ok = enabled.is_some_and(|csr| csr.fen);
    if disabled_ok && enabled_ok {
        Outcome::pass(detail)
    } else {
        Outcome::fail(detail)
    }
}
