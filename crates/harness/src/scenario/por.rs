//! TC2: power-on-reset register values.

use super::Outcome;
use crate::dut::DeviceHandle;
use crate::loader::ExpectedFieldEntry;

pub(crate) fn power_on_reset(dev: &mut DeviceHandle<'_>, expected: &[ExpectedFieldEntry]) -> Outcome {
    dev.reset();
    // Registers are only observable while enabled.
    dev.enable();

    let mut problems: Vec<String> = Vec::new();
    for entry in expected {
        match dev.read_register(entry.register) {
            None => {
                let msg = format!("cannot read {}", entry.register);
                if !problems.contains(&msg) {
                    problems.push(msg);
                }
            }
            Some(raw) => {
                let actual = entry.field.extract(raw);
                if actual != entry.expected {
                    problems.push(format!(
                        "{}.{} mismatch (exp={:#x}, got={:#x})",
                        entry.register,
                        entry.field_name(),
                        entry.expected,
                        actual
                    ));
                }
            }
        }
    }

    if problems.is_empty() {
        Outcome::pass(format!("{} fields match", expected.len()))
    } else {
        Outcome::fail(problems.join("; "))
    }
}
