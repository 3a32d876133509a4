//! TC4 and TC5: output sequences judged against the golden instance.

use super::Outcome;
use crate::common::Sample;
use crate::compare::{first_divergence, mismatch_count};
use crate::dut::DeviceHandle;
use crate::regs::CoefficientConfigEntry;

/// Bypass: coefficients untouched, the stimulus goes straight through.
pub(crate) fn capture_bypass(dev: &mut DeviceHandle<'_>, stimulus: &[u32]) -> Vec<Sample> {
    dev.reset();
    dev.enable();
    dev.drive_sequence(stimulus)
}

/// Loads a coefficient set under halt, resumes, then drives the stimulus.
pub(crate) fn capture_configured(
    dev: &mut DeviceHandle<'_>,
    entries: &[CoefficientConfigEntry],
    stimulus: &[u32],
) -> Vec<Sample> {
    dev.reset();
    dev.enable();
    dev.halt();
    dev.apply_coefficients(entries);
    dev.run();
    dev.drive_sequence(stimulus)
}

/// A reference in which every sample is unavailable proves nothing.
pub(crate) fn reference_usable(reference: &[Sample]) -> bool {
    reference.iter().any(Option::is_some)
}

pub(crate) fn judge_reference(reference: &[Sample]) -> Outcome {
    let missing = reference.iter().filter(|s| s.is_none()).count();
    if reference_usable(reference) {
        Outcome::pass(format!(
            "reference captured: {} samples, {} unavailable",
            reference.len(),
            missing
        ))
    } else {
        Outcome::fail(format!(
            "no reference output: {} of {} samples unavailable",
            missing,
            reference.len()
        ))
    }
}

pub(crate) fn judge_candidate(reference: &[Sample], candidate: &[Sample]) -> Outcome {
    match first_divergence(reference, candidate) {
        None => Outcome::pass(format!("matches golden ({} samples)", reference.len())),
        Some(divergence) => Outcome::fail(format!(
            "{}; {} of {} samples differ",
            divergence,
            mismatch_count(reference, candidate),
            reference.len()
        )),
    }
}
