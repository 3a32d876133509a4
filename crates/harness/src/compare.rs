//! Golden-versus-candidate sequence comparison.
//!
//! Sequences are compared position by position: the output at index `i` is
//! the device's answer to stimulus sample `i`, so order matters and an
//! unavailable sample only matches another unavailable sample.

use std::fmt;

use crate::common::{Sample, format_sample};

/// Where a candidate sequence first departs from the golden one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Divergence {
    /// Element `index` differs.
    Sample {
        index: usize,
        golden: Sample,
        candidate: Sample,
    },
    /// Every shared element matches but the lengths differ.
    Length { golden: usize, candidate: usize },
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Divergence::Sample {
                index,
                golden,
                candidate,
            } => write!(
                f,
                "sample {}: golden={} candidate={}",
                index,
                format_sample(golden),
                format_sample(candidate)
            ),
            Divergence::Length { golden, candidate } => write!(
                f,
                "length mismatch: golden={} candidate={}",
                golden, candidate
            ),
        }
    }
}

/// True iff both sequences have the same length and identical elements.
pub fn compare_sequences(golden: &[Sample], candidate: &[Sample]) -> bool {
    golden == candidate
}

/// Returns the first point of divergence, or `None` if the sequences match.
pub fn first_divergence(golden: &[Sample], candidate: &[Sample]) -> Option<Divergence> {
    if let Some(index) = golden.iter().zip(candidate).position(|(g, c)| g != c) {
        return Some(Divergence::Sample {
            index,
            golden: golden[index],
            candidate: candidate[index],
        });
    }
    (golden.len() != candidate.len()).then_some(Divergence::Length {
        golden: golden.len(),
        candidate: candidate.len(),
    })
}

/// Number of positions (over the shared prefix) holding different values.
pub fn mismatch_count(golden: &[Sample], candidate: &[Sample]) -> usize {
    golden
        .iter()
        .zip(candidate)
        .filter(|(g, c)| g != c)
        .count()
}
