//! End-to-end scenario tests against a behavioural fake of the UAD block.

#[path = "../common/mod.rs"]
mod common;


/// Whole-suite runs from a config file on disk.
mod suite;
