//! Tax calculation modules.
//!
//! This module provides the pure, synchronous part of the pipeline: applying
//! a resolved bracket table to a salary.

pub mod common;
pub mod progressive;

pub use progressive::ProgressiveTaxCalculator;
