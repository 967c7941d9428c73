//! Transformation module.
//!
//! - Normalize: raw text columns to typed records
//! - Dimensions: distinct values and surrogate keys
//! - Join: surrogate keys back onto records (fact table)
//! - Pipeline: orchestration of the whole run

pub mod dimensions;
pub mod join;
pub mod normalize;
pub mod pipeline;

pub use dimensions::{build_dimensions, Dimensions, SurrogateKeys};
pub use join::{join_facts, JoinOutcome};
pub use normalize::{normalize_record, normalize_records};
pub use pipeline::*;
