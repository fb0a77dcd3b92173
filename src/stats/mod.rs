//! System statistics sources

mod sampler;

pub use sampler::{StatsSample, StatsSampler, SystemSampler};
