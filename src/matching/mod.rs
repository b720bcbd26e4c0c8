//! Matching module - blood groups, factor scoring, ranking and outcome heuristics

mod blood;
pub mod scoring;
mod ranker;
mod outlook;

pub use blood::*;
pub use ranker::*;
pub use outlook::*;
