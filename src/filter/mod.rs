//! Filtering framework
//!
//! A generic filter trait with an ordered chain, and the exclusion filters
//! applied to policy candidates before scoring.

pub mod generic;
pub mod policy;

pub use generic::{Filter, FilterChain};
pub use policy::{
    PlaceholderContentFilter, SupersededFilter, WoundCareRelevanceFilter, policy_exclusion_chain,
};
