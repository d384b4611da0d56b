//! Canonical model tiers and their mapping onto concrete provider models

mod canonical;
mod mapping;

pub use canonical::{parse_model, CanonicalModel};
pub use mapping::ModelMapping;
