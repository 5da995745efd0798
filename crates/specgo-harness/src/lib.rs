//! Seeded roundtrip verification campaign: compiles generated C, loads it
//! dynamically, and exercises the P1/P2 property suite across every bound
//! message, writing structured YAML reports of the run.

pub mod binding;
pub mod campaign;
pub mod compile;
pub mod error;
pub mod properties;
pub mod report;
pub mod seed;

pub use binding::{MessageBinding, ProjectBinding};
pub use campaign::{run, CampaignOptions, CampaignOutcome};
pub use error::{ConfigurationError, PreflightFailure, PropertyFailure};
pub use seed::{plan, SeedPlan};
