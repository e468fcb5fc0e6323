//! Systems
//!
//! The update rule and the statistics computed over a network.

pub mod dynamics;
pub mod metrics;

pub use dynamics::{
    effective_weight, run, social_target, IsolationPolicy, StepOutcome, UpdateParams,
    DEFAULT_HOMOPHILY, DEFAULT_NOISE_SCALE,
};
pub use metrics::{
    community_means, community_stds, echo_chamber_score, local_echo_chamber, mean_belief,
    measure, polarization, variance, Polarization, DEFAULT_POLARIZATION_THRESHOLD,
};
