//! Graph Model
//!
//! Agents and the influence network they live in.

pub mod agent;
pub mod network;

pub use agent::*;
pub use network::*;
