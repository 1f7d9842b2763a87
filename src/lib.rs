//! Orbital mechanics and trajectory planning for an N-body simulation.
//!
//! The physics lives in the member crates; this facade re-exports them so
//! front-ends (the CLI today) depend on a single package.

pub use orrery_config as config;
pub use orrery_core as core;
pub use orrery_export as export;
pub use orrery_impulsive as impulsive;
pub use orrery_orbits as orbits;
pub use orrery_soi as soi;
pub use orrery_transfer as transfer;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
