//! Impulsive transfer utilities: Lambert solver and classical transfer approximations.

pub mod lambert;
pub mod transfers;

pub use lambert::{
    Branch, LambertSettings, LambertSolution, LambertSolverError, plan_flight, solve as lambert_solve,
};
pub use transfers::{BiEllipticResult, HohmannResult, bi_elliptic, hohmann};
