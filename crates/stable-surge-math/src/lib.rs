//! Numerical kernel for constant-invariant multi-asset stable-swap pools
//! with an imbalance-triggered dynamic ("surge") fee.
//!
//! The crate is a pure computational core: every entry point is a
//! synchronous function of its inputs with no shared state, safe to call
//! re-entrantly from any number of threads. Amounts and percentages are
//! 18-decimal (WAD) fixed-point integers; see [`fixed_point`].
//!
//! - [`stable_math`] solves the pool invariant `D` from balances and an
//!   amplification coefficient, and recovers a single balance from `D`
//!   analytically.
//! - [`surge_math`] measures balance-set imbalance around the median and
//!   derives the effective fee percentage for a proposed swap.
//! - [`pool`] composes the two into fee-inclusive swap previews.

pub mod error;
pub mod fixed_point;
pub mod pool;
pub mod stable_math;
pub mod surge_math;

pub use {
    error::Error,
    pool::{StableSurgePool, SwapResult},
    stable_math::{AmplificationParameter, compute_balance, compute_invariant},
    surge_math::{SurgeParams, compute_imbalance, compute_surge_fee_percentage, is_surging},
};
