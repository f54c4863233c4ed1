//! Planwright: resilient generation of multi-day activity plans.
//!
//! A model is asked for a plan through an ordered list of strategies; whatever
//! comes back is repaired, validated and normalized into a [`ValidatedPlan`].
//! When every strategy fails, or a remembered rate-limit signal says not to
//! try, a deterministic template is returned instead. Callers always get a
//! plan.
//!
//! [`ValidatedPlan`]: generation::ValidatedPlan

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod provider;
pub mod store;
