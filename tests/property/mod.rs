//! Property-based tests for repair, fallback and pipeline totality

mod fallback;
mod reliability;
mod repair;
