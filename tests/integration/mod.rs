//! Integration tests for the Planwright generation pipeline

mod circuit_respect;
mod config_integration;
mod pipeline_failover;
mod store_integration;
mod test_utils;
