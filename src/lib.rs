//! FormPilot CLI library
//!
//! Exposes modules for integration testing

pub mod cli;
pub mod config;
pub mod demo;

pub use config::Config;
