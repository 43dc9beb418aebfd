//! Sluice node: command line interface and process lifecycle

pub mod bundler;
pub mod cli;
pub mod deployment;
pub mod utils;
