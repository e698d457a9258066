//! Command-line front end for the ELT pipelines.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
