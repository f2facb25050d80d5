// ABOUTME: Library surface for the webpress command-line tool
// ABOUTME: Exposes configuration and batch-processing modules for the binary and tests

pub mod batch;
pub mod config;
