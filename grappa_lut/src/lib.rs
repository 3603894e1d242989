pub mod args;
pub mod build;
pub mod config;
pub mod error;
