pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod scanner;
pub mod workflow;
