//! modelmart: an in-memory registry of AI model listings, served over HTTP
//! and browsable from the terminal.

pub mod browse;
pub mod cli;
pub mod config;
pub mod registry;
pub mod server;
