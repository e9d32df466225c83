// Interactive terminal browser for a running registry server
mod browser;
mod client;
mod command_handlers;
mod display;

pub use browser::browse_loop;
pub use client::MarketClient;
