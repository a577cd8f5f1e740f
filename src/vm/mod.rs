pub mod app;
pub mod cadence;
pub mod config;
pub mod cpu;
pub mod error;
pub mod instruction;
pub mod state;
