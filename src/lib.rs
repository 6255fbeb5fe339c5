pub mod cli;
pub mod config;
pub mod data;
pub mod draw;
pub mod logging;
pub mod parallel;
pub mod trials;
