pub mod config;
pub mod loader;
pub mod run;
pub mod terminal;
