pub mod bot;
pub mod config;
pub mod memory;
pub mod quiz;
pub mod sort;
pub mod timer;
