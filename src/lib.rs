pub mod config;
pub mod error;
pub mod input;
pub mod quiz;
pub mod render;
