pub mod config;
pub mod result;
