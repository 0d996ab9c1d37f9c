pub mod config;
pub mod helper;
pub mod modules;
pub mod pipeline;
pub mod utils;
