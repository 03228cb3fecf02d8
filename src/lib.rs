pub mod error;
pub mod gui;
pub mod log;
pub mod models;
pub mod parsing;
pub mod utils;
