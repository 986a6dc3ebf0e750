pub mod cli;
pub mod commands;
pub mod hagap;
pub mod utils;
