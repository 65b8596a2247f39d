pub mod archive_commands;
pub mod utils;
