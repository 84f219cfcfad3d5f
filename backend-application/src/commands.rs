pub mod scan_commands;
pub mod upload_commands;
