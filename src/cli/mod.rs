pub mod bot;
pub mod commands;

pub use bot::{parse_command, run_session, DemoBot};
pub use commands::Cli;
