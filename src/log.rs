use std::io::Write;
use std::sync::Arc;

pub type CLI = Arc<linefeed::Interface<linefeed::DefaultTerminal>>;

#[derive(Debug, Clone, Copy)]
pub enum LogType {
    Error,
    Info,
    Vote,
    Action,
    ConsoleResponse,
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use colored::*;
        match &self {
            LogType::Error => write!(f, "{}", "[ERROR]".red()),
            LogType::Info => write!(f, "{}", "[INFO]".yellow()),
            LogType::Vote => write!(f, "{}", "[VOTE]".cyan()),
            LogType::Action => write!(f, "{}", "[ACTION]".green()),
            LogType::ConsoleResponse => write!(f, "{}", "[CONSOLE]".magenta()),
        }
    }
}

pub fn log(cli: &CLI, log_type: LogType, message: &str) {
    let mut writer = cli.lock_writer_erase().unwrap();
    writeln!(writer, "{} {}", log_type, message).unwrap();
}
