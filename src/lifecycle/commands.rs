//! Service control commands and reported status.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A request delivered to the service host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceCommand {
    Start,
    Stop,
    Pause,
    Continue,
    Interrogate,
    Shutdown,
    /// A control code the host does not understand.
    Unknown(u32),
}

impl ServiceCommand {
    /// Map a numeric control code, using the conventional service-manager numbering.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => ServiceCommand::Stop,
            2 => ServiceCommand::Pause,
            3 => ServiceCommand::Continue,
            4 => ServiceCommand::Interrogate,
            5 => ServiceCommand::Shutdown,
            other => ServiceCommand::Unknown(other),
        }
    }
}

impl fmt::Display for ServiceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceCommand::Start => f.write_str("start"),
            ServiceCommand::Stop => f.write_str("stop"),
            ServiceCommand::Pause => f.write_str("pause"),
            ServiceCommand::Continue => f.write_str("continue"),
            ServiceCommand::Interrogate => f.write_str("interrogate"),
            ServiceCommand::Shutdown => f.write_str("shutdown"),
            ServiceCommand::Unknown(code) => write!(f, "#{}", code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized command '{0}'")]
pub struct UnrecognizedCommand(pub String);

impl FromStr for ServiceCommand {
    type Err = UnrecognizedCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let word = s.trim().to_ascii_lowercase();
        match word.as_str() {
            "start" => Ok(ServiceCommand::Start),
            "stop" | "quit" => Ok(ServiceCommand::Stop),
            "pause" => Ok(ServiceCommand::Pause),
            "continue" | "resume" => Ok(ServiceCommand::Continue),
            "status" | "interrogate" => Ok(ServiceCommand::Interrogate),
            "shutdown" => Ok(ServiceCommand::Shutdown),
            other => other
                .parse::<u32>()
                .map(ServiceCommand::from_code)
                .map_err(|_| UnrecognizedCommand(s.trim().to_string())),
        }
    }
}

/// Status reported by the service host to whoever is supervising it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceStatus {
    StartPending,
    Running,
    Paused,
    StopPending,
    Stopped,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceStatus::StartPending => "start-pending",
            ServiceStatus::Running => "running",
            ServiceStatus::Paused => "paused",
            ServiceStatus::StopPending => "stop-pending",
            ServiceStatus::Stopped => "stopped",
        };
        f.write_str(s)
    }
}
