use thiserror::Error;

/// A required parameter for the chosen checkout strategy is missing or blank.
///
/// Raised at construction time, before any command runs. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ParameterValidationError(pub String);

impl ParameterValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure of a single external command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be started at all.
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    /// The process ran and exited unsuccessfully.
    #[error("{command} failed ({}): {output}", exit_code_text(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        output: String,
    },
}

impl CommandError {
    /// The printable command line that failed.
    pub fn command(&self) -> &str {
        match self {
            CommandError::Spawn { command, .. } | CommandError::Failed { command, .. } => command,
        }
    }
}

fn exit_code_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_message_names_command_and_status() {
        let err = CommandError::Failed {
            command: "git checkout abc123".to_string(),
            code: Some(128),
            output: "fatal: reference is not a tree: abc123".to_string(),
        };

        let message = err.to_string();
        assert!(message.contains("git checkout abc123"));
        assert!(message.contains("exit status 128"));
        assert!(message.contains("reference is not a tree"));
        assert_eq!(err.command(), "git checkout abc123");
    }

    #[test]
    fn test_signal_termination_message() {
        let err = CommandError::Failed {
            command: "git fetch".to_string(),
            code: None,
            output: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}
