//! Command tokens submitted for execution

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::Error;

/// An external command: a program name plus its arguments
///
/// A `Command` is an immutable, ordered sequence of string tokens. It carries
/// no identity beyond its position in the collection handed to
/// [`parallel`](crate::parallel), and no execution policy of its own; the
/// policy lives in [`ExecOptions`](crate::core::ExecOptions).
///
/// # Examples
///
/// ```rust
/// use cmdstream::Command;
///
/// let command = Command::new("grep").arg("-r").arg("TODO");
/// assert_eq!(command.program(), "grep");
/// assert_eq!(command.argv(), ["-r", "TODO"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    program: String,
    args: Vec<String>,
}

impl Command {
    /// Create a command for the given program, with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a single argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The program name (first token)
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments (every token after the program name)
    pub fn argv(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl From<&str> for Command {
    fn from(program: &str) -> Self {
        Self::new(program)
    }
}

impl From<String> for Command {
    fn from(program: String) -> Self {
        Self::new(program)
    }
}

impl TryFrom<Vec<String>> for Command {
    type Error = Error;

    /// Build a command from a full token list (program first)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Launch`] if the token list is empty.
    fn try_from(mut tokens: Vec<String>) -> Result<Self, Self::Error> {
        if tokens.is_empty() {
            return Err(Error::launch("empty command token list"));
        }
        let args = tokens.split_off(1);
        Ok(Self {
            program: tokens.pop().unwrap_or_default(),
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_construction() {
        let command = Command::new("echo").arg("hello").args(["big", "world"]);
        assert_eq!(command.program(), "echo");
        assert_eq!(command.argv(), ["hello", "big", "world"]);
    }

    #[test]
    fn test_command_from_program_name() {
        let command: Command = "whoami".into();
        assert_eq!(command.program(), "whoami");
        assert!(command.argv().is_empty());
    }

    #[test]
    fn test_command_from_token_list() {
        let tokens = vec!["ls".to_string(), "-l".to_string(), "/tmp".to_string()];
        let command = Command::try_from(tokens).unwrap();
        assert_eq!(command.program(), "ls");
        assert_eq!(command.argv(), ["-l", "/tmp"]);
    }

    #[test]
    fn test_command_from_empty_token_list() {
        let result = Command::try_from(Vec::<String>::new());
        assert!(matches!(result, Err(Error::Launch(_))));
    }

    #[test]
    fn test_command_display() {
        let command = Command::new("grep").arg("-r").arg("TODO");
        assert_eq!(command.to_string(), "grep -r TODO");
    }

    #[test]
    fn test_command_serde_round() {
        let command = Command::new("env").arg("-i");
        let json = serde_json::to_string(&command).unwrap();
        assert!(json.contains("\"program\":\"env\""));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, command);
    }
}
