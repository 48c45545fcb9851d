//! Stdin line parsing.

use parley_core::Role;

/// What the user asked for with one input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Send the text as a chat message.
    Send(String),
    /// Switch the role used for subsequent sends.
    Role(Role),
    /// Retire the current transport and open a new one.
    Reconnect,
    /// Print the full session view.
    Status,
    /// Print the command list.
    Help,
    /// Leave the client.
    Quit,
    /// A command that could not be understood.
    Invalid(String),
}

/// Command reference shown by `/help`.
pub const HELP: &str = "\
Commands:
  /role customer|agent   switch role
  /reconnect             open a fresh connection
  /status                show connection, conversation and sentiment
  /help                  show this list
  /quit                  leave
Anything else is sent as a message. Start a line with // to send a leading /.";

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Option<Intent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(escaped) = trimmed.strip_prefix("//") {
        return Some(Intent::Send(format!("/{escaped}")));
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return Some(Intent::Send(trimmed.to_owned()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    let intent = match name.to_lowercase().as_str() {
        "role" => match Role::parse_loose(arg) {
            Some(role) => Intent::Role(role),
            None if arg.is_empty() => Intent::Invalid("usage: /role customer|agent".into()),
            None => Intent::Invalid(format!("unknown role '{arg}' (expected customer or agent)")),
        },
        "reconnect" => Intent::Reconnect,
        "status" => Intent::Status,
        "help" | "?" => Intent::Help,
        "quit" | "exit" | "q" => Intent::Quit,
        other => Intent::Invalid(format!("unknown command '/{other}' (try /help)")),
    };
    Some(intent)
}
