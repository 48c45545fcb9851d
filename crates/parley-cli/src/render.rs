//! Plain-text rendering of session state.
//!
//! Every function here is pure: it turns a value into the lines printed to
//! stdout, so the terminal layout can be tested without a terminal.

use std::fmt::Write as _;

use parley_client::SessionSnapshot;
use parley_core::{ConnectionStatus, Message, Role, SentimentSnapshot, Tone};

/// Number of cells in the sentiment bar.
pub const BAR_WIDTH: usize = 20;

const EMPTY_LOG_HINT: &str = "No messages yet. Start the conversation!";

fn status_icon(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Connecting => "🔄",
        ConnectionStatus::Connected => "✅",
        ConnectionStatus::Disconnected => "❌",
        ConnectionStatus::Error => "⚠️",
    }
}

fn role_icon(role: Role) -> &'static str {
    match role {
        Role::Customer => "👤",
        Role::SupportAgent => "🧑‍💼",
    }
}

fn tone_icon(tone: Tone) -> &'static str {
    match tone {
        Tone::Positive => "😊",
        Tone::Neutral => "😐",
        Tone::Negative => "😟",
        Tone::Other => "❔",
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `✅ Connected`, with a reconnect hint whenever reconnect is offered.
pub fn status_line(status: ConnectionStatus) -> String {
    let mut line = format!("{} {}", status_icon(status), capitalize(status.as_str()));
    if status.offers_reconnect() {
        line.push_str("  (type /reconnect to retry)");
    }
    line
}

/// `[10:42:07] 👤 Customer: text`
pub fn message_line(message: &Message) -> String {
    format!(
        "[{}] {} {}: {}",
        message.timestamp,
        role_icon(message.role),
        message.role.label(),
        message.content
    )
}

/// Gauge of the normalized score, `BAR_WIDTH` cells wide.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn sentiment_bar(sentiment: &SentimentSnapshot) -> String {
    let filled = (sentiment.normalized() * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Three-line sentiment panel: label and score, gauge, reason.
pub fn sentiment_panel(sentiment: &SentimentSnapshot) -> String {
    format!(
        "{} Sentiment: {} ({:.2})\n   [{}]\n   {}",
        tone_icon(sentiment.tone()),
        sentiment.sentiment.to_uppercase(),
        sentiment.score,
        sentiment_bar(sentiment),
        sentiment.reason
    )
}

/// Numbered coaching suggestions for agents; `None` when there is nothing to show.
pub fn suggestions(snapshot: &SessionSnapshot) -> Option<String> {
    let visible = snapshot.visible_suggestions();
    if visible.is_empty() {
        return None;
    }
    let mut out = String::from("💡 Suggested responses:");
    for (i, suggestion) in visible.iter().enumerate() {
        let _ = write!(out, "\n   {}. {suggestion}", i + 1);
    }
    Some(out)
}

/// Every message in arrival order, or a hint when the log is empty.
pub fn conversation(snapshot: &SessionSnapshot) -> String {
    if snapshot.messages.is_empty() {
        return EMPTY_LOG_HINT.to_owned();
    }
    snapshot
        .messages
        .iter()
        .map(message_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full view printed by `/status`.
pub fn session_view(snapshot: &SessionSnapshot) -> String {
    let mut out = format!(
        "Session {}\n{}\nRole: {} {}\n\n{}\n\n{}",
        snapshot.session_id,
        status_line(snapshot.status),
        role_icon(snapshot.role),
        snapshot.role.label(),
        conversation(snapshot),
        sentiment_panel(&snapshot.sentiment),
    );
    if let Some(block) = suggestions(snapshot) {
        out.push_str("\n\n");
        out.push_str(&block);
    }
    out
}

/// Banner printed once at startup.
pub fn banner(url: &str, role: Role) -> String {
    format!(
        "Parley chat  {url}\nTyping as {} {}. /help lists commands.",
        role_icon(role),
        role.label()
    )
}
