//! # parley
//!
//! Terminal chat client: connects to the analysis service, relays typed
//! messages and prints the live sentiment and coaching suggestions.

#![deny(unsafe_code)]

mod input;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use parley_client::{ChatSession, Endpoint, SessionUpdate, WsConnector};
use parley_core::Role;
use parley_core::logging::init_subscriber;
use parley_settings::{ClientSettings, load_settings, load_settings_from_path};

use crate::input::Intent;

/// Parley chat client.
#[derive(Parser, Debug)]
#[command(name = "parley", about = "Live support chat with sentiment coaching")]
struct Cli {
    /// Service host (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Service port (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Use `wss://` instead of `ws://`.
    #[arg(long)]
    secure: bool,

    /// Full socket base URL such as `ws://localhost:8000/ws`.
    #[arg(long, conflicts_with_all = ["host", "port", "secure"])]
    url: Option<String>,

    /// Role to start typing as (`customer` or `agent`).
    #[arg(long, default_value = "customer", value_parser = parse_role)]
    role: Role,

    /// Settings file (defaults to `~/.parley/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log filter such as `debug` (overrides settings).
    #[arg(long)]
    log_level: Option<String>,
}

fn parse_role(value: &str) -> std::result::Result<Role, String> {
    Role::parse_loose(value)
        .ok_or_else(|| format!("unknown role '{value}' (expected customer or agent)"))
}

impl Cli {
    /// Flags win over every settings layer.
    fn apply_to(&self, settings: &mut ClientSettings) {
        if let Some(ref host) = self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if self.secure {
            settings.server.secure = true;
        }
        if let Some(ref level) = self.log_level {
            settings.logging.level.clone_from(level);
        }
    }

    fn endpoint(&self, settings: &ClientSettings) -> Result<Endpoint> {
        let endpoint = match self.url {
            Some(ref url) => Endpoint::parse(url)?,
            None => Endpoint::from_settings(&settings.server)?,
        };
        Ok(endpoint)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut settings = match args.settings {
        Some(ref path) => load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => load_settings().context("Failed to load settings")?,
    };
    args.apply_to(&mut settings);
    init_subscriber(&settings.logging.level);

    let endpoint = args.endpoint(&settings).context("Invalid service endpoint")?;
    let connector = WsConnector::from_settings(&settings.connection);
    let mut session = ChatSession::new(&endpoint, Arc::new(connector));
    session.change_role(args.role);

    println!("{}", render::banner(session.url(), session.role()));
    session.connect();
    println!("{}", render::status_line(session.status()));

    run(&mut session).await?;

    session.disconnect();
    tracing::info!(session_id = %session.session_id(), "client exiting");
    Ok(())
}

/// Interleave stdin intents with transport events until the user quits.
async fn run(session: &mut ChatSession) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    return Ok(());
                };
                let Some(intent) = input::parse(&line) else { continue };
                if !handle_intent(session, intent) {
                    return Ok(());
                }
            }
            update = session.next_event() => {
                let Some(update) = update else { return Ok(()) };
                show_update(session, &update);
            }
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

/// Apply one intent. Returns `false` when the user asked to quit.
fn handle_intent(session: &mut ChatSession, intent: Intent) -> bool {
    match intent {
        Intent::Send(text) => {
            if let Some(line) = send_line(session, &text) {
                println!("{line}");
            }
        }
        Intent::Role(role) => {
            session.change_role(role);
            println!("Now typing as {}", role.label());
            if let Some(block) = render::suggestions(&session.snapshot()) {
                println!("{block}");
            }
        }
        Intent::Reconnect => {
            session.reconnect();
            println!("{}", render::status_line(session.status()));
        }
        Intent::Status => println!("{}", render::session_view(&session.snapshot())),
        Intent::Help => println!("{}", input::HELP),
        Intent::Quit => return false,
        Intent::Invalid(reason) => println!("{reason}"),
    }
    true
}

/// Send `text` and describe the outcome. Blank text is ignored.
fn send_line(session: &mut ChatSession, text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    if !session.status().can_send() {
        return Some("Cannot send messages while disconnected".to_owned());
    }
    let line = match session.send(text) {
        Some(message) => render::message_line(&message),
        None => "Message not sent (outbound queue full)".to_owned(),
    };
    Some(line)
}

fn show_update(session: &ChatSession, update: &SessionUpdate) {
    match update {
        SessionUpdate::Status { to, .. } => println!("{}", render::status_line(*to)),
        SessionUpdate::Envelope(applied) => {
            let snapshot = session.snapshot();
            let appended = applied
                .appended
                .then(|| snapshot.messages.iter().find(|m| m.id == applied.message_id))
                .flatten();
            if let Some(message) = appended {
                println!("{}", render::message_line(message));
            }
            println!("{}", render::sentiment_panel(&snapshot.sentiment));
            if let Some(block) = render::suggestions(&snapshot) {
                println!("{block}");
            }
        }
        // Already logged by the session.
        SessionUpdate::Rejected { .. } => {}
    }
}
