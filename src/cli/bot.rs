use crate::events::{Event, EventKind, Handler};
use crate::messages::ChatMessage;
use crate::network::{Client, ClientError, Session};
use anyhow::{anyhow, Context, Result};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// Split `content` into a lowercase command name and its arguments when it
/// starts with `prefix`.
///
/// The command must follow the prefix directly, so `"! ping"` is not a command.
pub fn parse_command<'a>(prefix: &str, content: &'a str) -> Option<(String, Vec<&'a str>)> {
    let rest = content.strip_prefix(prefix)?;
    let mut parts = rest.split(' ');
    let command = parts.next().filter(|command| !command.is_empty())?;
    let args = parts.filter(|part| !part.is_empty()).collect();
    Some((command.to_lowercase(), args))
}

/// The example bot: greets on open and answers `ping`, `prefix`, `say`, `help`
#[derive(Debug, Clone)]
pub struct DemoBot {
    prefix: Arc<Mutex<String>>,
}

impl DemoBot {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Arc::new(Mutex::new(prefix.into())),
        }
    }

    pub fn prefix(&self) -> Result<String> {
        self.prefix
            .lock()
            .map(|prefix| prefix.clone())
            .map_err(|_| anyhow!("prefix lock poisoned"))
    }

    fn set_prefix(&self, prefix: &str) -> Result<()> {
        let mut current = self
            .prefix
            .lock()
            .map_err(|_| anyhow!("prefix lock poisoned"))?;
        *current = prefix.to_string();
        Ok(())
    }

    /// Register the bot's handlers on `client`
    pub fn register(&self, client: &mut Client) {
        let bot = self.clone();
        client.on(
            EventKind::Open,
            Handler::new(move |session: &mut Session, _: &Event<'_>| {
                info!("Connection established!");
                let prefix = bot.prefix()?;
                session.send(&format!(
                    "Hello, world! My prefix is {}. Type {}help for a list of commands.",
                    prefix, prefix
                ))?;
                Ok(())
            }),
        );

        let bot = self.clone();
        client.on(
            EventKind::Message,
            Handler::new(move |session: &mut Session, event: &Event<'_>| match event {
                Event::Message(message) => bot.handle_message(session, message),
                _ => Ok(()),
            }),
        );
    }

    /// React to one chat message
    pub fn handle_message(&self, session: &mut Session, message: &ChatMessage) -> Result<()> {
        if message.is_bot() || message.is_self() {
            return Ok(());
        }

        let prefix = self.prefix()?;
        let Some((command, args)) = parse_command(&prefix, &message.content) else {
            return Ok(());
        };

        match command.as_str() {
            "ping" => message.reply(session, "Pong!")?,
            "prefix" => match args.first() {
                Some(new_prefix) => {
                    self.set_prefix(new_prefix)?;
                    message.reply(session, &format!("Prefix set to {}", new_prefix))?;
                }
                None => message.reply(session, &format!("Usage: {}prefix <new prefix>", prefix))?,
            },
            "say" => message.respond(session, &args.join(" "))?,
            "help" => message.reply(session, "Commands: help, ping, say, prefix")?,
            _ => {}
        }
        Ok(())
    }
}

/// Drive `client` until no link remains.
///
/// Frames that do not decode as chat messages (backlog and other `op`
/// frames) are skipped. A failing handler ends the session.
pub async fn run_session(client: &mut Client) -> Result<()> {
    loop {
        match client.run().await {
            Ok(()) => return Ok(()),
            Err(ClientError::MalformedFrame(e)) => warn!("Skipping frame: {}", e),
            Err(e) => {
                error!("Session stopped: {}", e);
                return Err(e).context("Session ended with an error");
            }
        }
    }
}
