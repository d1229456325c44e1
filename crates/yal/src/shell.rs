// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `yal shell` command implementation.
//!
//! Runs the full request pipeline against the configured engine, with the
//! terminal standing in for the chat platform. Every message the bot would
//! post is printed; interactive controls are listed with their ids so they
//! can be pressed with `/continue` and `/draft`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{info, warn};
use yal_agent::shutdown::{drain_in_flight, install_signal_handler};
use yal_agent::{Orchestrator, RunOutcome};
use yal_config::YalConfig;
use yal_config::model::AccessConfig;
use yal_core::YalError;
use yal_core::traits::{
    ChatTransport, GenerationEngine, PluginAdapter, RandomIdGenerator, SystemClock,
    ToxicityClassifier,
};
use yal_core::types::{
    AdapterType, ChannelId, HealthStatus, InteractionId, MessageId, OutboundMessage,
    SamplingParams, UserId,
};
use yal_http::{HttpClassifier, LlamaServerEngine};

/// The console user.
const CONSOLE_USER: UserId = UserId(1);

/// How long to wait for in-flight work on exit.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// One parsed line of shell input.
#[derive(Debug, Clone, PartialEq)]
enum ShellCommand {
    Empty,
    Quit,
    Help,
    Prompt {
        text: String,
        overrides: Vec<(String, String)>,
    },
    Continue(String),
    Draft {
        control_id: String,
        text: String,
    },
}

fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(ShellCommand::Empty);
    }
    if !trimmed.starts_with('/') {
        return Ok(ShellCommand::Prompt {
            text: trimmed.to_string(),
            overrides: Vec::new(),
        });
    }

    let (command, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    let rest = rest.trim();
    match command {
        "/quit" | "/exit" => Ok(ShellCommand::Quit),
        "/help" => Ok(ShellCommand::Help),
        "/continue" if !rest.is_empty() => Ok(ShellCommand::Continue(rest.to_string())),
        "/draft" => match rest.split_once(' ') {
            Some((id, text)) if !text.trim().is_empty() => Ok(ShellCommand::Draft {
                control_id: id.to_string(),
                text: text.trim().to_string(),
            }),
            _ => Err("usage: /draft <control-id> <text>".to_string()),
        },
        "/gen" => {
            let mut overrides = Vec::new();
            let mut words = rest.split(' ').filter(|w| !w.is_empty()).peekable();
            while let Some((key, value)) = words.peek().and_then(|w| w.split_once('=')) {
                overrides.push((key.to_string(), value.to_string()));
                words.next();
            }
            let text = words.collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return Err("usage: /gen [max_tokens=N] [temperature=F] [top_p=F] <prompt>".into());
            }
            Ok(ShellCommand::Prompt { text, overrides })
        }
        "/continue" => Err("usage: /continue <control-id>".to_string()),
        other => Err(format!("unknown command {other}, try /help")),
    }
}

/// Applies `key=value` overrides on top of the configured defaults.
///
/// Only parsing happens here; range checks are the orchestrator's.
fn apply_overrides(
    mut sampling: SamplingParams,
    overrides: &[(String, String)],
) -> Result<SamplingParams, String> {
    for (key, value) in overrides {
        let bad = || format!("invalid value for {key}: {value}");
        match key.as_str() {
            "max_tokens" => sampling.max_tokens = value.parse().map_err(|_| bad())?,
            "temperature" => sampling.temperature = value.parse().map_err(|_| bad())?,
            "top_p" => sampling.top_p = value.parse().map_err(|_| bad())?,
            other => return Err(format!("unknown sampling parameter {other}")),
        }
    }
    Ok(sampling)
}

/// The channel the console speaks in, chosen so channel restrictions pass.
fn console_channel(access: &AccessConfig) -> ChannelId {
    ChannelId(
        access
            .restrict_all_to_channel
            .or(access.restrict_slash_to_channel)
            .unwrap_or(0),
    )
}

/// Plain-text rendering of an outbound message.
fn format_message(msg: &OutboundMessage) -> String {
    let mut out = msg.content.clone();
    if let Some(embed) = &msg.embed {
        if let Some(description) = &embed.description {
            out.push_str(&format!("\n  {description}"));
        }
        for field in &embed.fields {
            out.push_str(&format!("\n  {}: {}", field.name, field.value));
        }
    }
    for control in &msg.controls {
        out.push_str(&format!(
            "\n  [{:?}] {} ({})",
            control.kind(),
            control.label(),
            control.custom_id()
        ));
    }
    out
}

/// Transport that prints to the terminal.
pub struct ConsoleTransport {
    next_id: AtomicU64,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for ConsoleTransport {
    fn name(&self) -> &str {
        "console"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, YalError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), YalError> {
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, YalError> {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        println!("{} {}", format!("#{id}").cyan(), format_message(&msg));
        Ok(id)
    }

    async fn edit(&self, id: &MessageId, msg: OutboundMessage) -> Result<MessageId, YalError> {
        println!("{} {}", format!("#{id} (edited)").cyan(), format_message(&msg));
        Ok(*id)
    }

    async fn member_since(
        &self,
        _channel: &ChannelId,
        _user: &UserId,
    ) -> Result<Option<DateTime<Utc>>, YalError> {
        Ok(None)
    }
}

fn print_help() {
    println!("  <prompt>                        generate with default sampling");
    println!("  /gen [key=value ...] <prompt>   generate with max_tokens, temperature, top_p");
    println!("  /continue <control-id>          press a Continue control");
    println!("  /draft <control-id> <text>      fill a prompt entry before continuing");
    println!("  /quit                           exit");
}

/// Runs the `yal shell` interactive REPL.
pub async fn run_shell(config: YalConfig) -> Result<(), YalError> {
    let engine = LlamaServerEngine::from_config(&config.engine)?;
    match engine.health_check().await? {
        HealthStatus::Healthy => {}
        status => warn!(?status, base_url = %config.engine.base_url, "engine not healthy"),
    }
    let engine: Arc<dyn GenerationEngine> = Arc::new(engine);

    let classifier = HttpClassifier::from_config(&config.moderation)?
        .map(|c| Arc::new(c) as Arc<dyn ToxicityClassifier>);
    let transport: Arc<dyn ChatTransport> = Arc::new(ConsoleTransport::new());

    let orchestrator = Orchestrator::assemble(
        &config,
        engine.clone(),
        transport.clone(),
        classifier,
        Arc::new(SystemClock),
        Arc::new(RandomIdGenerator),
    )
    .await?;
    info!(
        live_elements = orchestrator.continuations().len(),
        "shell orchestrator ready"
    );

    let shutdown = install_signal_handler();
    let channel = console_channel(&config.access);
    let defaults = config.sampling.defaults;
    let mut next_interaction = 0u64;

    let mut rl = DefaultEditor::new()
        .map_err(|e| YalError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", config.bot.name).bold().green());
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());

    let prompt = format!("{}> ", config.bot.name.green());
    while !shutdown.is_cancelled() {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{}", message.yellow());
                continue;
            }
        };
        if command != ShellCommand::Empty {
            let _ = rl.add_history_entry(&line);
        }

        match command {
            ShellCommand::Empty => {}
            ShellCommand::Quit => break,
            ShellCommand::Help => print_help(),
            ShellCommand::Prompt { text, overrides } => {
                let sampling = match apply_overrides(defaults, &overrides) {
                    Ok(sampling) => sampling,
                    Err(message) => {
                        eprintln!("{}", message.yellow());
                        continue;
                    }
                };
                let request = orchestrator.new_request(text, sampling, CONSOLE_USER, channel);
                report(&orchestrator.handle(request).await);
            }
            ShellCommand::Continue(control_id) => {
                next_interaction += 1;
                let interaction = InteractionId(next_interaction);
                match orchestrator
                    .continue_from(&interaction, &control_id, CONSOLE_USER, channel)
                    .await
                {
                    Ok(outcome) => report(&outcome),
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
            ShellCommand::Draft { control_id, text } => {
                match orchestrator.continuations().submit_draft(&control_id, &text) {
                    Ok(()) => println!("{}", "draft saved".dimmed()),
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
        }
    }

    let abandoned = drain_in_flight(orchestrator.admission(), DRAIN_TIMEOUT).await;
    if abandoned > 0 {
        warn!(abandoned, "exiting with requests still in flight");
    }
    engine.shutdown().await?;
    transport.shutdown().await?;
    println!("{}", "goodbye".dimmed());
    Ok(())
}

fn report(outcome: &RunOutcome) {
    let line = match outcome.result() {
        Some(result) if result.used_fallback => format!("{} (fallback text)", outcome.state()),
        Some(result) => format!("{} after {} retries", outcome.state(), result.retries),
        None => outcome.state().to_string(),
    };
    println!("{}", line.dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;
    use yal_core::types::{ControlDescriptor, Embed};

    #[test]
    fn plain_text_is_a_prompt() {
        assert_eq!(
            parse_line("  Once upon a time  ").unwrap(),
            ShellCommand::Prompt {
                text: "Once upon a time".into(),
                overrides: vec![],
            }
        );
        assert_eq!(parse_line("   ").unwrap(), ShellCommand::Empty);
        assert_eq!(parse_line("/exit").unwrap(), ShellCommand::Quit);
    }

    #[test]
    fn gen_collects_leading_overrides() {
        let parsed = parse_line("/gen temperature=0.5 top_p=0.9 Tell me a=b story").unwrap();
        assert_eq!(
            parsed,
            ShellCommand::Prompt {
                text: "Tell me a=b story".into(),
                overrides: vec![
                    ("temperature".into(), "0.5".into()),
                    ("top_p".into(), "0.9".into()),
                ],
            }
        );
        assert!(parse_line("/gen max_tokens=300").is_err());
    }

    #[test]
    fn continue_and_draft_need_arguments() {
        assert_eq!(
            parse_line("/continue abc-continue").unwrap(),
            ShellCommand::Continue("abc-continue".into())
        );
        assert!(parse_line("/continue").is_err());
        assert_eq!(
            parse_line("/draft abc-prompt-entry and then?").unwrap(),
            ShellCommand::Draft {
                control_id: "abc-prompt-entry".into(),
                text: "and then?".into(),
            }
        );
        assert!(parse_line("/draft abc-prompt-entry").is_err());
        assert!(parse_line("/frobnicate").is_err());
    }

    #[test]
    fn overrides_replace_defaults() {
        let base = SamplingParams::default();
        let sampling = apply_overrides(
            base,
            &[
                ("max_tokens".into(), "512".into()),
                ("top_p".into(), "0.5".into()),
            ],
        )
        .unwrap();
        assert_eq!(sampling.max_tokens, 512);
        assert_eq!(sampling.top_p, 0.5);
        assert_eq!(sampling.temperature, base.temperature);

        assert!(apply_overrides(base, &[("max_tokens".into(), "lots".into())]).is_err());
        assert!(apply_overrides(base, &[("seed".into(), "1".into())]).is_err());
    }

    #[test]
    fn console_channel_follows_restrictions() {
        let mut access = AccessConfig::default();
        assert_eq!(console_channel(&access), ChannelId(0));
        access.restrict_slash_to_channel = Some(9);
        assert_eq!(console_channel(&access), ChannelId(9));
        access.restrict_all_to_channel = Some(5);
        assert_eq!(console_channel(&access), ChannelId(5));
    }

    #[test]
    fn message_lists_fields_and_controls() {
        let msg = OutboundMessage::text(ChannelId(1), "done")
            .with_embed(
                Embed::default()
                    .with_field("Prompt", "Hi")
                    .with_field("Response", "Hi there"),
            )
            .with_controls(vec![ControlDescriptor::Button {
                label: "Continue".into(),
                row: 0,
                custom_id: "x-continue".into(),
            }]);
        let text = format_message(&msg);
        assert!(text.starts_with("done"));
        assert!(text.contains("Prompt: Hi"));
        assert!(text.contains("Continue (x-continue)"));
    }

    #[tokio::test]
    async fn console_transport_hands_out_increasing_ids() {
        let transport = ConsoleTransport::new();
        let first = transport.send(OutboundMessage::text(ChannelId(1), "a")).await.unwrap();
        let second = transport.send(OutboundMessage::text(ChannelId(1), "b")).await.unwrap();
        assert!(second.0 > first.0);
        assert_eq!(
            transport.edit(&first, OutboundMessage::text(ChannelId(1), "c")).await.unwrap(),
            first
        );
        assert!(
            transport
                .member_since(&ChannelId(1), &CONSOLE_USER)
                .await
                .unwrap()
                .is_none()
        );
    }
}
