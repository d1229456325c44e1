// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The request pipeline: gates, moderation, admission, generation, delivery.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use yal_admission::AdmissionController;
use yal_config::model::YalConfig;
use yal_core::YalError;
use yal_core::traits::{ChatTransport, Clock, GenerationEngine, IdGenerator, ToxicityClassifier};
use yal_core::types::{
    ChannelId, GenerationRequest, GenerationResult, InteractionId, MessageId, ModerationVerdict,
    OutboundMessage, RecordKey, RequestRecord, SamplingBounds, SamplingParams, UserId,
};
use yal_delivery::render::{DeliveryLimits, render_result};
use yal_delivery::{notice, strip_prompt_echo, template, truncate_to_last_line};
use yal_moderation::ModerationGate;
use yal_storage::{ElementStore, RecordStore, open_record_store};

use crate::continuation::{ContinuationRegistry, new_element};
use crate::gates::{ChannelGate, MembershipGate};
use crate::outcome::{Failure, Rejection, RunOutcome, RunState, notice_for};

/// Pipeline settings derived from [`YalConfig`].
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Budget for the whole attempt loop.
    pub timeout: Duration,
    pub max_attempts: u32,
    pub fallback_text: String,
    pub truncate_to_last_line: bool,
    pub alpaca: bool,
    pub bounds: SamplingBounds,
    pub limits: DeliveryLimits,
    pub channel_gate: ChannelGate,
    pub membership: MembershipGate,
    /// Guild used for jump links when the transport does not know it.
    pub guild: Option<u64>,
    /// How long an element's controls stay live.
    pub reload_window: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from(&YalConfig::default())
    }
}

impl From<&YalConfig> for OrchestratorConfig {
    fn from(config: &YalConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.generation.timeout_secs),
            max_attempts: config.generation.max_attempts,
            fallback_text: config.generation.fallback_text.clone(),
            truncate_to_last_line: config.generation.truncate_to_last_line,
            alpaca: config.generation.alpaca,
            bounds: config.sampling.bounds,
            limits: DeliveryLimits::from(&config.delivery),
            channel_gate: ChannelGate::from(&config.access),
            membership: MembershipGate::from(&config.access),
            guild: config.bot.deployment_id,
            reload_window: config.storage.reload_window(),
        }
    }
}

/// Everything the orchestrator talks to.
pub struct Collaborators {
    pub engine: Arc<dyn GenerationEngine>,
    pub transport: Arc<dyn ChatTransport>,
    pub moderation: Arc<ModerationGate>,
    pub admission: Arc<AdmissionController>,
    pub records: Arc<dyn RecordStore>,
    pub elements: Arc<ElementStore>,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
}

/// Engine output before display processing.
struct Generated {
    output: String,
    attempts: u32,
    used_fallback: bool,
}

/// Runs requests through the full pipeline.
///
/// Cheap to share behind an `Arc`; each request is independent apart from
/// the admission bookkeeping and the element store.
pub struct Orchestrator {
    config: OrchestratorConfig,
    engine: Arc<dyn GenerationEngine>,
    transport: Arc<dyn ChatTransport>,
    moderation: Arc<ModerationGate>,
    admission: Arc<AdmissionController>,
    records: Arc<dyn RecordStore>,
    elements: Arc<ElementStore>,
    continuations: Arc<ContinuationRegistry>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl Orchestrator {
    pub fn new(config: OrchestratorConfig, parts: Collaborators) -> Self {
        let continuations = Arc::new(ContinuationRegistry::new(
            Arc::clone(&parts.records),
            Arc::clone(&parts.ids),
            Arc::clone(&parts.clock),
            config.reload_window,
        ));
        Self {
            config,
            engine: parts.engine,
            transport: parts.transport,
            moderation: parts.moderation,
            admission: parts.admission,
            records: parts.records,
            elements: parts.elements,
            continuations,
            clock: parts.clock,
            ids: parts.ids,
        }
    }

    /// Opens the stores named in `config`, builds the gates and reactivates
    /// elements inside the reload window.
    pub async fn assemble(
        config: &YalConfig,
        engine: Arc<dyn GenerationEngine>,
        transport: Arc<dyn ChatTransport>,
        classifier: Option<Arc<dyn ToxicityClassifier>>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self, YalError> {
        let moderation = ModerationGate::from_config(&config.moderation, classifier)?;
        let records = open_record_store(&config.storage).await?;
        let element_path = config.storage.element_store_path(config.bot.deployment_id);
        let elements = ElementStore::open(&element_path).await?;

        let orchestrator = Self::new(
            OrchestratorConfig::from(config),
            Collaborators {
                engine,
                transport,
                moderation: Arc::new(moderation),
                admission: Arc::new(AdmissionController::from_config(&config.queue)),
                records,
                elements: Arc::new(elements),
                clock,
                ids,
            },
        );

        let window = orchestrator.config.reload_window;
        let now = orchestrator.clock.now().timestamp();
        orchestrator
            .continuations
            .reload(&orchestrator.elements, window, now)
            .await;

        info!(
            store = %element_path.display(),
            classifier = orchestrator.moderation.has_classifier(),
            "orchestrator assembled"
        );
        Ok(orchestrator)
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn admission(&self) -> &Arc<AdmissionController> {
        &self.admission
    }

    pub fn continuations(&self) -> &Arc<ContinuationRegistry> {
        &self.continuations
    }

    pub fn elements(&self) -> &Arc<ElementStore> {
        &self.elements
    }

    /// Fresh request for a command, with a new short id.
    pub fn new_request(
        &self,
        prompt: impl Into<String>,
        sampling: SamplingParams,
        user: UserId,
        channel: ChannelId,
    ) -> GenerationRequest {
        GenerationRequest::new(
            prompt,
            sampling,
            user,
            channel,
            self.ids.short_id(),
            self.clock.now(),
        )
    }

    /// Runs `request` and posts the outcome notice, if any.
    pub async fn handle(&self, request: GenerationRequest) -> RunOutcome {
        let channel = request.channel;
        let outcome = self.run(request).await;
        if let Some(text) = notice_for(&outcome, &self.config.limits) {
            if let Err(e) = self.transport.send(OutboundMessage::text(channel, text)).await {
                warn!(channel_id = %channel, error = %e, "failed to post outcome notice");
            }
        }
        outcome
    }

    /// Handles a "Continue" press on a live element.
    ///
    /// The interaction is acknowledged before any work starts. A press that
    /// cannot be resolved posts a failure notice and returns the error.
    pub async fn continue_from(
        &self,
        interaction: &InteractionId,
        control_id: &str,
        user: UserId,
        channel: ChannelId,
    ) -> Result<RunOutcome, YalError> {
        if let Err(e) = self.transport.defer(interaction).await {
            warn!(interaction_id = %interaction, error = %e, "failed to defer interaction");
        }

        let request = match self
            .continuations
            .continue_from(control_id, user, channel)
            .await
        {
            Ok(request) => request,
            Err(e) => {
                warn!(control_id, user_id = %user, error = %e, "continue press not resolved");
                let text = notice::failure(&e.to_string(), self.config.limits.message_limit);
                if let Err(send_err) = self.transport.send(OutboundMessage::text(channel, text)).await
                {
                    warn!(channel_id = %channel, error = %send_err, "failed to post outcome notice");
                }
                return Err(e);
            }
        };
        Ok(self.handle(request).await)
    }

    /// Runs one request to a terminal outcome.
    ///
    /// Rejections never touch admission or the engine. Once admitted, the
    /// slot is released exactly once whatever happens next.
    pub async fn run(&self, request: GenerationRequest) -> RunOutcome {
        let span = info_span!(
            "run",
            user_id = %request.user,
            short_id = %request.short_id,
            origin = %request.origin,
        );
        let outcome = self.run_inner(request).instrument(span.clone()).await;
        span.in_scope(|| debug!(state = %outcome.state(), "run finished"));
        outcome
    }

    async fn run_inner(&self, request: GenerationRequest) -> RunOutcome {
        debug!(state = %RunState::Gating);
        if let Err(rejection) = self.config.channel_gate.check(request.channel, request.origin) {
            info!(channel_id = %request.channel, "request outside allowed channel");
            return RunOutcome::Rejected(rejection);
        }
        if let Err(e) = self.config.bounds.check(&request.sampling) {
            let detail = match e {
                YalError::InvalidSampling(detail) => detail,
                other => other.to_string(),
            };
            info!(detail = %detail, "sampling parameters out of range");
            return RunOutcome::Rejected(Rejection::InvalidSampling(detail));
        }

        debug!(state = %RunState::Moderating);
        if let ModerationVerdict::Block(reason) = self.moderation.verdict(&request.prompt).await {
            info!(reason = %reason, "prompt blocked by moderation");
            return RunOutcome::Rejected(Rejection::Moderation(reason));
        }

        if let Err(rejection) = self
            .config
            .membership
            .check(
                self.transport.as_ref(),
                request.channel,
                request.user,
                self.clock.now(),
            )
            .await
        {
            info!("user joined too recently");
            return RunOutcome::Rejected(rejection);
        }

        debug!(state = %RunState::Admitting);
        let guard = match self
            .admission
            .admit_guard(request.user, request.short_id.clone())
        {
            Ok(guard) => guard,
            Err(reason) => {
                let in_flight = self.admission.in_flight(request.user);
                info!(reason = %reason, in_flight, "admission denied");
                return RunOutcome::Rejected(Rejection::Admission { reason, in_flight });
            }
        };

        let outcome = self.admitted(&request).await;
        guard.release();
        outcome
    }

    async fn admitted(&self, request: &GenerationRequest) -> RunOutcome {
        let prompt = if self.config.alpaca
            && !request.bypass_template
            && !template::is_templated(&request.prompt)
        {
            template::wrap(&request.prompt, request.input.as_deref())
        } else {
            request.prompt.clone()
        };

        let work_message = match self
            .transport
            .send(OutboundMessage::text(
                request.channel,
                notice::work_started(request.user),
            ))
            .await
        {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "failed to post work message");
                return RunOutcome::Failed(Failure::Transport(e.to_string()));
            }
        };

        debug!(state = %RunState::Generating);
        let cancel = CancellationToken::new();
        let generated = match tokio::time::timeout(
            self.config.timeout,
            self.generate(&prompt, &request.sampling, cancel.clone()),
        )
        .await
        {
            Ok(Ok(generated)) => generated,
            Ok(Err(e)) => {
                error!(error = %e, "generation failed");
                return RunOutcome::Failed(Failure::Generation(e.to_string()));
            }
            Err(_) => {
                cancel.cancel();
                error!(
                    timeout_secs = self.config.timeout.as_secs(),
                    "generation timed out"
                );
                return RunOutcome::Failed(Failure::Timeout(self.config.timeout));
            }
        };

        debug!(state = %RunState::Formatting);
        let display_output = self.display_output(&prompt, &generated.output);
        let display_prompt = if self.config.alpaca {
            template::clean_prompt(&prompt, request.input.is_some())
        } else {
            prompt.clone()
        };
        let embed = render_result(&display_prompt, &display_output, &self.config.limits);

        debug!(state = %RunState::Persisting);
        let key = RecordKey::new(request.user, request.short_id.clone());
        let record = RequestRecord {
            prompt: prompt.clone(),
            output: generated.output.clone(),
            sampling: request.sampling,
        };
        if let Err(e) = self.records.save(&key, &record).await {
            if matches!(e, YalError::DuplicateRecord { .. }) {
                error!(error = %e, "invariant violated: short id reused for a record");
            } else {
                error!(error = %e, "failed to save request record");
            }
            return RunOutcome::Failed(Failure::Store(e.to_string()));
        }

        let element = new_element(
            self.ids.as_ref(),
            work_message,
            request.short_id.clone(),
            request.user,
            self.clock.now().timestamp(),
        );
        if let Err(e) = self.elements.create(element.clone()).await {
            error!(error = %e, "failed to persist interactive element");
            return RunOutcome::Failed(Failure::Store(e.to_string()));
        }
        let controls = element.items.clone();

        let body = OutboundMessage::text(request.channel, notice::generation_complete(request.user))
            .with_embed(embed)
            .with_controls(controls);
        let message_id = match self.transport.edit(&work_message, body).await {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, message_id = %work_message, "failed to deliver result");
                return RunOutcome::Failed(Failure::Transport(e.to_string()));
            }
        };
        // Controls go live only once the user can see them.
        self.continuations.register(element);

        self.send_alert(request.user, request.channel, message_id).await;

        info!(
            attempts = generated.attempts,
            used_fallback = generated.used_fallback,
            output_chars = generated.output.chars().count(),
            "request completed"
        );
        RunOutcome::Completed(GenerationResult {
            short_id: request.short_id.clone(),
            output: generated.output,
            display_output,
            retries: generated.attempts.saturating_sub(1),
            used_fallback: generated.used_fallback,
            message_id,
        })
    }

    /// Calls the engine until it produces something other than the prompt.
    async fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
        cancel: CancellationToken,
    ) -> Result<Generated, YalError> {
        let max_attempts = self.config.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            let output = self.engine.predict(prompt, params, cancel.clone()).await?;
            if output != prompt {
                return Ok(Generated {
                    output,
                    attempts: attempt,
                    used_fallback: false,
                });
            }
            warn!(attempt, max_attempts, "engine returned the prompt unchanged");
        }
        Ok(Generated {
            output: self.config.fallback_text.clone(),
            attempts: max_attempts,
            used_fallback: true,
        })
    }

    fn display_output(&self, prompt: &str, output: &str) -> String {
        let answer = if self.config.alpaca {
            template::extract_answer(output)
        } else {
            output
        };
        let stripped = strip_prompt_echo(prompt, answer);
        if self.config.truncate_to_last_line {
            truncate_to_last_line(stripped).to_string()
        } else {
            stripped.to_string()
        }
    }

    /// Pings the user with a link to the finished result. Best effort.
    async fn send_alert(&self, user: UserId, channel: ChannelId, message: MessageId) {
        let guild = self.transport.guild_of(&channel).or(self.config.guild);
        let (content, embed) = notice::completion_alert(user, guild, channel, message);
        if let Err(e) = self
            .transport
            .send(OutboundMessage::text(channel, content).with_embed(embed))
            .await
        {
            warn!(error = %e, "failed to send completion alert");
        }
    }
}
