//! Session orchestration: phase gating, the advisory pending flag, and the
//! event stream presentation layers subscribe to.
//!
//! Long-running actions come in two shapes. `send_message`, `compact`, and
//! `ingest` hold the session for the whole call. The `begin_*` / `resolve_*` /
//! `finish_*` triples release it while the request is in flight, so a caller
//! can render the provisional state (user turn appended, pending set) before
//! the reply lands.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

use debtguard_core::errors::GenerationError;
use debtguard_core::events::{PendingAction, SessionEvent};
use debtguard_core::input::InputSpec;
use debtguard_core::phase::{Phase, PhaseError};
use debtguard_core::provider::{GenerationRequest, Generator};
use debtguard_llm::{GeminiConfig, GeminiProvider, Invoker, RetryPolicy};
use debtguard_settings::DebtguardSettings;

use crate::compaction::{CompactionFailure, Compactor};
use crate::conversation::{ConversationEngine, TurnOutcome};
use crate::error::{EngineError, COMPACTION_FAILED_MESSAGE};
use crate::fetch::{ContentFetcher, ReaderProxy};
use crate::session::Session;
use crate::synthesis::ContractSynthesizer;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A conversation request whose user turn is already in the log.
#[derive(Debug)]
pub struct PendingTurn {
    request: GenerationRequest,
}

impl PendingTurn {
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }
}

#[derive(Debug)]
pub struct PendingCompaction {
    request: GenerationRequest,
}

impl PendingCompaction {
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }
}

pub struct Workflow {
    synthesizer: ContractSynthesizer,
    conversation: ConversationEngine,
    compactor: Compactor,
    events: broadcast::Sender<SessionEvent>,
}

impl Workflow {
    pub fn new(generator: Arc<dyn Generator>, fetcher: Arc<dyn ContentFetcher>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            synthesizer: ContractSynthesizer::new(generator.clone(), fetcher),
            conversation: ConversationEngine::new(generator.clone()),
            compactor: Compactor::new(generator),
            events,
        }
    }

    /// Gemini behind the retrying invoker, plus the reader proxy.
    pub fn from_settings(settings: &DebtguardSettings) -> Result<Self, EngineError> {
        let provider = GeminiProvider::new(GeminiConfig {
            base_url: settings.generation.base_url.clone(),
            model: settings.generation.model.clone(),
            api_key: settings.api_key.clone(),
            timeout: Duration::from_secs(settings.generation.timeout_secs),
        })
        .map_err(|e| EngineError::Internal(e.to_string()))?;
        let policy =
            RetryPolicy::from_millis(settings.retry.max_attempts, &settings.retry.delays_ms);
        let generator: Arc<dyn Generator> = Arc::new(Invoker::new(provider, policy));

        let fetcher: Arc<dyn ContentFetcher> = Arc::new(ReaderProxy::new(
            settings.reader.proxy_prefix.clone(),
            Duration::from_secs(settings.reader.timeout_secs),
        ));

        Ok(Self::new(generator, fetcher)
            .with_max_context_chars(settings.synthesis.max_context_chars))
    }

    pub fn with_max_context_chars(mut self, max_chars: usize) -> Self {
        self.synthesizer = self.synthesizer.with_max_context_chars(max_chars);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn set_pending(&self, session: &mut Session, action: PendingAction, pending: bool) {
        session.pending = pending.then_some(action);
        self.emit(SessionEvent::PendingChanged {
            session_id: session.id().clone(),
            action,
            pending,
        });
    }

    fn transition(&self, session: &mut Session, to: Phase) -> Result<(), EngineError> {
        let from = session.phase;
        session.phase = from.advance(to)?;
        info!(session_id = %session.id(), %from, %to, "phase changed");
        self.emit(SessionEvent::PhaseChanged {
            session_id: session.id().clone(),
            from,
            to,
        });
        Ok(())
    }

    fn emit_last_turn(&self, session: &Session) {
        if let Some(turn) = session.log.last() {
            self.emit(SessionEvent::TurnAppended {
                session_id: session.id().clone(),
                index: session.log.len() - 1,
                role: turn.role(),
                content: turn.content().to_string(),
            });
        }
    }

    fn emit_contract_updated(&self, session: &Session) {
        self.emit(SessionEvent::ContractUpdated {
            session_id: session.id().clone(),
            length: session.contract.as_str().len(),
        });
    }

    // ── Ingest → Contract ──

    /// Synthesizes the contract and moves to the Contract phase. On any
    /// failure the session stays in Ingest with its contract untouched.
    #[instrument(skip_all, fields(session_id = %session.id(), kind = ?input.kind()))]
    pub async fn ingest(&self, session: &mut Session, input: InputSpec) -> Result<(), EngineError> {
        if let Some(action) = session.pending {
            return Err(EngineError::Busy(action));
        }
        session.phase.require(Phase::Ingest, "ingest")?;
        self.synthesizer.validate(&input)?;

        self.set_pending(session, PendingAction::Synthesis, true);
        let session_id = session.id().clone();
        let result = self
            .synthesizer
            .synthesize_with(&input, |stage| {
                self.emit(SessionEvent::SynthesisStage {
                    session_id: session_id.clone(),
                    stage,
                });
            })
            .await;
        self.set_pending(session, PendingAction::Synthesis, false);

        session.contract = result?;
        self.emit_contract_updated(session);
        self.transition(session, Phase::Contract)
    }

    // ── Contract ──

    /// Overwrites the contract in place. Allowed once a contract exists.
    pub fn edit_contract(&self, session: &mut Session, text: impl Into<String>) -> Result<(), EngineError> {
        if session.phase == Phase::Ingest {
            return Err(EngineError::Phase(PhaseError::NotAvailable {
                phase: session.phase,
                action: "edit_contract",
            }));
        }
        session.contract.replace(text);
        debug!(session_id = %session.id(), length = session.contract.as_str().len(), "contract edited");
        self.emit_contract_updated(session);
        Ok(())
    }

    /// Contract → Workspace. Unconditional: the contract is not inspected.
    pub fn sign_contract(&self, session: &mut Session) -> Result<(), EngineError> {
        self.transition(session, Phase::Workspace)
    }

    // ── Workspace: conversation ──

    /// Appends the user turn and marks the session pending. `Ok(None)` when
    /// the message is blank or another request is pending.
    pub fn begin_send(
        &self,
        session: &mut Session,
        message: &str,
    ) -> Result<Option<PendingTurn>, EngineError> {
        session.phase.require(Phase::Workspace, "send")?;
        if session.is_pending() {
            debug!(session_id = %session.id(), "send ignored, request pending");
            return Ok(None);
        }
        let Some(request) = self
            .conversation
            .open_turn(&mut session.log, &session.contract, message)
        else {
            return Ok(None);
        };
        self.emit_last_turn(session);
        self.set_pending(session, PendingAction::Conversation, true);
        Ok(Some(PendingTurn { request }))
    }

    pub async fn resolve_turn(&self, turn: PendingTurn) -> TurnOutcome {
        self.conversation.resolve(turn.request).await
    }

    pub fn finish_send(&self, session: &mut Session, outcome: TurnOutcome) {
        ConversationEngine::close_turn(&mut session.log, outcome);
        self.emit_last_turn(session);
        self.set_pending(session, PendingAction::Conversation, false);
    }

    /// Returns whether a request was made.
    pub async fn send_message(&self, session: &mut Session, message: &str) -> Result<bool, EngineError> {
        let Some(turn) = self.begin_send(session, message)? else {
            return Ok(false);
        };
        let outcome = self.resolve_turn(turn).await;
        self.finish_send(session, outcome);
        Ok(true)
    }

    // ── Workspace: compaction ──

    /// `Ok(None)` when the log is empty or another request is pending.
    pub fn begin_compaction(&self, session: &mut Session) -> Result<Option<PendingCompaction>, EngineError> {
        session.phase.require(Phase::Workspace, "compact")?;
        if session.is_pending() {
            debug!(session_id = %session.id(), "compaction ignored, request pending");
            return Ok(None);
        }
        let Some(request) = Compactor::prepare(&session.log) else {
            return Ok(None);
        };
        self.set_pending(session, PendingAction::Compaction, true);
        Ok(Some(PendingCompaction { request }))
    }

    pub async fn resolve_compaction(&self, pending: PendingCompaction) -> Result<String, GenerationError> {
        self.compactor.summarize(pending.request).await
    }

    /// On failure the log is left as it was and an alert is emitted.
    #[instrument(skip_all, fields(session_id = %session.id()))]
    pub fn finish_compaction(
        &self,
        session: &mut Session,
        result: Result<String, GenerationError>,
    ) -> Result<(), EngineError> {
        self.set_pending(session, PendingAction::Compaction, false);
        let log = std::mem::take(&mut session.log);
        let turns_discarded = log.len();
        match Compactor::apply(log, result) {
            Ok(log) => {
                session.log = log;
                self.emit(SessionEvent::CompactionComplete {
                    session_id: session.id().clone(),
                    turns_discarded,
                });
                self.emit_last_turn(session);
                Ok(())
            }
            Err(CompactionFailure { log, error }) => {
                session.log = log;
                self.emit(SessionEvent::Alert {
                    session_id: session.id().clone(),
                    message: COMPACTION_FAILED_MESSAGE.to_string(),
                });
                Err(EngineError::Compaction(error))
            }
        }
    }

    /// Returns whether the log was replaced.
    pub async fn compact(&self, session: &mut Session) -> Result<bool, EngineError> {
        let Some(pending) = self.begin_compaction(session)? else {
            return Ok(false);
        };
        let result = self.resolve_compaction(pending).await;
        self.finish_compaction(session, result)?;
        Ok(true)
    }
}
