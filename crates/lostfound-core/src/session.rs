//! Intake session driver.
//!
//! Owns one conversation: feeds user utterances through the flow reducer,
//! keeps the transcript, and on completion stamps, persists and announces the
//! finished record.

use crate::error::LostFoundCoreError;
use crate::flow::IntakeFlow;
use crate::intake::{IntakeEffect, IntakeState, IntakeStep, ReportDraft};
use crate::types::{
    ChatMessage, CompletedReport, FoundRecord, FoundStatus, ItemId, LostRecord, LostStatus,
    ReportKind, short_id,
};
use chrono::Utc;
use log::{debug, error, info};
use lostfound_config::FieldKey;
use lostfound_store::CollectionStore;
use std::sync::Arc;

/// Receives every record an intake session finalizes.
pub trait ReportSink: Send + Sync {
    /// Called once per persisted record.
    fn report_completed(&self, report: &CompletedReport);
}

/// Sink that ignores completions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReportSink;

impl ReportSink for NoopReportSink {
    fn report_completed(&self, _report: &CompletedReport) {}
}

/// What a bot reply is, so front ends can pick its display delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Prompt,
    Summary,
}

/// Bot message produced by one accepted user message.
#[derive(Debug, Clone, PartialEq)]
pub struct BotReply {
    pub kind: ReplyKind,
    pub message: ChatMessage,
}

/// One intake conversation bound to a flow, a store and a completion sink.
pub struct IntakeSession {
    flow: IntakeFlow,
    state: IntakeState,
    transcript: Vec<ChatMessage>,
    store: Arc<CollectionStore>,
    sink: Arc<dyn ReportSink>,
}

impl IntakeSession {
    /// Open a conversation; the transcript starts with the flow greeting.
    pub fn new(flow: IntakeFlow, store: Arc<CollectionStore>, sink: Arc<dyn ReportSink>) -> Self {
        info!(
            "intake session opened (kind={}, steps={})",
            flow.kind(),
            flow.len()
        );
        let transcript = vec![ChatMessage::bot(flow.greeting())];
        Self {
            flow,
            state: IntakeState::default(),
            transcript,
            store,
            sink,
        }
    }

    pub fn flow(&self) -> &IntakeFlow {
        &self.flow
    }

    pub fn step(&self) -> IntakeStep {
        self.state.step()
    }

    pub fn draft(&self) -> &ReportDraft {
        self.state.draft()
    }

    /// Every message exchanged so far, oldest first.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Feed one user utterance.
    ///
    /// Input that produces no reply (blank input, or any input to a flow with
    /// no steps) returns `Ok(None)` and leaves the transcript untouched.
    /// Otherwise the user message and exactly one bot reply are appended. A
    /// failed persistence write is returned as an error after the session has
    /// already been reset, so a partial report is never kept around.
    pub fn handle_message(
        &mut self,
        input: &str,
    ) -> Result<Option<BotReply>, LostFoundCoreError> {
        let state = std::mem::take(&mut self.state);
        let transition = self.flow.advance(state, input);
        self.state = transition.state;

        let reply = match transition.effect {
            IntakeEffect::None => {
                debug!("input produced no reply (kind={})", self.flow.kind());
                return Ok(None);
            }
            IntakeEffect::Prompt(index) => {
                self.transcript.push(ChatMessage::user(input));
                let prompt = self.flow.prompt(index).unwrap_or_default();
                debug!(
                    "prompting (kind={}, step={}, prompt_len={})",
                    self.flow.kind(),
                    index,
                    prompt.len()
                );
                BotReply {
                    kind: ReplyKind::Prompt,
                    message: ChatMessage::bot(prompt),
                }
            }
            IntakeEffect::Finalize(draft) => {
                self.transcript.push(ChatMessage::user(input));
                let report = self.finalize(&draft)?;
                let summary = self
                    .flow
                    .render_summary(|field| report.field(field), &short_id(report.id()));
                self.sink.report_completed(&report);
                BotReply {
                    kind: ReplyKind::Summary,
                    message: ChatMessage::bot(summary),
                }
            }
        };
        self.transcript.push(reply.message.clone());
        Ok(Some(reply))
    }

    /// Stamp the draft with an id and timestamp and append it to its collection.
    fn finalize(&self, draft: &ReportDraft) -> Result<CompletedReport, LostFoundCoreError> {
        let report = build_report(self.flow.kind(), draft);
        let collection = report.kind().collection();
        let written = match &report {
            CompletedReport::Lost(record) => self.store.append_one(collection, record),
            CompletedReport::Found(record) => self.store.append_one(collection, record),
        };
        if let Err(err) = written {
            error!(
                "failed to persist report (kind={}, id={}, err={})",
                report.kind(),
                report.id(),
                err
            );
            return Err(err.into());
        }
        info!(
            "report persisted (kind={}, id={})",
            report.kind(),
            report.id()
        );
        Ok(report)
    }
}

/// Promote a finished draft to a record; fields the flow never asked are empty.
fn build_report(kind: ReportKind, draft: &ReportDraft) -> CompletedReport {
    let id = ItemId::generate();
    let created_at = Utc::now();
    match kind {
        ReportKind::Lost => CompletedReport::Lost(LostRecord {
            id,
            name: draft.value_or_empty(FieldKey::Name),
            description: draft.value_or_empty(FieldKey::Description),
            location: draft.value_or_empty(FieldKey::Location),
            date: draft.value_or_empty(FieldKey::Date),
            contact_info: draft.value_or_empty(FieldKey::ContactInfo),
            status: LostStatus::Pending,
            created_at,
        }),
        ReportKind::Found => CompletedReport::Found(FoundRecord {
            id,
            name: draft.value_or_empty(FieldKey::Name),
            description: draft.value_or_empty(FieldKey::Description),
            location: draft.value_or_empty(FieldKey::Location),
            date: draft.value_or_empty(FieldKey::Date),
            status: FoundStatus::Available,
            created_at,
        }),
    }
}
