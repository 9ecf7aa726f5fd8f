//! Core lost & found primitives.
//!
//! This crate owns the report intake state machine and its session driver,
//! the lost/found match finder, the admin desk operations, and the cosmetic
//! reply scheduler used by chat front ends.

pub mod admin;
pub mod error;
pub mod flow;
pub mod intake;
pub mod matcher;
pub mod replies;
pub mod session;
pub mod types;

pub use admin::{AdminDesk, FoundItemForm};
pub use error::LostFoundCoreError;
pub use flow::{FlowStep, IntakeFlow};
pub use intake::{IntakeEffect, IntakeState, IntakeStep, ReportDraft, Transition};
pub use matcher::{MatchAssessment, MatchedItem, find_matches};
/// Reply scheduling for chat front ends.
pub use replies::{ReplyScheduler, ReplyTiming};
/// Intake session driver and completion hooks.
pub use session::{BotReply, IntakeSession, NoopReportSink, ReplyKind, ReportSink};
pub use types::{
    ChatMessage, CompletedReport, FOUND_COLLECTION, FoundRecord, FoundStatus, ItemId,
    LOST_COLLECTION, LostRecord, LostStatus, ReportKind, Sender, short_id,
};
