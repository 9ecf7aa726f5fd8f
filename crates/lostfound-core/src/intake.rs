//! Report intake state machine.
//!
//! The machine is a pure reducer: `IntakeFlow::advance` takes the current
//! state and one user utterance and returns the next state plus a single
//! effect describing what the caller should emit. It never touches clocks,
//! ids, storage or timers; `IntakeSession` performs those side effects.

use crate::flow::IntakeFlow;
use log::debug;
use lostfound_config::FieldKey;

/// Position of a conversation within its flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntakeStep {
    /// No report in progress.
    #[default]
    Idle,
    /// Waiting for the answer to step `k`.
    AwaitingField(usize),
}

impl IntakeStep {
    /// Numeric step index, `-1` when idle.
    pub fn index(&self) -> i64 {
        match self {
            IntakeStep::Idle => -1,
            IntakeStep::AwaitingField(k) => *k as i64,
        }
    }
}

/// Answers collected so far for the report in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDraft {
    name: Option<String>,
    location: Option<String>,
    date: Option<String>,
    description: Option<String>,
    contact_info: Option<String>,
}

impl ReportDraft {
    fn slot(&mut self, field: FieldKey) -> &mut Option<String> {
        match field {
            FieldKey::Name => &mut self.name,
            FieldKey::Location => &mut self.location,
            FieldKey::Date => &mut self.date,
            FieldKey::Description => &mut self.description,
            FieldKey::ContactInfo => &mut self.contact_info,
        }
    }

    /// Store an answer for a field.
    pub fn set(&mut self, field: FieldKey, value: impl Into<String>) {
        *self.slot(field) = Some(value.into());
    }

    /// Answer for a field, if one was given.
    pub fn get(&self, field: FieldKey) -> Option<&str> {
        let value = match field {
            FieldKey::Name => &self.name,
            FieldKey::Location => &self.location,
            FieldKey::Date => &self.date,
            FieldKey::Description => &self.description,
            FieldKey::ContactInfo => &self.contact_info,
        };
        value.as_deref()
    }

    /// Answer for a field, empty when the flow never asked for it.
    pub fn value_or_empty(&self, field: FieldKey) -> String {
        self.get(field).unwrap_or_default().to_string()
    }

    pub fn is_empty(&self) -> bool {
        *self == ReportDraft::default()
    }
}

/// Conversation state threaded through the reducer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeState {
    step: IntakeStep,
    draft: ReportDraft,
}

impl IntakeState {
    pub fn step(&self) -> IntakeStep {
        self.step
    }

    pub fn draft(&self) -> &ReportDraft {
        &self.draft
    }
}

/// What the caller must emit after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeEffect {
    /// Input ignored; emit nothing.
    None,
    /// Ask the question of step `k`.
    Prompt(usize),
    /// All answers collected; persist this draft and emit the summary.
    Finalize(ReportDraft),
}

/// Result of feeding one utterance to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: IntakeState,
    pub effect: IntakeEffect,
}

impl IntakeFlow {
    /// Apply one user utterance to `state`.
    ///
    /// Blank input is a no-op. From `Idle` any other input starts the flow
    /// without being recorded. While awaiting step `k` the input is stored
    /// verbatim; the last answer resets the state to `Idle` and hands the
    /// finished draft back in the effect.
    pub fn advance(&self, state: IntakeState, input: &str) -> Transition {
        if input.trim().is_empty() {
            return Transition {
                state,
                effect: IntakeEffect::None,
            };
        }

        let IntakeStep::AwaitingField(k) = state.step else {
            return self.start();
        };
        let Some(step) = self.steps().get(k) else {
            debug!(
                "step out of range, restarting flow (kind={}, step={}, len={})",
                self.kind(),
                k,
                self.len()
            );
            return self.start();
        };

        let mut draft = state.draft;
        draft.set(step.field, input);
        let next = k + 1;
        if next < self.len() {
            Transition {
                state: IntakeState {
                    step: IntakeStep::AwaitingField(next),
                    draft,
                },
                effect: IntakeEffect::Prompt(next),
            }
        } else {
            Transition {
                state: IntakeState::default(),
                effect: IntakeEffect::Finalize(draft),
            }
        }
    }

    fn start(&self) -> Transition {
        if self.is_empty() {
            debug!("flow has no steps, nothing to start (kind={})", self.kind());
            return Transition {
                state: IntakeState::default(),
                effect: IntakeEffect::None,
            };
        }
        Transition {
            state: IntakeState {
                step: IntakeStep::AwaitingField(0),
                draft: ReportDraft::default(),
            },
            effect: IntakeEffect::Prompt(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{IntakeEffect, IntakeState, IntakeStep};
    use crate::flow::IntakeFlow;
    use crate::types::ReportKind;
    use lostfound_config::{FieldKey, FlowConfig, LostFoundConfig};
    use pretty_assertions::assert_eq;

    fn found_flow() -> IntakeFlow {
        IntakeFlow::found(&LostFoundConfig::default())
    }

    #[test]
    fn first_message_only_starts_the_flow() {
        let flow = found_flow();
        let transition = flow.advance(IntakeState::default(), "وجدت شيئا");
        assert_eq!(transition.effect, IntakeEffect::Prompt(0));
        assert_eq!(transition.state.step(), IntakeStep::AwaitingField(0));
        assert!(transition.state.draft().is_empty());
    }

    #[test]
    fn blank_input_leaves_state_untouched() {
        let flow = found_flow();
        let started = flow.advance(IntakeState::default(), "hi").state;
        let answered = flow.advance(started, "دفتر").state;
        for blank in ["", "   ", "\n\t"] {
            let transition = flow.advance(answered.clone(), blank);
            assert_eq!(transition.effect, IntakeEffect::None);
            assert_eq!(transition.state, answered);
        }
        assert_eq!(
            flow.advance(IntakeState::default(), " ").state.step(),
            IntakeStep::Idle
        );
    }

    #[test]
    fn steps_advance_by_one_and_finalize_in_order() {
        let flow = found_flow();
        let mut state = flow.advance(IntakeState::default(), "start").state;
        let answers = ["دفتر", "المكتبة", "أمس", "أغلفة زرقاء"];
        let mut finalized = None;
        for (idx, answer) in answers.iter().enumerate() {
            assert_eq!(state.step().index(), idx as i64);
            let transition = flow.advance(state, answer);
            state = transition.state;
            match transition.effect {
                IntakeEffect::Prompt(next) => assert_eq!(next, idx + 1),
                IntakeEffect::Finalize(draft) => finalized = Some(draft),
                IntakeEffect::None => panic!("answer {idx} was ignored"),
            }
        }
        let draft = finalized.expect("finalized");
        assert_eq!(draft.get(FieldKey::Name), Some("دفتر"));
        assert_eq!(draft.get(FieldKey::Location), Some("المكتبة"));
        assert_eq!(draft.get(FieldKey::Date), Some("أمس"));
        assert_eq!(draft.get(FieldKey::Description), Some("أغلفة زرقاء"));
        assert_eq!(draft.get(FieldKey::ContactInfo), None);
        assert_eq!(draft.value_or_empty(FieldKey::ContactInfo), "");
        assert_eq!(state, IntakeState::default());
    }

    #[test]
    fn empty_flow_never_starts() {
        let flow = IntakeFlow::from_config(
            ReportKind::Found,
            &FlowConfig {
                steps: Vec::new(),
                ..FlowConfig::default_found()
            },
        );
        for input in ["start", "another one"] {
            let transition = flow.advance(IntakeState::default(), input);
            assert_eq!(transition.effect, IntakeEffect::None);
            assert_eq!(transition.state, IntakeState::default());
        }
    }

    #[test]
    fn answers_are_stored_verbatim() {
        let flow = found_flow();
        let state = flow.advance(IntakeState::default(), "start").state;
        let state = flow.advance(state, "  Blue Notebook  ").state;
        assert_eq!(state.draft().get(FieldKey::Name), Some("  Blue Notebook  "));
    }

    #[test]
    fn completed_flow_restarts_on_next_input() {
        let flow = found_flow();
        let mut state = flow.advance(IntakeState::default(), "start").state;
        for answer in ["a1", "b2", "c3", "d4"] {
            state = flow.advance(state, answer).state;
        }
        assert_eq!(state.step(), IntakeStep::Idle);
        let transition = flow.advance(state, "another one");
        assert_eq!(transition.effect, IntakeEffect::Prompt(0));
        assert!(transition.state.draft().is_empty());
    }
}
