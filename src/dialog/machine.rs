use super::error::{StateError, StateResult};
use super::event::{DialogEvent, StateTransition};
use super::model::DialogState;

#[derive(Debug)]
pub struct DialogLifecycle {
    state: DialogState,
    transition_history: Vec<StateTransition>,
}

impl DialogLifecycle {
    pub fn new() -> Self {
        Self {
            state: DialogState::default(),
            transition_history: Vec::new(),
        }
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn can_transition(&self, event: DialogEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: DialogEvent) -> Option<DialogState> {
        use DialogEvent::*;
        match (self.state, event) {
            (DialogState::Closed, Open) => Some(DialogState::Open),
            (DialogState::Open, Close) => Some(DialogState::Settling),
            (DialogState::Settling, Commit) => Some(DialogState::Confirmed),
            (DialogState::Settling, Rollback) => Some(DialogState::Cancelled),
            (DialogState::Confirmed, Finish) => Some(DialogState::Closed),
            (DialogState::Cancelled, Finish) => Some(DialogState::Closed),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: DialogEvent) -> StateResult<DialogState> {
        tracing::debug!(from = ?self.state, event = ?event, "request dialog transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid dialog transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        let record = StateTransition::new(Some(self.state), event, next);
        self.state = next;
        self.transition_history.push(record);

        Ok(self.state)
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.transition_history
    }
}

impl Default for DialogLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DialogLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DialogState::{:?}", self.state)
    }
}
