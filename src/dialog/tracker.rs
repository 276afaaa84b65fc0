use std::collections::HashMap;

use super::confirm::ConfirmationMatcher;
use super::error::StateResult;
use super::event::DialogEvent;
use super::machine::DialogLifecycle;
use super::model::DialogState;
use super::surface::{ControlId, DialogHandle, DialogKind, DialogSnapshot, SessionId};
use crate::upload::{AssetRef, UploadRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing to roll back: the insert was confirmed, no image was picked, or
    /// the reference is not one we uploaded and still own.
    Confirmed { reference: Option<AssetRef> },
    /// The dialog went away without confirmation while holding our upload.
    Cancelled { reference: AssetRef },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub session: SessionId,
    pub verdict: Verdict,
}

#[derive(Debug)]
struct DialogSession {
    id: SessionId,
    handle: DialogHandle,
    observed: Option<AssetRef>,
    confirmed: bool,
    pending_uploads: usize,
    confirmation: ConfirmationMatcher,
    lifecycle: DialogLifecycle,
}

impl DialogSession {
    fn is_open(&self) -> bool {
        self.lifecycle.state() == DialogState::Open
    }

    fn confirm(&mut self) -> bool {
        if !self.is_open() || self.confirmed {
            return false;
        }
        self.confirmed = true;
        tracing::debug!(session = %self.id, "dialog insertion confirmed");
        true
    }
}

/// Follows the single image-insertion dialog and turns each session into
/// exactly one commit-or-rollback [`Decision`].
///
/// A session that closes while uploads it started are still in flight is
/// parked until the last of them settles, so a late upload is judged against
/// the session's final state.
#[derive(Debug)]
pub struct InsertionDialogTracker {
    active: Option<DialogSession>,
    settling: HashMap<SessionId, DialogSession>,
    next_session: u64,
}

impl Default for InsertionDialogTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl InsertionDialogTracker {
    pub fn new() -> Self {
        Self {
            active: None,
            settling: HashMap::new(),
            next_session: 1,
        }
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.active.as_ref().map(|session| session.id)
    }

    pub fn observed_reference(&self) -> Option<&AssetRef> {
        self.active.as_ref()?.observed.as_ref()
    }

    pub fn is_confirmed(&self) -> bool {
        self.active.as_ref().is_some_and(|session| session.confirmed)
    }

    pub fn settling_sessions(&self) -> usize {
        self.settling.len()
    }

    pub fn dialog_opened(&mut self, snapshot: &DialogSnapshot) -> StateResult<Option<SessionId>> {
        if snapshot.kind != DialogKind::ImageInsert {
            return Ok(None);
        }
        if let Some(active) = &self.active {
            tracing::debug!(
                tracked = %active.id,
                handle = ?snapshot.handle,
                "image dialog opened while another is tracked; ignoring"
            );
            return Ok(None);
        }

        let id = SessionId::new(self.next_session);
        self.next_session += 1;
        let mut lifecycle = DialogLifecycle::new();
        lifecycle.transition(DialogEvent::Open)?;

        let session = DialogSession {
            id,
            handle: snapshot.handle,
            observed: snapshot.field_value.as_deref().and_then(AssetRef::parse),
            confirmed: false,
            pending_uploads: 0,
            confirmation: ConfirmationMatcher::from_controls(&snapshot.controls),
            lifecycle,
        };
        tracing::debug!(
            session = %id,
            handle = ?snapshot.handle,
            confirmation = ?session.confirmation,
            "image dialog session opened"
        );
        self.active = Some(session);
        Ok(Some(id))
    }

    /// Last non-empty write wins; clearing the field does not forget the upload.
    pub fn field_changed(&mut self, handle: DialogHandle, value: &str) -> bool {
        let Some(session) = self.tracked_mut(handle) else {
            return false;
        };
        let Some(reference) = AssetRef::parse(value) else {
            return false;
        };
        if session.observed.as_ref() != Some(&reference) {
            tracing::debug!(session = %session.id, %reference, "dialog image reference changed");
            session.observed = Some(reference);
        }
        true
    }

    pub fn control_activated(&mut self, handle: DialogHandle, control: ControlId) -> bool {
        let Some(session) = self.tracked_mut(handle) else {
            return false;
        };
        if !session.confirmation.confirms(control) {
            return false;
        }
        session.confirm()
    }

    pub fn primary_action_activated(&mut self, handle: DialogHandle) -> bool {
        self.tracked_mut(handle)
            .is_some_and(|session| session.confirm())
    }

    /// Attaches a newly started upload to the open session, if any.
    pub fn upload_started(&mut self) -> Option<SessionId> {
        let session = self.active.as_mut()?;
        session.pending_uploads += 1;
        Some(session.id)
    }

    pub fn dialog_closed(
        &mut self,
        handle: DialogHandle,
        registry: &mut UploadRegistry,
    ) -> StateResult<Option<Decision>> {
        if !self
            .active
            .as_ref()
            .is_some_and(|session| session.handle == handle)
        {
            return Ok(None);
        }
        let Some(mut session) = self.active.take() else {
            return Ok(None);
        };
        session.lifecycle.transition(DialogEvent::Close)?;

        if session.pending_uploads > 0 {
            tracing::info!(
                session = %session.id,
                pending = session.pending_uploads,
                "dialog closed with uploads in flight; deferring decision"
            );
            self.settling.insert(session.id, session);
            return Ok(None);
        }
        decide(session, registry).map(Some)
    }

    /// Reports a finished upload that was started while `session_id` was open.
    /// `reference` is `None` when the upload failed.
    pub fn upload_settled(
        &mut self,
        session_id: SessionId,
        reference: Option<&AssetRef>,
        registry: &mut UploadRegistry,
    ) -> StateResult<Option<Decision>> {
        if let Some(session) = self
            .active
            .as_mut()
            .filter(|session| session.id == session_id)
        {
            session.pending_uploads = session.pending_uploads.saturating_sub(1);
            if let Some(reference) = reference {
                session.observed = Some(reference.clone());
            }
            return Ok(None);
        }

        let Some(session) = self.settling.get_mut(&session_id) else {
            tracing::warn!(session = %session_id, "upload settled for an unknown dialog session");
            return Ok(None);
        };
        session.pending_uploads = session.pending_uploads.saturating_sub(1);
        // A confirmed session inserted whatever the field held at close.
        if let Some(reference) = reference.filter(|_| !session.confirmed) {
            session.observed = Some(reference.clone());
        }
        if session.pending_uploads > 0 {
            return Ok(None);
        }

        match self.settling.remove(&session_id) {
            Some(session) => decide(session, registry).map(Some),
            None => Ok(None),
        }
    }

    fn tracked_mut(&mut self, handle: DialogHandle) -> Option<&mut DialogSession> {
        self.active
            .as_mut()
            .filter(|session| session.handle == handle)
    }
}

fn decide(mut session: DialogSession, registry: &mut UploadRegistry) -> StateResult<Decision> {
    let rollback = match &session.observed {
        Some(reference) if !session.confirmed && registry.is_unconfirmed(reference) => {
            Some(reference.clone())
        }
        _ => None,
    };

    let verdict = match rollback {
        Some(reference) => {
            session.lifecycle.transition(DialogEvent::Rollback)?;
            Verdict::Cancelled { reference }
        }
        None => {
            session.lifecycle.transition(DialogEvent::Commit)?;
            if session.confirmed {
                if let Some(reference) = &session.observed {
                    registry.confirm(reference);
                }
            }
            Verdict::Confirmed {
                reference: session.observed.clone(),
            }
        }
    };
    session.lifecycle.transition(DialogEvent::Finish)?;

    tracing::info!(session = %session.id, ?verdict, "image dialog session decided");
    Ok(Decision {
        session: session.id,
        verdict,
    })
}
