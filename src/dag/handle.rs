// src/dag/handle.rs

//! Client-facing handles.

use crate::dag::op::{OpKey, OpRef};
use crate::errors::{LazydagError, Result};
use crate::session::SessionId;

/// Binds one operation to the session that created it.
///
/// Higher-level objects (graphs, apps, contexts) hold a `Handle` and consult
/// [`Handle::is_evaluated`] to decide whether reading them requires a
/// dispatch first. The handle keeps a reference to the operation rather than
/// a copy of its flag, so it always sees the current state.
#[derive(Debug, Clone)]
pub struct Handle {
    op: Option<OpRef>,
    session_id: SessionId,
}

impl Handle {
    pub fn new(op: OpRef, session_id: SessionId) -> Self {
        Self {
            op: Some(op),
            session_id,
        }
    }

    /// A handle that is not bound to any operation yet.
    pub fn unbound(session_id: SessionId) -> Self {
        Self {
            op: None,
            session_id,
        }
    }

    /// Attach the operation this handle stands for.
    pub fn bind(&mut self, op: OpRef) {
        self.op = Some(op);
    }

    pub fn op(&self) -> Result<&OpRef> {
        self.op.as_ref().ok_or(LazydagError::UnboundHandle)
    }

    pub fn key(&self) -> Result<&OpKey> {
        Ok(self.op()?.key())
    }

    /// An unbound handle is never evaluated.
    pub fn is_evaluated(&self) -> bool {
        self.op.as_ref().is_some_and(|op| op.is_evaluated())
    }

    pub(crate) fn set_evaluated(&self) -> Result<()> {
        self.op()?.mark_evaluated();
        Ok(())
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Reject handles that belong to a different session.
    pub fn ensure_same_session(&self, other: &Handle) -> Result<()> {
        if self.session_id != other.session_id {
            return Err(LazydagError::SessionMismatch {
                expected: self.session_id,
                found: other.session_id,
            });
        }
        Ok(())
    }
}
