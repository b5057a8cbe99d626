//! Transient notifications ("toasts") queued by form handlers and shown once
//! by the next page a tab renders.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// How long the page keeps a toast on screen.
pub const TOAST_DURATION_MS: u64 = 4000;
/// Oldest toasts are dropped beyond this many undelivered ones.
const MAX_PENDING: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ToastQueue {
    pending: VecDeque<Toast>,
}

impl ToastQueue {
    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Success, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Error, message.into());
    }

    fn push(&mut self, kind: ToastKind, message: String) {
        if self.pending.len() == MAX_PENDING {
            self.pending.pop_front();
        }
        self.pending.push_back(Toast {
            kind,
            message,
            created_at: Utc::now(),
        });
    }

    /// Hands every pending toast to the renderer, oldest first.
    pub fn drain(&mut self) -> Vec<Toast> {
        self.pending.drain(..).collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[cfg(test)]
    pub fn peek(&self) -> Vec<&Toast> {
        self.pending.iter().collect()
    }
}
