//! Single transient status banner with generation-tagged expiry.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStatus {
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub status: ToastStatus,
    pub message: String,
    pub generation: u64,
}

/// Expiry the caller must schedule for a freshly shown toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastExpiry {
    pub generation: u64,
    pub after: Duration,
}

#[derive(Debug, Clone)]
pub struct ToastSlot {
    current: Option<Toast>,
    generation: u64,
    scheduled: u64,
    success_after: Duration,
    error_after: Duration,
}

impl Default for ToastSlot {
    fn default() -> Self {
        Self::new(Duration::from_millis(2_000), Duration::from_millis(3_000))
    }
}

impl ToastSlot {
    pub fn new(success_after: Duration, error_after: Duration) -> Self {
        Self {
            current: None,
            generation: 0,
            scheduled: 0,
            success_after,
            error_after,
        }
    }

    /// Replace whatever is showing. Returns the new generation.
    pub fn show(&mut self, status: ToastStatus, message: impl Into<String>) -> u64 {
        self.generation += 1;
        self.current = Some(Toast {
            status,
            message: message.into(),
            generation: self.generation,
        });
        self.generation
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    /// Clear the toast only if it still belongs to `generation`.
    pub fn expire(&mut self, generation: u64) -> bool {
        match &self.current {
            Some(toast) if toast.generation == generation => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Expiry for the current toast if one is due and not yet handed out.
    ///
    /// Pending toasts never expire; they stay until replaced.
    pub fn take_expiry(&mut self) -> Option<ToastExpiry> {
        let toast = self.current.as_ref()?;
        if toast.generation == self.scheduled {
            return None;
        }
        let after = match toast.status {
            ToastStatus::Pending => return None,
            ToastStatus::Success => self.success_after,
            ToastStatus::Error => self.error_after,
        };
        self.scheduled = toast.generation;
        Some(ToastExpiry {
            generation: toast.generation,
            after,
        })
    }
}
