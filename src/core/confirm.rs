//! Two-step confirmation guarding the destructive ledger clear.

/// States of a pending clear request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmState {
    #[default]
    Idle,
    ConfirmRequested,
    Confirmed,
    Cancelled,
}

/// Proof that the operator explicitly confirmed a clear.
///
/// Only [`ClearConfirmation::confirm`] can construct one, so
/// [`crate::storage::LedgerStore::clear`] cannot be reached with a single action.
#[derive(Debug)]
pub struct ClearAuthorization {
    _private: (),
}

#[derive(Debug, Default)]
pub struct ClearConfirmation {
    state: ConfirmState,
}

impl ClearConfirmation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConfirmState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == ConfirmState::ConfirmRequested
    }

    /// First step: register the intent. Any previous outcome is discarded.
    pub fn request(&mut self) {
        self.state = ConfirmState::ConfirmRequested;
    }

    /// Second step. Yields an authorization only when a request is pending.
    pub fn confirm(&mut self) -> Option<ClearAuthorization> {
        if self.state != ConfirmState::ConfirmRequested {
            return None;
        }
        self.state = ConfirmState::Confirmed;
        Some(ClearAuthorization { _private: () })
    }

    /// Abandons a pending request; a no-op otherwise.
    pub fn cancel(&mut self) {
        if self.state == ConfirmState::ConfirmRequested {
            self.state = ConfirmState::Cancelled;
        }
    }

    /// Returns to `Idle` once an outcome has been acted upon.
    pub fn reset(&mut self) {
        self.state = ConfirmState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_without_request_is_refused() {
        let mut flow = ClearConfirmation::new();
        assert!(flow.confirm().is_none());
        assert_eq!(flow.state(), ConfirmState::Idle);
    }

    #[test]
    fn request_then_confirm_authorizes_once() {
        let mut flow = ClearConfirmation::new();
        flow.request();
        assert!(flow.is_pending());
        assert!(flow.confirm().is_some());
        assert_eq!(flow.state(), ConfirmState::Confirmed);
        assert!(flow.confirm().is_none());
    }

    #[test]
    fn cancel_drops_pending_request() {
        let mut flow = ClearConfirmation::new();
        flow.request();
        flow.cancel();
        assert_eq!(flow.state(), ConfirmState::Cancelled);
        assert!(flow.confirm().is_none());
        flow.reset();
        assert_eq!(flow.state(), ConfirmState::Idle);
    }
}
