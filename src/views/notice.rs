//! Transient status messages

use crate::tips::TipError;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// A message shown once and dismissed after a fixed interval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    #[serde(skip)]
    pub dismiss_after: Duration,
}

impl Notice {
    pub const DEFAULT_DISMISS: Duration = Duration::from_secs(5);

    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            dismiss_after: Self::DEFAULT_DISMISS,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, text)
    }

    /// Builder: set dismiss interval in seconds
    pub fn dismiss_secs(mut self, secs: u64) -> Self {
        self.dismiss_after = Duration::from_secs(secs);
        self
    }

    /// Notice for a completed tip
    pub fn tip_sent(amount: f64) -> Self {
        Self::success(format!("Successfully sent {} ALGO!", amount))
    }

    /// Notice for a failed tip. Faults the user can fix are shown verbatim;
    /// anything else gets a generic message. A payment that went through but
    /// was not recorded names its transaction instead of inviting a retry.
    pub fn tip_failed(err: &TipError) -> Self {
        match err {
            TipError::Store { tx_id, .. } => Self::error(format!(
                "Tip sent (transaction {}) but it could not be saved locally. Do not send it again.",
                tx_id
            )),
            err if err.is_user_error() => Self::error(err.to_string()),
            _ => Self::error("Failed to send tip. Please try again."),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            NoticeKind::Success => "✓",
            NoticeKind::Error => "✗",
            NoticeKind::Info => "ℹ",
        };
        write!(f, "{} {}", tag, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use crate::wallet::ProviderError;

    #[test]
    fn test_tip_failed_messages() {
        let not_connected = Notice::tip_failed(&TipError::NotConnected);
        assert_eq!(not_connected.kind, NoticeKind::Error);
        assert_eq!(not_connected.text, "Please connect your wallet first");

        let provider = Notice::tip_failed(&TipError::Provider(ProviderError::Rejected(
            "user cancelled".to_string(),
        )));
        assert_eq!(provider.text, "Failed to send tip. Please try again.");
    }

    #[test]
    fn test_unrecorded_tip_names_transaction() {
        let notice = Notice::tip_failed(&TipError::Store {
            tx_id: "TXNABC".to_string(),
            source: StoreError::Backend("disk full".to_string()),
        });
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.text.contains("TXNABC"));
        assert!(!notice.text.contains("try again"));
    }

    #[test]
    fn test_display_and_dismiss() {
        let notice = Notice::tip_sent(5.0).dismiss_secs(2);
        assert_eq!(notice.to_string(), "✓ Successfully sent 5 ALGO!");
        assert_eq!(notice.dismiss_after, Duration::from_secs(2));
        assert_eq!(Notice::info("hi").dismiss_after, Notice::DEFAULT_DISMISS);
    }
}
