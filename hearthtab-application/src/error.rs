use hearthtab_domain::{Money, UserId};
use thiserror::Error;

/// Failure reported by the persistent store adapter.
///
/// Store-level detail stays in these variants and is never interpolated
/// into the user-facing settlement message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store rejected the operation: {detail}")]
    Rejected { detail: String },
    #[error("store unavailable: {detail}")]
    Unavailable { detail: String },
}

/// Error taxonomy for the settlement workflow.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettlementError {
    /// Raised synchronously, before any I/O. Valid amounts satisfy
    /// `0 < amount <= outstanding`.
    #[error("invalid payment amount: {amount} (outstanding balance: {outstanding})")]
    InvalidAmount { amount: Money, outstanding: Money },
    #[error("balance has no unsettled splits to settle")]
    NoUnsettledSplits,
    #[error("user {actor} is not a participant in this balance")]
    InvalidActor { actor: UserId },
    /// Generic persistence failure; the store's own text rides along as the
    /// error source only.
    #[error("failed to record payment")]
    Store(#[source] StoreError),
}

/// Coarse classification so callers can pick a log level and message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    UserInput,
    Persistence,
}

impl SettlementError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidAmount { .. } | Self::NoUnsettledSplits | Self::InvalidActor { .. } => {
                FailureKind::UserInput
            }
            Self::Store(_) => FailureKind::Persistence,
        }
    }
}
