use super::domain::{Transaction, UserId};

/// Capability for fetching a user's transaction history.
///
/// `NotFound` is not a failure of the decision pipeline: the orchestrator
/// substitutes an empty history (the thin-file fallback). Every other error
/// propagates to the caller unchanged.
pub trait TransactionSource: Send + Sync {
    fn fetch(&self, user_id: &UserId) -> Result<Vec<Transaction>, SourceError>;
}

/// Error enumeration for the transaction source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("user not known to the transaction source")]
    NotFound,
    #[error("upstream error {status}: {detail}")]
    Upstream { status: u16, detail: String },
    #[error("transaction source unreachable: {0}")]
    Transport(String),
}
