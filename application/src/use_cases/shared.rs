//! Shared utilities for use cases.
//!
//! Contains cancellation checking used at every retry boundary.

use crate::use_cases::generate::GenerationError;
use tokio_util::sync::CancellationToken;

pub(crate) fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().is_some_and(CancellationToken::is_cancelled)
}

/// Check if cancellation has been requested.
///
/// Returns `Err(GenerationError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), GenerationError> {
    if is_cancelled(token) {
        return Err(GenerationError::Cancelled);
    }
    Ok(())
}
