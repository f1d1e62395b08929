//! Best-effort post-commit hooks.
//!
//! A lifecycle operation commits when its persistence write succeeds.
//! Audit entries and notifications run afterwards through [`run_best_effort`]:
//! their failures are logged and reported back as `None`, never as the
//! operation's error.

use std::fmt::Display;
use std::future::Future;

/// Runs a post-commit hook, logging and swallowing its failure.
///
/// Returns the hook's value on success and `None` on failure.
pub async fn run_best_effort<T, E, F>(hook: &'static str, future: F) -> Option<T>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match future.await {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(hook, error = %err, "Post-commit hook failed");
            None
        }
    }
}
