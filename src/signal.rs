// ABOUTME: Shutdown signal handling for the CLI.
// ABOUTME: First signal cancels the run so it can roll back; a second one forces exit.

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Exit status used when a second signal interrupts rollback.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Cancel `cancel` on the first signal from `next_signal`.
///
/// Returns true when a second signal arrives, meaning the caller should
/// exit without waiting for rollback to finish. Returns false if the
/// signal source fails.
pub async fn watch<S, F>(cancel: CancellationToken, mut next_signal: S) -> bool
where
    S: FnMut() -> F,
    F: Future<Output = bool>,
{
    if !next_signal().await {
        return false;
    }
    tracing::warn!("received shutdown signal, cancelling deploy");
    cancel.cancel();

    if !next_signal().await {
        return false;
    }
    tracing::warn!("received second shutdown signal, exiting without waiting for rollback");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn signals(results: &[bool]) -> impl FnMut() -> std::future::Ready<bool> {
        let mut queue: VecDeque<bool> = results.iter().copied().collect();
        move || std::future::ready(queue.pop_front().unwrap_or(false))
    }

    #[tokio::test]
    async fn second_signal_forces_exit() {
        let cancel = CancellationToken::new();
        assert!(watch(cancel.clone(), signals(&[true, true])).await);
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn single_signal_only_cancels() {
        let cancel = CancellationToken::new();
        assert!(!watch(cancel.clone(), signals(&[true, false])).await);
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn failed_handler_leaves_run_alone() {
        let cancel = CancellationToken::new();
        assert!(!watch(cancel.clone(), signals(&[false])).await);
        assert!(!cancel.is_cancelled());
    }
}
