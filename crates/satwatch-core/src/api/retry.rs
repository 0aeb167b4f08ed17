//! Bounded retry with a recovery step between attempts.
//!
//! An attempt either succeeds, fails hard, or is *rejected* in a way a
//! recovery step may fix (for the API client: a 401 that a token refresh may
//! cure). The wrapper runs the recovery at most `max_recoveries` times, so a
//! rejection after the last recovery ends the loop instead of spinning.

use std::future::Future;

/// Result of a single attempt.
#[derive(Debug)]
pub enum Attempt<T, R> {
    Done(T),
    /// Rejected with context the recovery step needs
    Rejected(R),
}

/// Why a bounded retry gave up.
#[derive(Debug)]
pub enum RetryError<R, E> {
    /// Still rejected after every allowed recovery; carries the last rejection
    Exhausted(R),
    /// The recovery step itself failed
    RecoveryFailed(E),
    /// The attempt failed in a way recovery does not address
    Failed(E),
}

/// Run `attempt`, calling `recover` after each rejection, at most
/// `max_recoveries` times.
///
/// With `max_recoveries == 1` the attempt runs at most twice.
pub async fn with_recovery<T, R, E, A, AFut, V, VFut>(
    max_recoveries: u32,
    mut attempt: A,
    mut recover: V,
) -> Result<T, RetryError<R, E>>
where
    A: FnMut() -> AFut,
    AFut: Future<Output = Result<Attempt<T, R>, E>>,
    V: FnMut(R) -> VFut,
    VFut: Future<Output = Result<(), E>>,
{
    let mut recoveries = 0;
    loop {
        match attempt().await.map_err(RetryError::Failed)? {
            Attempt::Done(value) => return Ok(value),
            Attempt::Rejected(rejection) => {
                if recoveries >= max_recoveries {
                    return Err(RetryError::Exhausted(rejection));
                }
                recoveries += 1;
                recover(rejection).await.map_err(RetryError::RecoveryFailed)?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_success_without_recovery() {
        let recovered = Cell::new(0);
        let result: Result<u32, RetryError<(), ()>> = with_recovery(
            1,
            || async { Ok(Attempt::Done(7)) },
            |_| {
                recovered.set(recovered.get() + 1);
                async { Ok(()) }
            },
        )
        .await;
        assert_eq!(result.ok(), Some(7));
        assert_eq!(recovered.get(), 0);
    }

    #[tokio::test]
    async fn test_recovers_once_then_succeeds() {
        let calls = Cell::new(0);
        let recovered = Cell::new(0);
        let result: Result<&str, RetryError<u32, ()>> = with_recovery(
            1,
            || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n == 1 {
                        Ok(Attempt::Rejected(n))
                    } else {
                        Ok(Attempt::Done("ok"))
                    }
                }
            },
            |_| {
                recovered.set(recovered.get() + 1);
                async { Ok(()) }
            },
        )
        .await;
        assert_eq!(result.ok(), Some("ok"));
        assert_eq!(calls.get(), 2);
        assert_eq!(recovered.get(), 1);
    }

    #[tokio::test]
    async fn test_second_rejection_is_exhausted() {
        let calls = Cell::new(0);
        let result: Result<(), RetryError<u32, ()>> = with_recovery(
            1,
            || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { Ok(Attempt::Rejected(n)) }
            },
            |_| async { Ok(()) },
        )
        .await;
        // No third attempt; the last rejection is reported
        assert!(matches!(result, Err(RetryError::Exhausted(2))));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_recovery_failure_stops_immediately() {
        let calls = Cell::new(0);
        let result: Result<(), RetryError<(), &str>> = with_recovery(
            1,
            || {
                calls.set(calls.get() + 1);
                async { Ok(Attempt::Rejected(())) }
            },
            |_| async { Err("refresh rejected") },
        )
        .await;
        assert!(matches!(result, Err(RetryError::RecoveryFailed("refresh rejected"))));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_hard_failure_is_not_retried() {
        let recovered = Cell::new(0);
        let result: Result<(), RetryError<(), &str>> = with_recovery(
            3,
            || async { Err("connection reset") },
            |_| {
                recovered.set(recovered.get() + 1);
                async { Ok(()) }
            },
        )
        .await;
        assert!(matches!(result, Err(RetryError::Failed("connection reset"))));
        assert_eq!(recovered.get(), 0);
    }

    #[tokio::test]
    async fn test_zero_recoveries_allowed() {
        let result: Result<(), RetryError<&str, ()>> = with_recovery(
            0,
            || async { Ok(Attempt::Rejected("401")) },
            |_| async { Ok(()) },
        )
        .await;
        assert!(matches!(result, Err(RetryError::Exhausted("401"))));
    }
}
