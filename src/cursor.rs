//! Turns an arbitrary signed shift into a chain of bounded move-cursor calls.
//!
//! The API can only move up to [`MAX_CURSOR_SHIFT`] positions per call, and
//! every step needs the cursor returned by the step before it, so a shift of
//! `n` positions costs `ceil(|n| / 100)` sequential round-trips.

use tracing::debug;

use crate::backend::SearchBackend;
use crate::error::Result;
use crate::types::MAX_CURSOR_SHIFT;

/// Split `shift` into the next bounded step and what is left after it.
/// Returns `(0, 0)` once there is nothing left to move.
pub fn next_cursor_shift(shift: i64) -> (i64, i64) {
    let next = shift.clamp(-MAX_CURSOR_SHIFT, MAX_CURSOR_SHIFT);
    (next, shift - next)
}

/// Walk `shift` positions away from `initial_cursor` and return the cursor
/// that ends up there.
///
/// An empty initial cursor means the start of the result set. When the API
/// reports there is nothing further in the direction of travel, the walk stops
/// and returns the last cursor it reached; callers get a shorter jump, not an
/// error.
pub async fn resolve_cursor(
    backend: &dyn SearchBackend,
    query: &str,
    shift: i64,
    initial_cursor: &str,
) -> Result<String> {
    let forward = shift > 0;
    let mut cursor = initial_cursor.to_string();
    let (mut next_shift, mut remainder) = next_cursor_shift(shift);

    while next_shift != 0 {
        debug!(query, shift = next_shift, cursor = %cursor, "moving cursor");
        let info = backend.move_cursor(query, next_shift, &cursor).await?;

        if (forward && !info.has_next_page) || (!forward && !info.has_previous_page) {
            debug!(query, remainder, "cursor walk hit the end of the results");
            break;
        }

        cursor = if forward {
            info.end_cursor
        } else {
            info.start_cursor
        };
        (next_shift, remainder) = next_cursor_shift(remainder);
    }

    Ok(cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{cursor, Call, FakeBackend};

    #[test]
    fn next_cursor_shift_bounds_each_step() {
        assert_eq!(next_cursor_shift(0), (0, 0));
        assert_eq!(next_cursor_shift(60), (60, 0));
        assert_eq!(next_cursor_shift(100), (100, 0));
        assert_eq!(next_cursor_shift(120), (100, 20));
        assert_eq!(next_cursor_shift(-100), (-100, 0));
        assert_eq!(next_cursor_shift(-250), (-100, -150));
    }

    #[tokio::test]
    async fn shift_within_limit_is_one_call() {
        let backend = FakeBackend::new().with_query("rust", 1000);
        for shift in [1, 37, 100, -1, -100] {
            backend.clear_calls();
            resolve_cursor(&backend, "rust", shift, &cursor(500))
                .await
                .unwrap();
            assert_eq!(backend.move_shifts(), vec![shift], "shift {shift}");
        }
    }

    #[tokio::test]
    async fn shift_up_to_two_hundred_is_two_sequential_calls() {
        let backend = FakeBackend::new().with_query("rust", 1000);

        let end = resolve_cursor(&backend, "rust", 120, &cursor(100))
            .await
            .unwrap();

        assert_eq!(end, cursor(220));
        assert_eq!(
            backend.calls(),
            vec![
                Call::Move {
                    query: "rust".into(),
                    shift: 100,
                    cursor: cursor(100),
                },
                Call::Move {
                    query: "rust".into(),
                    shift: 20,
                    cursor: cursor(200),
                },
            ]
        );
    }

    #[tokio::test]
    async fn backward_walk_follows_start_cursors() {
        let backend = FakeBackend::new().with_query("rust", 1000);

        let start = resolve_cursor(&backend, "rust", -180, &cursor(501))
            .await
            .unwrap();

        assert_eq!(backend.move_shifts(), vec![-100, -80]);
        assert_eq!(start, cursor(321));
    }

    #[tokio::test]
    async fn forward_walk_stops_when_results_run_out() {
        let backend = FakeBackend::new().with_query("rust", 150);

        let end = resolve_cursor(&backend, "rust", 300, "").await.unwrap();

        // First step lands on 100 with more to come, second step runs off the end.
        assert_eq!(backend.move_shifts(), vec![100, 100]);
        assert_eq!(end, cursor(100));
    }

    #[tokio::test]
    async fn backward_walk_stops_at_the_start() {
        let backend = FakeBackend::new().with_query("rust", 1000);

        let start = resolve_cursor(&backend, "rust", -300, &cursor(150))
            .await
            .unwrap();

        assert_eq!(backend.move_shifts(), vec![-100, -100]);
        assert_eq!(start, cursor(50));
    }

    #[tokio::test]
    async fn zero_shift_makes_no_calls() {
        let backend = FakeBackend::new().with_query("rust", 10);
        let c = resolve_cursor(&backend, "rust", 0, &cursor(7)).await.unwrap();
        assert_eq!(c, cursor(7));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let backend = FakeBackend::new().with_query("rust", 1000);
        backend.fail_call(1);
        let err = resolve_cursor(&backend, "rust", 150, "").await;
        assert!(err.is_err());
        assert_eq!(backend.move_shifts(), vec![100, 50]);
    }
}
