//! Request-scoped correlation-id storage
//!
//! The correlation id is installed with a tokio task-local scope around the
//! request future, never a process-wide global. Scope teardown rides the
//! future itself, so the id is released on every exit path — normal return,
//! error response, panic unwind, or cancellation — and can never leak into
//! another request sharing the same worker thread.

use std::future::Future;

tokio::task_local! {
    static CORRELATION_ID: String;
}

/// Run `fut` with `correlation_id` installed as the ambient request id.
pub async fn scope<F>(correlation_id: String, fut: F) -> F::Output
where
    F: Future,
{
    CORRELATION_ID.scope(correlation_id, fut).await
}

/// The correlation id of the request currently being processed, if any.
///
/// Returns `None` outside a request scope (startup code, background tasks,
/// or a worker between requests).
pub fn current_correlation_id() -> Option<String> {
    CORRELATION_ID.try_with(|id| id.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_id_visible_inside_scope() {
        let seen = scope("req-1".to_string(), async { current_correlation_id() }).await;
        assert_eq!(seen.as_deref(), Some("req-1"));
    }

    #[tokio::test]
    async fn test_absent_outside_scope() {
        assert_eq!(current_correlation_id(), None);
        scope("req-1".to_string(), async {}).await;
        // Cleared once the scoped future completes
        assert_eq!(current_correlation_id(), None);
    }

    #[tokio::test]
    async fn test_back_to_back_scopes_do_not_leak() {
        let first = scope("req-a".to_string(), async { current_correlation_id() }).await;
        let second = scope("req-b".to_string(), async { current_correlation_id() }).await;
        assert_eq!(first.as_deref(), Some("req-a"));
        assert_eq!(second.as_deref(), Some("req-b"));
    }

    #[tokio::test]
    async fn test_nested_tasks_do_not_inherit() {
        // A detached task is a different execution context; the id must not
        // bleed into it implicitly.
        let seen = scope("req-a".to_string(), async {
            tokio::spawn(async { current_correlation_id() })
                .await
                .unwrap()
        })
        .await;
        assert_eq!(seen, None);
    }
}
