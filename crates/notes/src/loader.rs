use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use trip_core::model::NotesBook;
use trip_core::render::NotesState;

use crate::client::{NotesClient, NotesError};

/// How long the itinerary page waits for notes before rendering without
/// them.
pub const NOTES_WAIT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesOutcome {
    Loaded(NotesBook),
    Failed(String),
    TimedOut,
    Cancelled,
}

impl NotesOutcome {
    /// What the itinerary renderer shows for this outcome. A slow or failing
    /// endpoint leaves an empty book so notes can still be added.
    pub fn into_state(self) -> NotesState {
        match self {
            NotesOutcome::Loaded(book) => NotesState::Loaded(book),
            NotesOutcome::Failed(_) | NotesOutcome::TimedOut => {
                NotesState::Loaded(NotesBook::default())
            }
            NotesOutcome::Cancelled => NotesState::Failed,
        }
    }
}

/// Notes fetch running in the background while pages render.
pub struct NotesLoader {
    handle: JoinHandle<Result<NotesBook, NotesError>>,
    cancel: CancellationToken,
    wait: Duration,
}

impl NotesLoader {
    /// Start fetching immediately on the current runtime.
    pub fn spawn(client: NotesClient) -> Self {
        let handle = tokio::spawn(async move { client.fetch_book().await });
        Self {
            handle,
            cancel: CancellationToken::new(),
            wait: NOTES_WAIT,
        }
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Token that ends [`wait`](Self::wait) early when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Resolve once the fetch settles, the wait elapses, or the token is
    /// cancelled, whichever comes first. The fetch is aborted in the latter
    /// two cases.
    pub async fn wait(self) -> NotesOutcome {
        let NotesLoader {
            mut handle,
            cancel,
            wait,
        } = self;

        let outcome = tokio::select! {
            _ = cancel.cancelled() => NotesOutcome::Cancelled,
            result = tokio::time::timeout(wait, &mut handle) => match result {
                Err(_) => NotesOutcome::TimedOut,
                Ok(Err(join_err)) => NotesOutcome::Failed(join_err.to_string()),
                Ok(Ok(Err(err))) => NotesOutcome::Failed(err.to_string()),
                Ok(Ok(Ok(book))) => NotesOutcome::Loaded(book),
            },
        };

        match &outcome {
            NotesOutcome::Loaded(book) => {
                info!(stages = book.stages().count(), "notes loaded");
            }
            NotesOutcome::Failed(reason) => warn!(%reason, "notes failed to load"),
            NotesOutcome::TimedOut => {
                handle.abort();
                warn!(wait_secs = wait.as_secs(), "notes did not load in time");
            }
            NotesOutcome::Cancelled => {
                handle.abort();
                info!("notes wait cancelled");
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::FakeTransport;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};
    use trip_core::model::StageId;

    fn client(transport: FakeTransport) -> NotesClient {
        NotesClient::with_transport("https://script.example/exec", Arc::new(transport))
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_with_book_when_fetch_is_quick() {
        let transport = FakeTransport {
            delay: Some(Duration::from_secs(2)),
            ..FakeTransport::serving(vec![r#"[{"stage": 1, "person": "zhi", "activity": "ok"}]"#])
        };
        let outcome = NotesLoader::spawn(client(transport)).wait().await;
        match outcome {
            NotesOutcome::Loaded(book) => assert_eq!(book.stage(StageId(1)).len(), 1),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_after_ten_seconds() {
        let transport = FakeTransport {
            delay: Some(Duration::from_secs(30)),
            ..FakeTransport::serving(vec!["[]"])
        };
        let started = tokio::time::Instant::now();
        let outcome = NotesLoader::spawn(client(transport)).wait().await;
        assert_eq!(outcome, NotesOutcome::TimedOut);
        assert_eq!(started.elapsed(), NOTES_WAIT);
        assert_eq!(outcome.into_state(), NotesState::Loaded(NotesBook::default()));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_ends_the_wait() {
        let transport = FakeTransport {
            delay: Some(Duration::from_secs(5)),
            ..FakeTransport::serving(vec!["[]"])
        };
        let loader = NotesLoader::spawn(client(transport));
        let token = loader.cancel_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            token.cancel();
        });
        let outcome = loader.wait().await;
        assert_eq!(outcome, NotesOutcome::Cancelled);
        assert_eq!(outcome.into_state(), NotesState::Failed);
    }

    #[tokio::test]
    async fn endpoint_errors_become_failed_outcomes() {
        let transport = FakeTransport {
            get_body: Mutex::new(vec![Err(500)]),
            ..FakeTransport::default()
        };
        let outcome = NotesLoader::spawn(client(transport))
            .with_wait(Duration::from_secs(1))
            .wait()
            .await;
        assert_eq!(
            outcome,
            NotesOutcome::Failed("notes endpoint returned HTTP 500".into())
        );
        assert_eq!(outcome.into_state(), NotesState::Loaded(NotesBook::default()));
    }
}
