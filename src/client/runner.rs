// src/client/runner.rs

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
};

use crate::{
    client::{
        attempt::{Attempt, AttemptStatus, Direction, TickOutcome},
        error::ClientError,
        review::ResultReview,
        source::{LoadedQuiz, QuizOrigin, ResultSubmitter},
    },
    models::result::SubmitResultRequest,
};

struct Shared {
    attempt: Mutex<Attempt>,
    submitter: Arc<dyn ResultSubmitter>,
    status: watch::Sender<AttemptStatus>,
    review: Mutex<Option<ResultReview>>,
}

/// Drives one attempt: a one-second countdown plus the submit path.
///
/// The countdown and a manual submit race for the same attempt; whichever
/// claims it first dispatches, the other gets `ClientError::AlreadySubmitted`.
/// Dropping the runner stops the countdown and nothing is persisted.
pub struct AttemptRunner {
    shared: Arc<Shared>,
    timer: JoinHandle<()>,
}

impl AttemptRunner {
    /// Starts the attempt and its timer. Must be called inside a tokio runtime.
    pub fn start(
        loaded: LoadedQuiz,
        submitter: Arc<dyn ResultSubmitter>,
    ) -> Result<Self, ClientError> {
        if loaded.origin == QuizOrigin::Fallback {
            tracing::warn!(
                quiz_id = loaded.quiz.id,
                "Running an offline quiz; the server will not recognize it"
            );
        }

        let attempt = Attempt::new(loaded.quiz, loaded.origin)?;
        let (status, _) = watch::channel(attempt.status());
        let shared = Arc::new(Shared {
            attempt: Mutex::new(attempt),
            submitter,
            status,
            review: Mutex::new(None),
        });

        let timer = tokio::spawn(run_timer(shared.clone()));
        Ok(AttemptRunner { shared, timer })
    }

    pub async fn select_option(&self, question_index: usize, option_index: usize) -> bool {
        self.shared
            .attempt
            .lock()
            .await
            .select_option(question_index, option_index)
    }

    pub async fn navigate(&self, direction: Direction) -> bool {
        self.shared.attempt.lock().await.navigate(direction)
    }

    /// Copy of the attempt for rendering.
    pub async fn snapshot(&self) -> Attempt {
        self.shared.attempt.lock().await.clone()
    }

    pub fn status(&self) -> AttemptStatus {
        *self.shared.status.borrow()
    }

    pub fn status_changes(&self) -> watch::Receiver<AttemptStatus> {
        self.shared.status.subscribe()
    }

    /// Review of the successful submission, once there is one.
    pub async fn review(&self) -> Option<ResultReview> {
        self.shared.review.lock().await.clone()
    }

    /// Submits the attempt. After a failed dispatch this replays the same
    /// payload.
    pub async fn submit(&self) -> Result<ResultReview, ClientError> {
        let payload = self.shared.attempt.lock().await.begin_submission()?;
        self.timer.abort();
        dispatch(&self.shared, payload).await
    }

    /// Replays the payload of a failed dispatch.
    pub async fn retry(&self) -> Result<ResultReview, ClientError> {
        if self.status() != AttemptStatus::Failed {
            return Err(ClientError::AlreadySubmitted);
        }
        self.submit().await
    }

    /// Leaves the attempt without submitting.
    pub async fn abandon(self) {
        let mut attempt = self.shared.attempt.lock().await;
        if attempt.abandon() {
            tracing::info!(quiz_id = attempt.quiz().id, "Attempt abandoned");
            self.shared.status.send_replace(attempt.status());
        }
    }
}

impl Drop for AttemptRunner {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

async fn run_timer(shared: Arc<Shared>) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;

        let claimed = {
            let mut attempt = shared.attempt.lock().await;
            match attempt.tick() {
                TickOutcome::Continue => continue,
                TickOutcome::Stopped => return,
                TickOutcome::Expired => {
                    tracing::info!(quiz_id = attempt.quiz().id, "Time is up, submitting");
                    attempt.begin_submission()
                }
            }
        };

        if let Ok(payload) = claimed {
            // Failure is recorded on the attempt; the user retries by hand.
            let _ = dispatch(&shared, payload).await;
        }
        return;
    }
}

async fn dispatch(
    shared: &Shared,
    payload: SubmitResultRequest,
) -> Result<ResultReview, ClientError> {
    shared.status.send_replace(AttemptStatus::Submitting);
    let outcome = shared.submitter.submit(&payload).await;

    let mut attempt = shared.attempt.lock().await;
    match outcome {
        Ok(response) => {
            attempt.submission_succeeded();
            let review = ResultReview::from_response(&response);
            *shared.review.lock().await = Some(review.clone());
            tracing::info!(
                result_id = review.result_id,
                score = review.score,
                total = review.total_points,
                "Attempt submitted"
            );
            shared.status.send_replace(attempt.status());
            Ok(review)
        }
        Err(e) => {
            attempt.submission_failed();
            tracing::warn!(quiz_id = attempt.quiz().id, "Submission failed: {}", e);
            shared.status.send_replace(attempt.status());
            Err(e)
        }
    }
}
