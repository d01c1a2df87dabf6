// src/client/attempt.rs

//! In-memory state of one user's pass through a quiz.
//!
//! `Attempt` is a plain state machine with no clock and no I/O: the runner
//! feeds it ticks and reports submission outcomes back into it.

use crate::{
    client::{error::ClientError, source::QuizOrigin},
    models::{
        quiz::{Question, Quiz},
        result::{SubmitResultRequest, SubmittedAnswer},
    },
};

/// Remaining seconds at or below which the timer is shown as danger.
pub const DANGER_THRESHOLD: i64 = 300;
/// Remaining seconds at or below which the timer is shown as warning.
pub const WARNING_THRESHOLD: i64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
    Jump(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    InProgress,
    Submitting,
    Submitted,
    /// The last dispatch failed; a retry replays the same payload.
    Failed,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The countdown reached zero on this tick. Reported once.
    Expired,
    /// The attempt is no longer running; the tick was ignored.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerLevel {
    Running,
    Warning,
    Danger,
}

impl TimerLevel {
    pub fn for_remaining(seconds: i64) -> Self {
        if seconds <= DANGER_THRESHOLD {
            TimerLevel::Danger
        } else if seconds <= WARNING_THRESHOLD {
            TimerLevel::Warning
        } else {
            TimerLevel::Running
        }
    }
}

/// Formats seconds as `m:ss`.
pub fn format_time(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Clone)]
pub struct Attempt {
    quiz: Quiz,
    origin: QuizOrigin,
    current: usize,
    /// Selected option index per question.
    selections: Vec<Option<usize>>,
    /// `None` for untimed quizzes.
    time_left: Option<i64>,
    elapsed: i64,
    status: AttemptStatus,
    pending: Option<SubmitResultRequest>,
}

impl Attempt {
    pub fn new(quiz: Quiz, origin: QuizOrigin) -> Result<Self, ClientError> {
        if quiz.questions.is_empty() {
            return Err(ClientError::EmptyQuiz(quiz.id));
        }

        let time_left = (quiz.time_limit > 0).then(|| quiz.time_limit.saturating_mul(60));
        Ok(Attempt {
            selections: vec![None; quiz.questions.len()],
            quiz,
            origin,
            current: 0,
            time_left,
            elapsed: 0,
            status: AttemptStatus::InProgress,
            pending: None,
        })
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn origin(&self) -> QuizOrigin {
        self.origin
    }

    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        &self.quiz.questions[self.current]
    }

    pub fn selection(&self, question_index: usize) -> Option<usize> {
        self.selections.get(question_index).copied().flatten()
    }

    /// Seconds left on the countdown, `None` when the quiz is untimed.
    pub fn time_left(&self) -> Option<i64> {
        self.time_left
    }

    pub fn elapsed(&self) -> i64 {
        self.elapsed
    }

    /// Text for the timer widget: remaining time, or elapsed time when untimed.
    pub fn clock_label(&self) -> String {
        format_time(self.time_left.unwrap_or(self.elapsed))
    }

    pub fn timer_level(&self) -> TimerLevel {
        match self.time_left {
            Some(left) => TimerLevel::for_remaining(left),
            None => TimerLevel::Running,
        }
    }

    pub fn answered_count(&self) -> usize {
        self.selections.iter().filter(|s| s.is_some()).count()
    }

    /// Position of the question pointer as a percentage of the quiz.
    pub fn progress(&self) -> f64 {
        (self.current + 1) as f64 / self.quiz.questions.len() as f64 * 100.0
    }

    /// Records the chosen option for a question, replacing any earlier choice.
    /// Out-of-range indexes and closed attempts are ignored.
    pub fn select_option(&mut self, question_index: usize, option_index: usize) -> bool {
        if self.status != AttemptStatus::InProgress {
            return false;
        }
        let Some(question) = self.quiz.questions.get(question_index) else {
            return false;
        };
        if option_index >= question.options.len() {
            return false;
        }
        self.selections[question_index] = Some(option_index);
        true
    }

    /// Moves the question pointer. Requests outside the quiz are no-ops.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        let last = self.quiz.questions.len() - 1;
        let target = match direction {
            Direction::Next if self.current < last => self.current + 1,
            Direction::Prev if self.current > 0 => self.current - 1,
            Direction::Jump(i) if i <= last => i,
            _ => return false,
        };
        let moved = target != self.current;
        self.current = target;
        moved
    }

    /// Advances the clock by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != AttemptStatus::InProgress {
            return TickOutcome::Stopped;
        }

        self.elapsed += 1;
        match self.time_left.as_mut() {
            Some(left) if *left > 0 => {
                *left -= 1;
                if *left == 0 {
                    TickOutcome::Expired
                } else {
                    TickOutcome::Continue
                }
            }
            Some(_) => TickOutcome::Stopped,
            None => TickOutcome::Continue,
        }
    }

    fn time_taken(&self) -> i64 {
        match self.time_left {
            Some(left) => self.quiz.time_limit.saturating_mul(60) - left,
            None => self.elapsed,
        }
    }

    /// Payload for the current selections. Unanswered questions are left out.
    pub fn build_submission(&self) -> SubmitResultRequest {
        let answers = self
            .quiz
            .questions
            .iter()
            .zip(&self.selections)
            .filter_map(|(question, selection)| {
                let option = question.options.get((*selection)?)?;
                Some(SubmittedAnswer {
                    question_id: question.id,
                    selected_option_ids: vec![option.id],
                })
            })
            .collect();

        SubmitResultRequest {
            quiz_id: Some(self.quiz.id),
            answers: Some(answers),
            time_taken: Some(self.time_taken()),
        }
    }

    /// Claims the right to dispatch. Only one caller wins: a second call
    /// while a dispatch is in flight, or after it succeeded, is rejected.
    /// After a failure the stored payload is handed out again unchanged.
    pub fn begin_submission(&mut self) -> Result<SubmitResultRequest, ClientError> {
        match self.status {
            AttemptStatus::InProgress => {
                let payload = self.build_submission();
                self.pending = Some(payload.clone());
                self.status = AttemptStatus::Submitting;
                Ok(payload)
            }
            AttemptStatus::Failed => {
                let payload = match &self.pending {
                    Some(payload) => payload.clone(),
                    None => self.build_submission(),
                };
                self.pending = Some(payload.clone());
                self.status = AttemptStatus::Submitting;
                Ok(payload)
            }
            _ => Err(ClientError::AlreadySubmitted),
        }
    }

    pub fn submission_failed(&mut self) {
        if self.status == AttemptStatus::Submitting {
            self.status = AttemptStatus::Failed;
        }
    }

    pub fn submission_succeeded(&mut self) {
        if self.status == AttemptStatus::Submitting {
            self.status = AttemptStatus::Submitted;
        }
    }

    /// Drops the attempt without persisting anything.
    pub fn abandon(&mut self) -> bool {
        match self.status {
            AttemptStatus::InProgress | AttemptStatus::Failed => {
                self.status = AttemptStatus::Abandoned;
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}
