// src/client/mod.rs

//! Client side of an attempt: loading a quiz, running the countdown,
//! submitting, and reviewing the graded result.

pub mod api;
pub mod attempt;
pub mod error;
pub mod fallback;
pub mod review;
pub mod runner;
pub mod source;

pub use api::QuizApiClient;
pub use attempt::{Attempt, AttemptStatus, Direction, TimerLevel};
pub use error::ClientError;
pub use fallback::FallbackQuizzes;
pub use review::ResultReview;
pub use runner::AttemptRunner;
pub use source::{LoadedQuiz, QuizOrigin, QuizSource, ResultSubmitter, load_quiz};
