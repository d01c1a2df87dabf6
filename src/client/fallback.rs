// src/client/fallback.rs

use async_trait::async_trait;

use crate::{
    client::{
        error::ClientError,
        source::{QuizOrigin, QuizSource},
    },
    models::quiz::{Question, Quiz, QuizOption},
    seed::{BundledQuiz, bundled_quizzes},
};

/// Offline copy of the bundled quizzes.
///
/// Question and option ids are derived from positions, so they are stable
/// across runs but meaningless to the server.
#[derive(Debug, Clone)]
pub struct FallbackQuizzes {
    quizzes: Vec<Quiz>,
}

impl FallbackQuizzes {
    pub fn bundled() -> Result<Self, ClientError> {
        let quizzes = bundled_quizzes()?.into_iter().map(to_quiz).collect();
        Ok(FallbackQuizzes { quizzes })
    }

    pub fn get(&self, quiz_id: i64) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.id == quiz_id)
    }
}

fn to_quiz(bundled: BundledQuiz) -> Quiz {
    let BundledQuiz { id, quiz } = bundled;
    Quiz {
        id,
        title: quiz.title,
        description: quiz.description,
        category: quiz.category,
        time_limit: quiz.time_limit,
        questions: quiz
            .questions
            .into_iter()
            .enumerate()
            .map(|(qi, q)| {
                let question_id = id * 100 + qi as i64 + 1;
                Question {
                    id: question_id,
                    question_text: q.question_text,
                    question_type: q.question_type,
                    options: q
                        .options
                        .into_iter()
                        .enumerate()
                        .map(|(oi, o)| QuizOption {
                            id: question_id * 10 + oi as i64 + 1,
                            text: o.text,
                            is_correct: o.is_correct,
                        })
                        .collect(),
                    points: q.points,
                    explanation: q.explanation,
                    details: q.details,
                }
            })
            .collect(),
        is_published: true,
        created_by: 0,
    }
}

#[async_trait]
impl QuizSource for FallbackQuizzes {
    fn origin(&self) -> QuizOrigin {
        QuizOrigin::Fallback
    }

    async fn fetch_quiz(&self, quiz_id: i64) -> Result<Quiz, ClientError> {
        self.get(quiz_id)
            .cloned()
            .ok_or(ClientError::NotFound(quiz_id))
    }
}
