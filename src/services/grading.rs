// src/services/grading.rs

//! Authoritative scoring of a submitted attempt against the stored answer key.
//!
//! Grading walks every question of the quiz, not only the submitted answers,
//! so an unanswered question is an incorrect zero-point entry and
//! `total_points` is always the full point pool of the quiz.

use std::collections::{BTreeSet, HashMap};

use crate::models::{
    quiz::{Question, QuestionType, Quiz},
    result::{CorrectAnswer, ResultAnswer, SubmittedAnswer},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GradeError {
    #[error("Question {0} does not belong to this quiz")]
    UnknownQuestion(i64),

    #[error("Question {0} was answered more than once")]
    DuplicateAnswer(i64),

    #[error("Question {question_id} has unsupported question type '{question_type}'")]
    UnsupportedQuestionType {
        question_id: i64,
        question_type: QuestionType,
    },
}

/// Outcome of grading one submission. A pure function of quiz + answers.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedSubmission {
    pub score: i64,
    pub total_points: i64,
    pub answers: Vec<ResultAnswer>,
    pub correct_answers: Vec<CorrectAnswer>,
}

impl GradedSubmission {
    pub fn percentage(&self) -> i64 {
        percentage(self.score, self.total_points)
    }
}

/// Rounded `score / total * 100`; 0 when there is nothing to score.
pub fn percentage(score: i64, total_points: i64) -> i64 {
    if total_points <= 0 {
        return 0;
    }
    ((score as f64 / total_points as f64) * 100.0).round() as i64
}

/// Option ids flagged correct for a choice question.
fn answer_key(question: &Question) -> Result<BTreeSet<i64>, GradeError> {
    match question.question_type {
        QuestionType::MultipleChoice | QuestionType::TrueFalse => Ok(question
            .options
            .iter()
            .filter(|o| o.is_correct)
            .map(|o| o.id)
            .collect()),
        QuestionType::FillInBlank | QuestionType::Matching | QuestionType::Essay => {
            Err(GradeError::UnsupportedQuestionType {
                question_id: question.id,
                question_type: question.question_type,
            })
        }
    }
}

/// Grades `answers` against `quiz`.
///
/// Fails if an answer references a question outside the quiz, if a question is
/// answered twice, or if the quiz contains a question kind that cannot be graded.
pub fn grade_submission(
    quiz: &Quiz,
    answers: &[SubmittedAnswer],
) -> Result<GradedSubmission, GradeError> {
    let mut selections: HashMap<i64, BTreeSet<i64>> = HashMap::with_capacity(answers.len());

    for answer in answers {
        if !quiz.questions.iter().any(|q| q.id == answer.question_id) {
            return Err(GradeError::UnknownQuestion(answer.question_id));
        }
        let selected = answer.selected_option_ids.iter().copied().collect();
        if selections.insert(answer.question_id, selected).is_some() {
            return Err(GradeError::DuplicateAnswer(answer.question_id));
        }
    }

    let mut graded = GradedSubmission {
        score: 0,
        total_points: 0,
        answers: Vec::with_capacity(quiz.questions.len()),
        correct_answers: Vec::with_capacity(quiz.questions.len()),
    };

    for question in &quiz.questions {
        let correct = answer_key(question)?;
        let selected = selections.remove(&question.id).unwrap_or_default();

        // Exact set equality: no partial credit for choice questions.
        let is_correct = !selected.is_empty() && selected == correct;
        let points_earned = if is_correct { question.points } else { 0 };

        graded.score = graded.score.saturating_add(points_earned);
        graded.total_points = graded.total_points.saturating_add(question.points);

        let selected: Vec<i64> = selected.into_iter().collect();
        graded.answers.push(ResultAnswer {
            question: question.id,
            selected_options: selected.clone(),
            is_correct,
            points_earned,
        });
        graded.correct_answers.push(CorrectAnswer {
            question_id: question.id,
            correct_option_ids: correct.into_iter().collect(),
            selected_option_ids: selected,
            is_correct,
        });
    }

    Ok(graded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::{QuestionDetails, QuizOption};

    /// Question `id` with options `id*10 + i`; `correct` lists the correct indexes.
    fn question(id: i64, points: i64, option_count: i64, correct: &[i64]) -> Question {
        Question {
            id,
            question_text: format!("Question {}", id),
            question_type: QuestionType::MultipleChoice,
            options: (0..option_count)
                .map(|i| QuizOption {
                    id: id * 10 + i,
                    text: format!("Option {}", i),
                    is_correct: correct.contains(&i),
                })
                .collect(),
            points,
            explanation: String::new(),
            details: QuestionDetails::default(),
        }
    }

    fn quiz(questions: Vec<Question>) -> Quiz {
        Quiz {
            id: 1,
            title: "Quiz".to_string(),
            description: "Desc".to_string(),
            category: "Other".to_string(),
            time_limit: 10,
            questions,
            is_published: true,
            created_by: 1,
        }
    }

    fn answer(question_id: i64, selected: &[i64]) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id,
            selected_option_ids: selected.to_vec(),
        }
    }

    #[test]
    fn test_perfect_submission_scores_full_marks() {
        let quiz = quiz(vec![question(1, 2, 4, &[1]), question(2, 3, 2, &[0])]);
        let graded = grade_submission(&quiz, &[answer(1, &[11]), answer(2, &[20])]).unwrap();

        assert_eq!(graded.score, 5);
        assert_eq!(graded.total_points, 5);
        assert_eq!(graded.percentage(), 100);
        assert!(graded.answers.iter().all(|a| a.is_correct));
    }

    #[test]
    fn test_one_right_one_wrong_one_unanswered() {
        let quiz = quiz(vec![
            question(1, 1, 4, &[0]),
            question(2, 1, 4, &[0]),
            question(3, 1, 4, &[0]),
        ]);
        let graded = grade_submission(&quiz, &[answer(1, &[10]), answer(2, &[21])]).unwrap();

        assert_eq!(graded.score, 1);
        assert_eq!(graded.total_points, 3);
        assert_eq!(graded.percentage(), 33);

        let unanswered = &graded.answers[2];
        assert_eq!(unanswered.question, 3);
        assert!(unanswered.selected_options.is_empty());
        assert!(!unanswered.is_correct);
        assert_eq!(unanswered.points_earned, 0);
    }

    #[test]
    fn test_no_answers_scores_zero_without_nan() {
        let quiz = quiz(vec![question(1, 4, 2, &[0])]);
        let graded = grade_submission(&quiz, &[]).unwrap();

        assert_eq!(graded.score, 0);
        assert_eq!(graded.total_points, 4);
        assert_eq!(graded.percentage(), 0);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn test_multi_select_requires_exact_set() {
        let quiz = quiz(vec![question(1, 2, 4, &[0, 2])]);

        let partial = grade_submission(&quiz, &[answer(1, &[10])]).unwrap();
        assert_eq!(partial.score, 0);

        let superset = grade_submission(&quiz, &[answer(1, &[10, 12, 13])]).unwrap();
        assert_eq!(superset.score, 0);

        let exact = grade_submission(&quiz, &[answer(1, &[12, 10])]).unwrap();
        assert_eq!(exact.score, 2);
        assert_eq!(exact.correct_answers[0].correct_option_ids, vec![10, 12]);
    }

    #[test]
    fn test_unknown_question_is_rejected() {
        let quiz = quiz(vec![question(1, 1, 2, &[0])]);
        let err = grade_submission(&quiz, &[answer(99, &[10])]).unwrap_err();
        assert_eq!(err, GradeError::UnknownQuestion(99));
    }

    #[test]
    fn test_duplicate_answer_is_rejected() {
        let quiz = quiz(vec![question(1, 1, 2, &[0])]);
        let err = grade_submission(&quiz, &[answer(1, &[10]), answer(1, &[11])]).unwrap_err();
        assert_eq!(err, GradeError::DuplicateAnswer(1));
    }

    #[test]
    fn test_unsupported_question_type_is_reported() {
        let mut essay = question(2, 5, 0, &[]);
        essay.question_type = QuestionType::Essay;
        let quiz = quiz(vec![question(1, 1, 2, &[0]), essay]);

        let err = grade_submission(&quiz, &[answer(1, &[10])]).unwrap_err();
        assert!(matches!(
            err,
            GradeError::UnsupportedQuestionType {
                question_id: 2,
                question_type: QuestionType::Essay
            }
        ));
    }

    #[test]
    fn test_huge_point_values_saturate_instead_of_overflowing() {
        let quiz = quiz(vec![
            question(1, i64::MAX, 2, &[0]),
            question(2, i64::MAX, 2, &[0]),
        ]);
        let graded = grade_submission(&quiz, &[answer(1, &[10]), answer(2, &[20])]).unwrap();

        assert_eq!(graded.score, i64::MAX);
        assert_eq!(graded.total_points, i64::MAX);
        assert_eq!(graded.percentage(), 100);
    }

    #[test]
    fn test_grading_is_deterministic() {
        let quiz = quiz(vec![question(1, 1, 3, &[2]), question(2, 2, 3, &[0, 1])]);
        let answers = [answer(2, &[20, 21]), answer(1, &[10])];

        let first = grade_submission(&quiz, &answers).unwrap();
        let second = grade_submission(&quiz, &answers).unwrap();
        assert_eq!(first, second);
    }
}
