// src/models/quiz.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Categories a quiz may be filed under.
pub const CATEGORIES: [&str; 8] = [
    "General Knowledge",
    "Science",
    "History",
    "Geography",
    "Sports",
    "Entertainment",
    "Technology",
    "Other",
];

/// Kind of question. Only the choice kinds are graded automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    TrueFalse,
    FillInBlank,
    Matching,
    Essay,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::TrueFalse => "true-false",
            QuestionType::FillInBlank => "fill-in-blank",
            QuestionType::Matching => "matching",
            QuestionType::Essay => "essay",
        }
    }

    /// Whether answers are a selection of option ids.
    pub fn is_choice(&self) -> bool {
        matches!(self, QuestionType::MultipleChoice | QuestionType::TrueFalse)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple-choice" => Ok(QuestionType::MultipleChoice),
            "true-false" => Ok(QuestionType::TrueFalse),
            "fill-in-blank" => Ok(QuestionType::FillInBlank),
            "matching" => Ok(QuestionType::Matching),
            "essay" => Ok(QuestionType::Essay),
            other => Err(format!("unknown question type '{}'", other)),
        }
    }
}

/// One selectable option. Its id is the unit of selection in submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizOption {
    pub id: i64,
    pub text: String,
    pub is_correct: bool,
}

/// A left/right pair for matching questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MatchingPair {
    pub left: String,
    pub right: String,
}

/// Answer data for the question kinds that are not graded by option selection.
/// Stored as JSON next to the question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pairs: Vec<MatchingPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_words: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric: Option<String>,
}

impl QuestionDetails {
    pub fn is_empty(&self) -> bool {
        self == &QuestionDetails::default()
    }
}

/// Full question including the answer key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Vec<QuizOption>,
    pub points: i64,
    pub explanation: String,
    #[serde(flatten)]
    pub details: QuestionDetails,
}

/// Full quiz as served to an authenticated attempt.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Minutes. 0 means no time limit.
    pub time_limit: i64,
    pub questions: Vec<Question>,
    pub is_published: bool,
    pub created_by: i64,
}

/// DTO for sending an option to an unauthenticated client (no correctness flag).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicOption {
    pub id: i64,
    pub text: String,
}

/// DTO for sending a question to an unauthenticated client (no answer key).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Vec<PublicOption>,
    pub points: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuiz {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub time_limit: i64,
    pub questions: Vec<PublicQuestion>,
    pub is_published: bool,
    pub created_by: i64,
}

impl From<Quiz> for PublicQuiz {
    fn from(quiz: Quiz) -> Self {
        PublicQuiz {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            category: quiz.category,
            time_limit: quiz.time_limit,
            questions: quiz
                .questions
                .into_iter()
                .map(|q| PublicQuestion {
                    id: q.id,
                    question_text: q.question_text,
                    question_type: q.question_type,
                    options: q
                        .options
                        .into_iter()
                        .map(|o| PublicOption {
                            id: o.id,
                            text: o.text,
                        })
                        .collect(),
                    points: q.points,
                })
                .collect(),
            is_published: quiz.is_published,
            created_by: quiz.created_by,
        }
    }
}

/// DTO for an option in a create/update request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOption {
    #[validate(length(min = 1, max = 500))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

fn default_points() -> i64 {
    1
}

/// DTO for a question in a create/update request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_answer_key))]
pub struct NewQuestion {
    #[validate(length(min = 1, max = 1000))]
    pub question_text: String,
    #[serde(default)]
    pub question_type: QuestionType,
    #[serde(default)]
    #[validate(nested)]
    pub options: Vec<NewOption>,
    #[serde(default = "default_points")]
    #[validate(range(min = 1, max = 1000, message = "points must be between 1 and 1000"))]
    pub points: i64,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub explanation: String,
    #[serde(flatten)]
    pub details: QuestionDetails,
}

/// DTO for creating or replacing a quiz.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200, message = "Please add a title"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Please add a description"))]
    pub description: String,
    #[validate(custom(function = validate_category))]
    pub category: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 1440, message = "timeLimit must be 0 to 1440 minutes"))]
    pub time_limit: i64,
    #[validate(length(min = 1, message = "A quiz needs at least one question"), nested)]
    pub questions: Vec<NewQuestion>,
}

fn validate_category(category: &str) -> Result<(), ValidationError> {
    if CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_category"))
    }
}

/// Choice questions need options and a non-empty answer key;
/// true-false needs exactly one correct option.
fn validate_answer_key(question: &NewQuestion) -> Result<(), ValidationError> {
    if !question.question_type.is_choice() {
        return Ok(());
    }
    if question.options.is_empty() {
        return Err(ValidationError::new("options_cannot_be_empty"));
    }
    let correct = question.options.iter().filter(|o| o.is_correct).count();
    match question.question_type {
        QuestionType::TrueFalse if correct != 1 => {
            Err(ValidationError::new("true_false_needs_one_correct_option"))
        }
        _ if correct == 0 => Err(ValidationError::new("no_correct_option")),
        _ => Ok(()),
    }
}
