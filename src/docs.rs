// src/docs.rs

use utoipa::OpenApi;

use crate::{
    error::ErrorBody,
    handlers::{quiz, result},
    models::{
        quiz::{
            MatchingPair, PublicOption, PublicQuestion, PublicQuiz, Question, QuestionDetails,
            QuestionType, Quiz, QuizOption,
        },
        result::{
            CorrectAnswer, QuizResult, ResultAnswer, ResultSummary, SubmitResultRequest,
            SubmitResultResponse, SubmittedAnswer,
        },
        stats::{LeaderboardEntry, UserStats},
    },
};

/// OpenAPI description of the quiz and result endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(
        quiz::list_quizzes,
        quiz::get_quiz,
        quiz::get_quiz_for_attempt,
        result::submit_result,
        result::list_my_results,
        result::get_result,
        result::get_user_stats,
        result::get_leaderboard,
    ),
    components(schemas(
        ErrorBody,
        QuestionType,
        QuizOption,
        MatchingPair,
        QuestionDetails,
        Question,
        Quiz,
        PublicOption,
        PublicQuestion,
        PublicQuiz,
        SubmittedAnswer,
        SubmitResultRequest,
        ResultAnswer,
        QuizResult,
        CorrectAnswer,
        SubmitResultResponse,
        ResultSummary,
        UserStats,
        LeaderboardEntry,
    )),
    tags((name = "quiz", description = "Quiz attempts, grading and statistics"))
)]
pub struct ApiDoc;
