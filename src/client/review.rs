// src/client/review.rs

use crate::{
    models::result::{CorrectAnswer, SubmitResultResponse},
    services::grading::percentage,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Average,
    Poor,
}

impl ScoreBand {
    pub fn for_percentage(percentage: i64) -> Self {
        match percentage {
            p if p >= 90 => ScoreBand::Excellent,
            p if p >= 75 => ScoreBand::Good,
            p if p >= 60 => ScoreBand::Average,
            _ => ScoreBand::Poor,
        }
    }
}

/// Formats a duration as `Xm Ys`.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}m {}s", seconds / 60, seconds % 60)
}

/// Review screen data, built from the server's grading of a submission.
#[derive(Debug, Clone)]
pub struct ResultReview {
    pub result_id: i64,
    pub score: i64,
    pub total_points: i64,
    pub time_taken: i64,
    pub entries: Vec<CorrectAnswer>,
}

impl ResultReview {
    pub fn from_response(response: &SubmitResultResponse) -> Self {
        ResultReview {
            result_id: response.result.id,
            score: response.result.score,
            total_points: response.result.total_points,
            time_taken: response.result.time_taken,
            entries: response.correct_answers.clone(),
        }
    }

    pub fn correct_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_correct).count()
    }

    pub fn percentage(&self) -> i64 {
        percentage(self.score, self.total_points)
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::for_percentage(self.percentage())
    }

    pub fn entry(&self, question_id: i64) -> Option<&CorrectAnswer> {
        self.entries.iter().find(|e| e.question_id == question_id)
    }

    pub fn time_label(&self) -> String {
        format_duration(self.time_taken)
    }
}
