// src/utils/html.rs

use crate::models::quiz::CreateQuizRequest;

/// Strips unsafe markup (scripts, event handlers) while keeping harmless tags.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Sanitizes every free-text field of a quiz before it is stored.
pub fn sanitize_quiz(req: &mut CreateQuizRequest) {
    req.title = clean_html(&req.title);
    req.description = clean_html(&req.description);
    for question in &mut req.questions {
        question.question_text = clean_html(&question.question_text);
        question.explanation = clean_html(&question.explanation);
        for option in &mut question.options {
            option.text = clean_html(&option.text);
        }
    }
}
