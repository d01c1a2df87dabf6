// tests/api_tests.rs

use quiz_server::{config::Config, routes, state::AppState};
use serde_json::{Value, json};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345") and the pool.
async fn spawn_app() -> (String, SqlitePool) {
    // A single connection keeps the in-memory database alive and shared.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_username: None,
        admin_password: None,
        seed_quizzes: false,
        port: 0,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

fn unique_name() -> String {
    format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8])
}

/// Registers and logs in a fresh user. Returns (token, user id).
async fn login_new_user(client: &reqwest::Client, address: &str) -> (String, i64) {
    let username = unique_name();
    let password = "password123";

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(response.status().as_u16(), 201);

    let login: Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    assert_eq!(login["type"], "Bearer");
    (
        login["token"].as_str().expect("Token not found").to_string(),
        login["user"]["id"].as_i64().expect("User id not found"),
    )
}

/// Creates a quiz of `points.len()` multiple-choice questions with two options
/// each, the first one correct. Returns the quiz as served for an attempt.
async fn create_quiz(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    points: &[i64],
) -> Value {
    let questions: Vec<Value> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            json!({
                "questionText": format!("Question {}", i + 1),
                "questionType": "multiple-choice",
                "points": p,
                "options": [
                    { "text": "right", "isCorrect": true },
                    { "text": "wrong", "isCorrect": false }
                ]
            })
        })
        .collect();

    let response = client
        .post(format!("{}/api/quizzes", address))
        .bearer_auth(token)
        .json(&json!({
            "title": "Integration quiz",
            "description": "Created by a test",
            "category": "Science",
            "timeLimit": 5,
            "questions": questions
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();

    client
        .get(format!("{}/api/quizzes/{}/attempt", address, created["id"]))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

fn option_id(quiz: &Value, question: usize, option: usize) -> i64 {
    quiz["questions"][question]["options"][option]["id"]
        .as_i64()
        .unwrap()
}

fn question_id(quiz: &Value, question: usize) -> i64 {
    quiz["questions"][question]["id"].as_i64().unwrap()
}

async fn submit(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    body: Value,
) -> reqwest::Response {
    client
        .post(format!("{}/api/results", address))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap()
}

/// Answer to question `question` picking option `option`.
fn answer_for(quiz: &Value, question: usize, option: usize) -> Value {
    json!({
        "questionId": question_id(quiz, question),
        "selectedOptionIds": [option_id(quiz, question, option)]
    })
}

/// Answers every question of `quiz` correctly.
fn perfect_answers(quiz: &Value) -> Vec<Value> {
    (0..quiz["questions"].as_array().unwrap().len())
        .map(|i| answer_for(quiz, i, 0))
        .collect()
}

#[tokio::test]
async fn health_check_404() {
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_fails_validation() {
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({ "username": "yo", "password": "password123" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["statusCode"], 400);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let body = json!({ "username": unique_name(), "password": "password123" });

    for expected in [201, 409] {
        let response = client
            .post(format!("{}/api/auth/register", address))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), expected);
    }
}

#[tokio::test]
async fn public_quiz_hides_answer_key() {
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _) = login_new_user(&client, &address).await;
    let quiz = create_quiz(&client, &address, &token, &[1, 1]).await;

    // The attempt view carries the flags.
    assert_eq!(quiz["questions"][0]["options"][0]["isCorrect"], true);

    let public: Value = client
        .get(format!("{}/api/quizzes/{}", address, quiz["id"]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(public["title"], "Integration quiz");
    assert!(public["questions"][0]["options"][0].get("isCorrect").is_none());

    // Unpublished quizzes stay out of the listing until toggled.
    let listed: Vec<Value> = client
        .get(format!("{}/api/quizzes", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());

    let toggled = client
        .put(format!("{}/api/quizzes/{}/publish", address, quiz["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(toggled.status().as_u16(), 200);

    let listed: Vec<Value> = client
        .get(format!("{}/api/quizzes", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn attempt_view_requires_token() {
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _) = login_new_user(&client, &address).await;
    let quiz = create_quiz(&client, &address, &token, &[1]).await;

    let response = client
        .get(format!("{}/api/quizzes/{}/attempt", address, quiz["id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn partial_submission_scores_against_full_quiz() {
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _) = login_new_user(&client, &address).await;
    let quiz = create_quiz(&client, &address, &token, &[1, 1, 1]).await;

    // Q1 right, Q2 wrong, Q3 unanswered.
    let response = submit(
        &client,
        &address,
        &token,
        json!({
            "quizId": quiz["id"],
            "timeTaken": 90,
            "answers": [
                answer_for(&quiz, 0, 0),
                answer_for(&quiz, 1, 1)
            ]
        }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["result"]["score"], 1);
    assert_eq!(body["result"]["totalPoints"], 3);
    assert_eq!(body["result"]["timeTaken"], 90);
    assert_eq!(body["result"]["answers"].as_array().unwrap().len(), 3);
    assert_eq!(body["result"]["answers"][2]["isCorrect"], false);
    assert_eq!(body["result"]["answers"][2]["pointsEarned"], 0);
    assert_eq!(body["stats"]["averageScore"], 33);
    assert_eq!(body["message"], "Quiz result submitted successfully");

    let review = body["correctAnswers"].as_array().unwrap();
    assert_eq!(review.len(), 3);
    assert_eq!(review[0]["isCorrect"], true);
    assert_eq!(review[1]["correctOptionIds"], json!([option_id(&quiz, 1, 0)]));
    assert_eq!(review[1]["selectedOptionIds"], json!([option_id(&quiz, 1, 1)]));
}

#[tokio::test]
async fn perfect_first_submission_sets_stats() {
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, user_id) = login_new_user(&client, &address).await;
    let quiz = create_quiz(&client, &address, &token, &[4, 3, 2, 1]).await;

    let response = submit(
        &client,
        &address,
        &token,
        json!({ "quizId": quiz["id"], "timeTaken": 30, "answers": perfect_answers(&quiz) }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["result"]["score"], 10);
    assert_eq!(body["result"]["totalPoints"], 10);
    assert_eq!(body["stats"]["completedQuizzes"], 1);
    assert_eq!(body["stats"]["averageScore"], 100);
    assert_eq!(body["stats"]["totalPoints"], 10);
    assert_eq!(body["stats"]["ranking"], 1);
    assert_eq!(body["stats"]["totalUsers"], 1);

    let stats: Value = client
        .get(format!("{}/api/results/stats/{}", address, user_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats, body["stats"]);
}

#[tokio::test]
async fn invalid_submissions_are_rejected_before_any_write() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _) = login_new_user(&client, &address).await;
    let quiz = create_quiz(&client, &address, &token, &[1]).await;
    let answer = answer_for(&quiz, 0, 0);
    let empty = json!({ "questionId": question_id(&quiz, 0), "selectedOptionIds": [] });
    let stranger = json!({ "questionId": 987654, "selectedOptionIds": [1] });

    let cases = [
        json!({ "answers": [answer], "timeTaken": 5 }),
        json!({ "quizId": quiz["id"], "answers": [], "timeTaken": 5 }),
        json!({ "quizId": quiz["id"], "answers": "nope", "timeTaken": 5 }),
        json!({ "quizId": quiz["id"], "answers": [answer], "timeTaken": -1 }),
        json!({ "quizId": quiz["id"], "answers": [answer] }),
        json!({ "quizId": quiz["id"], "answers": [empty], "timeTaken": 5 }),
        json!({ "quizId": quiz["id"], "answers": [stranger], "timeTaken": 5 }),
    ];

    for body in cases {
        let response = submit(&client, &address, &token, body.clone()).await;
        assert_eq!(response.status().as_u16(), 400, "payload: {}", body);
        let error: Value = response.json().await.unwrap();
        assert_eq!(error["statusCode"], 400);
    }

    let missing = submit(
        &client,
        &address,
        &token,
        json!({ "quizId": 987654, "answers": [answer], "timeTaken": 5 }),
    )
    .await;
    assert_eq!(missing.status().as_u16(), 404);

    let results: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM results")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(results, 0);
}

#[tokio::test]
async fn duplicate_submissions_create_separate_results() {
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _) = login_new_user(&client, &address).await;
    let quiz = create_quiz(&client, &address, &token, &[1, 1]).await;
    let body = json!({ "quizId": quiz["id"], "timeTaken": 12, "answers": perfect_answers(&quiz) });

    let first: Value = submit(&client, &address, &token, body.clone()).await.json().await.unwrap();
    let second: Value = submit(&client, &address, &token, body).await.json().await.unwrap();

    assert_ne!(first["result"]["id"], second["result"]["id"]);
    assert_eq!(first["result"]["score"], second["result"]["score"]);
    assert_eq!(first["correctAnswers"], second["correctAnswers"]);
    assert_eq!(second["stats"]["completedQuizzes"], 2);
    assert_eq!(second["stats"]["totalPoints"], 4);

    let history: Vec<Value> = client
        .get(format!("{}/api/results", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["quizTitle"], "Integration quiz");
}

#[tokio::test]
async fn stats_default_and_ownership() {
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token_a, user_a) = login_new_user(&client, &address).await;
    let (token_b, _) = login_new_user(&client, &address).await;

    let response = client
        .get(format!("{}/api/results/stats/{}", address, user_a))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let stats: Value = response.json().await.unwrap();
    assert_eq!(
        stats,
        json!({ "completedQuizzes": 0, "averageScore": 0, "totalPoints": 0, "ranking": 0 })
    );

    let forbidden = client
        .get(format!("{}/api/results/stats/{}", address, user_a))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status().as_u16(), 403);
    let error: Value = forbidden.json().await.unwrap();
    assert_eq!(error["statusCode"], 403);

    let unauthenticated = client
        .get(format!("{}/api/results/stats/{}", address, user_a))
        .send()
        .await
        .unwrap();
    assert_eq!(unauthenticated.status().as_u16(), 401);
}

#[tokio::test]
async fn result_is_visible_to_owner_only() {
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token_a, user_a) = login_new_user(&client, &address).await;
    let (token_b, _) = login_new_user(&client, &address).await;
    let quiz = create_quiz(&client, &address, &token_a, &[1]).await;

    let submitted: Value = submit(
        &client,
        &address,
        &token_a,
        json!({ "quizId": quiz["id"], "timeTaken": 3, "answers": perfect_answers(&quiz) }),
    )
    .await
    .json()
    .await
    .unwrap();
    let result_id = &submitted["result"]["id"];

    let own: Value = client
        .get(format!("{}/api/results/{}", address, result_id))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(own["user"], user_a);
    assert_eq!(own["answers"], submitted["result"]["answers"]);

    let other = client
        .get(format!("{}/api/results/{}", address, result_id))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(other.status().as_u16(), 403);

    let missing = client
        .get(format!("{}/api/results/987654", address))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn leaderboard_orders_by_points_then_quiz_count() {
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token_a, user_a) = login_new_user(&client, &address).await;
    let (token_b, user_b) = login_new_user(&client, &address).await;
    let (token_c, user_c) = login_new_user(&client, &address).await;

    let big = create_quiz(&client, &address, &token_a, &[2, 2]).await;
    let small = create_quiz(&client, &address, &token_a, &[1, 1]).await;

    // A: 4 points in one result. B: 4 points over two results. C: 2 points.
    let submissions = [
        (&token_a, &big),
        (&token_b, &small),
        (&token_b, &small),
        (&token_c, &small),
    ];
    let mut last_stats = Vec::new();
    for (token, quiz) in submissions {
        let body: Value = submit(
            &client,
            &address,
            token,
            json!({ "quizId": quiz["id"], "timeTaken": 10, "answers": perfect_answers(quiz) }),
        )
        .await
        .json()
        .await
        .unwrap();
        last_stats.push(body["stats"].clone());
    }
    assert_eq!(last_stats[3]["ranking"], 3);
    assert_eq!(last_stats[3]["totalUsers"], 3);

    let board: Vec<Value> = client
        .get(format!("{}/api/results/leaderboard?limit=10", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let order: Vec<i64> = board.iter().map(|e| e["userId"].as_i64().unwrap()).collect();
    assert_eq!(order, vec![user_b, user_a, user_c]);
    assert_eq!(board[0]["rank"], 1);
    assert_eq!(board[0]["totalPoints"], 4);
    assert_eq!(board[0]["completedQuizzes"], 2);

    let top: Vec<Value> = client
        .get(format!("{}/api/results/leaderboard?limit=1", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(top.len(), 1);
}

#[tokio::test]
async fn only_owner_can_modify_quiz() {
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token_a, _) = login_new_user(&client, &address).await;
    let (token_b, _) = login_new_user(&client, &address).await;
    let quiz = create_quiz(&client, &address, &token_a, &[1]).await;

    let denied = client
        .delete(format!("{}/api/quizzes/{}", address, quiz["id"]))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status().as_u16(), 403);

    let removed = client
        .delete(format!("{}/api/quizzes/{}", address, quiz["id"]))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap();
    assert_eq!(removed.status().as_u16(), 200);

    let gone = client
        .get(format!("{}/api/quizzes/{}", address, quiz["id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 404);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (address, _) = spawn_app().await;
    let doc: Value = reqwest::get(format!("{}/api/openapi.json", address))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(doc["paths"].get("/api/results").is_some());
}

#[tokio::test]
async fn out_of_range_points_and_time_limit_are_rejected() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _) = login_new_user(&client, &address).await;

    let question = |points: i64| {
        json!({
            "questionText": "Big one",
            "questionType": "multiple-choice",
            "points": points,
            "options": [{ "text": "right", "isCorrect": true }]
        })
    };
    let cases = [
        json!({
            "title": "Huge points",
            "description": "Too many points",
            "category": "Science",
            "timeLimit": 5,
            "questions": [question(i64::MAX), question(i64::MAX)]
        }),
        json!({
            "title": "Huge limit",
            "description": "Too much time",
            "category": "Science",
            "timeLimit": i64::MAX / 2,
            "questions": [question(1)]
        }),
    ];

    for body in cases {
        let response = client
            .post(format!("{}/api/quizzes", address))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "payload: {}", body);
        let error: Value = response.json().await.unwrap();
        assert_eq!(error["statusCode"], 400);
    }

    let quizzes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(quizzes, 0);
}

#[tokio::test]
async fn failed_stats_recompute_keeps_the_saved_result() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _) = login_new_user(&client, &address).await;
    let quiz = create_quiz(&client, &address, &token, &[1, 1]).await;

    sqlx::query(
        r#"
        CREATE TRIGGER block_stats_update
        BEFORE UPDATE OF ranking ON users
        BEGIN
            SELECT RAISE(ABORT, 'stats are read-only');
        END
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let response = submit(
        &client,
        &address,
        &token,
        json!({ "quizId": quiz["id"], "timeTaken": 12, "answers": perfect_answers(&quiz) }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 500);

    let error: Value = response.json().await.unwrap();
    assert_eq!(
        error,
        json!({ "message": "Internal Server Error", "statusCode": 500 })
    );

    let results: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM results")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(results, 1);
}
