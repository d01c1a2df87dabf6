// src/client/api.rs

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    client::{
        error::ClientError,
        source::{QuizOrigin, QuizSource, ResultSubmitter},
    },
    error::ErrorBody,
    models::{
        quiz::Quiz,
        result::{SubmitResultRequest, SubmitResultResponse},
        stats::UserStats,
        user::{CreateUserRequest, LoginRequest, LoginResponse, UserProfile},
    },
};

/// HTTP client for the quiz API.
#[derive(Debug, Clone)]
pub struct QuizApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl QuizApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(QuizApiClient {
            http,
            base,
            token: None,
        })
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    fn bearer(&self) -> Result<&str, ClientError> {
        self.token
            .as_deref()
            .ok_or_else(|| ClientError::Unauthorized("not logged in".to_string()))
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserProfile, ClientError> {
        let response = self
            .http
            .post(self.endpoint("api/auth/register")?)
            .json(&CreateUserRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        decode(response).await
    }

    /// Logs in and keeps the bearer token for later calls.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let response = self
            .http
            .post(self.endpoint("api/auth/login")?)
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let login: LoginResponse = decode(response).await?;
        self.token = Some(login.token.clone());
        Ok(login)
    }

    /// Full quiz with the answer key, for running an attempt.
    pub async fn fetch_attempt_quiz(&self, quiz_id: i64) -> Result<Quiz, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&format!("api/quizzes/{}/attempt", quiz_id))?)
            .bearer_auth(self.bearer()?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(quiz_id));
        }
        decode(response).await
    }

    pub async fn submit_result(
        &self,
        payload: &SubmitResultRequest,
    ) -> Result<SubmitResultResponse, ClientError> {
        let response = self
            .http
            .post(self.endpoint("api/results")?)
            .bearer_auth(self.bearer()?)
            .json(payload)
            .send()
            .await?;
        decode(response).await
    }

    /// Stats of a user. The zero block of a user without results has no
    /// `totalUsers`, which then decodes as 0.
    pub async fn fetch_stats(&self, user_id: i64) -> Result<UserStats, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&format!("api/results/stats/{}", user_id))?)
            .bearer_auth(self.bearer()?)
            .send()
            .await?;

        decode(response).await
    }
}

/// Turns a response into `T`, or into a `ClientError` carrying the server's message.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        return Ok(serde_json::from_slice(&bytes)?);
    }

    let message = serde_json::from_slice::<ErrorBody>(&bytes)
        .map(|body| body.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(ClientError::Unauthorized(message))
        }
        _ => Err(ClientError::Api {
            status: status.as_u16(),
            message,
        }),
    }
}

#[async_trait]
impl QuizSource for QuizApiClient {
    fn origin(&self) -> QuizOrigin {
        QuizOrigin::Server
    }

    async fn fetch_quiz(&self, quiz_id: i64) -> Result<Quiz, ClientError> {
        self.fetch_attempt_quiz(quiz_id).await
    }
}

#[async_trait]
impl ResultSubmitter for QuizApiClient {
    async fn submit(
        &self,
        payload: &SubmitResultRequest,
    ) -> Result<SubmitResultResponse, ClientError> {
        self.submit_result(payload).await
    }
}
