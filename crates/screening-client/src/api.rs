use reqwest::Response;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::debug;

use screening_spec::{RawDescriptor, RawResultItem};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// `POST /api/start`
#[derive(Debug, Clone, Deserialize)]
pub struct StartResponse {
    pub session_id: String,
    #[serde(default)]
    pub questions: Option<Vec<RawDescriptor>>,
    #[serde(default)]
    pub filenames: Option<Vec<String>>,
}

/// `GET /api/questions`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct QuestionsResponse {
    #[serde(default)]
    pub questions: Option<Vec<RawDescriptor>>,
    #[serde(default)]
    pub filenames: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/status`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/results`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ResultsResponse {
    #[serde(default)]
    pub results: Option<Vec<RawResultItem>>,
}

#[derive(Debug, Serialize)]
struct AnswersRequest<'a> {
    session_id: &'a str,
    answers: &'a [Value],
}

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    session_id: &'a str,
}

/// Thin JSON client for the screening server's `/api` routes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        session_id: &str,
    ) -> Result<T, ClientError> {
        debug!(path, "GET");
        let response = self
            .http
            .get(self.url(path))
            .query(&[("session_id", session_id)])
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await?;
        decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        debug!(path, "POST");
        let response = self.http.post(self.url(path)).json(body).send().await?;
        decode(response).await
    }

    pub async fn start(&self) -> Result<StartResponse, ClientError> {
        self.post_json("/api/start", &json!({})).await
    }

    pub async fn questions(&self, session_id: &str) -> Result<QuestionsResponse, ClientError> {
        self.get_json("/api/questions", session_id).await
    }

    pub async fn submit_answers(
        &self,
        session_id: &str,
        answers: &[Value],
    ) -> Result<Value, ClientError> {
        self.post_json(
            "/api/answers",
            &AnswersRequest {
                session_id,
                answers,
            },
        )
        .await
    }

    pub async fn analyze(&self, session_id: &str) -> Result<Value, ClientError> {
        self.post_json("/api/analyze", &SessionRequest { session_id })
            .await
    }

    pub async fn status(&self, session_id: &str) -> Result<StatusResponse, ClientError> {
        self.get_json("/api/status", session_id).await
    }

    pub async fn results(&self, session_id: &str) -> Result<ResultsResponse, ClientError> {
        self.get_json("/api/results", session_id).await
    }
}

/// Non-2xx responses become [`ClientError::Status`] carrying the body text.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let mut body = response.text().await?;
        debug!(status = status.as_u16(), "request failed");
        if body.trim().is_empty() {
            body = format!("request failed with status {}", status.as_u16());
        }
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}
