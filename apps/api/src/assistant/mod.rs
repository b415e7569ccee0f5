/// Assistant client. The single point of entry for all OpenAI calls in Vira.
///
/// No other module talks to the OpenAI API directly. Handlers depend on the
/// `AssistantsApi` trait so the chat flow can run against a scripted fake.
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

pub mod types;

#[cfg(test)]
pub mod fake;

pub use types::{FileObject, Message, Run, RunStatus, Thread};
use types::{ApiErrorEnvelope, MessageList};

const ASSISTANTS_BETA: &str = "assistants=v2";
const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);
const MESSAGE_PAGE_SIZE: u32 = 20;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

/// Operations Vira needs from the hosted Assistants API.
#[async_trait]
pub trait AssistantsApi: Send + Sync {
    async fn create_thread(
        &self,
        metadata: Option<HashMap<String, String>>,
    ) -> Result<Thread, AssistantError>;

    async fn retrieve_thread(&self, thread_id: &str) -> Result<Thread, AssistantError>;

    /// Posts a `user` message to the thread.
    async fn create_message(&self, thread_id: &str, content: &str)
        -> Result<Message, AssistantError>;

    async fn create_run(&self, thread_id: &str, assistant_id: &str)
        -> Result<Run, AssistantError>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError>;

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError>;

    /// Most recent messages first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>, AssistantError>;

    async fn upload_file(&self, filename: &str, contents: Bytes)
        -> Result<FileObject, AssistantError>;

    async fn attach_file_to_vector_store(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> Result<(), AssistantError>;

    /// Removes the file from the vector store; the file itself is kept.
    async fn detach_file_from_vector_store(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> Result<(), AssistantError>;

    async fn delete_file(&self, file_id: &str) -> Result<(), AssistantError>;
}

/// reqwest-backed client for the OpenAI Assistants (v2) API.
/// Retries 429 and 5xx responses with exponential backoff. Transport failures
/// are retried only when the connection was never established, so a request
/// OpenAI may already have acted on is not sent twice.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    backoff: Duration,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self, AssistantError> {
        Ok(Self {
            client: Client::builder().timeout(HTTP_TIMEOUT).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            backoff: RETRY_BASE_DELAY,
        })
    }

    #[cfg(test)]
    fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends the request built by `build`, rebuilding it for each retry.
    async fn execute<T, F>(&self, build: F) -> Result<T, AssistantError>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let mut last_error: Option<AssistantError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = retry_delay(self.backoff, attempt);
                warn!(
                    "OpenAI call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = build(&self.client)
                .bearer_auth(&self.api_key)
                .header("OpenAI-Beta", ASSISTANTS_BETA)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) if e.is_connect() => {
                    last_error = Some(AssistantError::Http(e));
                    continue;
                }
                Err(e) => return Err(AssistantError::Http(e)),
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("OpenAI API returned {}: {}", status, body);
                last_error = Some(AssistantError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AssistantError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                });
            }

            let body = response.bytes().await?;
            return Ok(serde_json::from_slice(&body)?);
        }

        Err(last_error.unwrap_or(AssistantError::RateLimited {
            retries: MAX_ATTEMPTS,
        }))
    }
}

/// Exponential backoff before retry `attempt` (1-based): base, 2 x base, ...
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    base * (1 << (attempt - 1))
}

/// Pulls `error.message` out of an OpenAI error body, falling back to the raw body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[async_trait]
impl AssistantsApi for OpenAiClient {
    async fn create_thread(
        &self,
        metadata: Option<HashMap<String, String>>,
    ) -> Result<Thread, AssistantError> {
        let url = self.url("/threads");
        let body = match metadata {
            Some(metadata) => json!({ "metadata": metadata }),
            None => json!({}),
        };
        let thread: Thread = self.execute(|c| c.post(&url).json(&body)).await?;
        debug!("Created thread {}", thread.id);
        Ok(thread)
    }

    async fn retrieve_thread(&self, thread_id: &str) -> Result<Thread, AssistantError> {
        let url = self.url(&format!("/threads/{thread_id}"));
        self.execute(|c| c.get(&url)).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        content: &str,
    ) -> Result<Message, AssistantError> {
        let url = self.url(&format!("/threads/{thread_id}/messages"));
        let body = json!({ "role": "user", "content": content });
        self.execute(|c| c.post(&url).json(&body)).await
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, AssistantError> {
        let url = self.url(&format!("/threads/{thread_id}/runs"));
        let body = json!({ "assistant_id": assistant_id });
        let run: Run = self.execute(|c| c.post(&url).json(&body)).await?;
        debug!("Started run {} on thread {}", run.id, thread_id);
        Ok(run)
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
        let url = self.url(&format!("/threads/{thread_id}/runs/{run_id}"));
        self.execute(|c| c.get(&url)).await
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
        let url = self.url(&format!("/threads/{thread_id}/runs/{run_id}/cancel"));
        self.execute(|c| c.post(&url)).await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>, AssistantError> {
        let url = self.url(&format!("/threads/{thread_id}/messages"));
        let limit = MESSAGE_PAGE_SIZE.to_string();
        let page: MessageList = self
            .execute(|c| {
                c.get(&url)
                    .query(&[("order", "desc"), ("limit", limit.as_str())])
            })
            .await?;
        Ok(page.data)
    }

    async fn upload_file(
        &self,
        filename: &str,
        contents: Bytes,
    ) -> Result<FileObject, AssistantError> {
        let url = self.url("/files");
        let filename = filename.to_string();
        self.execute(|c| {
            let part = multipart::Part::bytes(contents.to_vec())
                .file_name(filename.clone())
                .mime_str("text/plain")
                .unwrap_or_else(|_| multipart::Part::bytes(contents.to_vec()));
            let form = multipart::Form::new()
                .text("purpose", "assistants")
                .part("file", part);
            c.post(&url).multipart(form)
        })
        .await
    }

    async fn attach_file_to_vector_store(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> Result<(), AssistantError> {
        let url = self.url(&format!("/vector_stores/{vector_store_id}/files"));
        let body = json!({ "file_id": file_id });
        let _: serde_json::Value = self.execute(|c| c.post(&url).json(&body)).await?;
        Ok(())
    }

    async fn detach_file_from_vector_store(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> Result<(), AssistantError> {
        let url = self.url(&format!("/vector_stores/{vector_store_id}/files/{file_id}"));
        let _: serde_json::Value = self.execute(|c| c.delete(&url)).await?;
        Ok(())
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), AssistantError> {
        let url = self.url(&format!("/files/{file_id}"));
        let _: serde_json::Value = self.execute(|c| c.delete(&url)).await?;
        Ok(())
    }
}
