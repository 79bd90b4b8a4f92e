//! Judge0 CE（RapidAPI）客户端
//!
//! POST `<base>/submissions` 取 token，等待 poll_delay 后 GET `<base>/submissions/<token>`；
//! 状态仍为排队 / 运行中时继续轮询，最多 max_polls 次。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::ExecutionSection;
use crate::core::ExecutionError;
use crate::execution::{CodeRunner, ExecutionRequest, ExecutionResult};

/// POST /submissions 请求体
#[derive(Debug, Serialize)]
struct SubmissionBody<'a> {
    source_code: &'a str,
    language_id: u32,
    stdin: &'a str,
    expected_output: Option<&'a str>,
}

pub struct Judge0Client {
    client: Client,
    base_url: String,
    host: String,
    api_key: String,
    poll_delay: Duration,
    max_polls: u32,
}

impl Judge0Client {
    pub fn new(cfg: &ExecutionSection, api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            host: cfg.host.clone(),
            api_key: api_key.to_string(),
            poll_delay: Duration::from_millis(cfg.poll_delay_ms),
            max_polls: cfg.max_polls.max(1),
        }
    }

    fn submissions_url(&self) -> String {
        format!("{}/submissions", self.base_url)
    }

    fn result_url(&self, token: &str) -> String {
        format!("{}/submissions/{}", self.base_url, token)
    }

    async fn submit(&self, request: &ExecutionRequest) -> Result<String, ExecutionError> {
        let body = SubmissionBody {
            source_code: &request.source,
            language_id: request.language.judge0_id(),
            stdin: &request.stdin,
            expected_output: None,
        };
        let resp = self
            .client
            .post(self.submissions_url())
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExecutionError::Request(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ExecutionError::Status(resp.status().as_u16()));
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| ExecutionError::Decode(e.to_string()))?;
        extract_token(&body)
    }

    async fn fetch(&self, token: &str) -> Result<ExecutionResult, ExecutionError> {
        let resp = self
            .client
            .get(self.result_url(token))
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .send()
            .await
            .map_err(|e| ExecutionError::Request(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ExecutionError::Status(resp.status().as_u16()));
        }
        resp.json()
            .await
            .map_err(|e| ExecutionError::Decode(e.to_string()))
    }
}

pub(crate) fn extract_token(body: &Value) -> Result<String, ExecutionError> {
    body.get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or(ExecutionError::MissingToken)
}

#[async_trait]
impl CodeRunner for Judge0Client {
    async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionResult, ExecutionError> {
        let token = self.submit(request).await?;
        tracing::info!(language = %request.language, token = %token, "submission created");

        for poll in 1..=self.max_polls {
            tokio::time::sleep(self.poll_delay).await;
            let result = self.fetch(&token).await?;
            if !result.is_pending() {
                tracing::debug!(
                    poll,
                    status = result.status.id,
                    description = %result.status.description,
                    "submission finished"
                );
                return Ok(result);
            }
            tracing::debug!(poll, status = result.status.id, "submission still pending");
        }
        Err(ExecutionError::StillPending(self.max_polls))
    }

    fn name(&self) -> &str {
        "judge0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Language;
    use serde_json::json;

    #[test]
    fn test_urls_strip_trailing_slash() {
        let cfg = ExecutionSection {
            base_url: "https://judge0.example.com/".to_string(),
            ..Default::default()
        };
        let client = Judge0Client::new(&cfg, "key");
        assert_eq!(client.submissions_url(), "https://judge0.example.com/submissions");
        assert_eq!(
            client.result_url("abc"),
            "https://judge0.example.com/submissions/abc"
        );
    }

    #[test]
    fn test_submission_body_shape() {
        let req = ExecutionRequest::new("print(1)", Language::Python).with_stdin("5");
        let body = SubmissionBody {
            source_code: &req.source,
            language_id: req.language.judge0_id(),
            stdin: &req.stdin,
            expected_output: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "source_code": "print(1)",
                "language_id": 71,
                "stdin": "5",
                "expected_output": null
            })
        );
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token(&json!({"token": "t-1"})).unwrap(), "t-1");
        assert_eq!(
            extract_token(&json!({"error": "bad request"})),
            Err(ExecutionError::MissingToken)
        );
    }
}
