//! Gemini（RapidAPI 代理）讲解客户端
//!
//! GET `<url>?prompt=<urlencoded>`，带 X-RapidAPI-Key / X-RapidAPI-Host 头；
//! 响应体取 `response` 字段，其次 `text` 字段，两者都没有视为格式错误。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::core::NarrationError;
use crate::narration::Explainer;

/// RapidAPI Gemini 客户端
pub struct GeminiClient {
    client: Client,
    url: String,
    host: String,
    api_key: String,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(url: &str, host: &str, api_key: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: url.to_string(),
            host: host.to_string(),
            api_key: api_key.to_string(),
            timeout_secs,
        }
    }
}

/// 从响应 JSON 中提取讲解文本
pub(crate) fn extract_text(body: &Value) -> Result<String, NarrationError> {
    let field = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };
    field("response")
        .or_else(|| field("text"))
        .map(str::to_string)
        .ok_or_else(|| {
            NarrationError::MalformedResponse("missing `response` / `text` field".to_string())
        })
}

#[async_trait]
impl Explainer for GeminiClient {
    async fn explain(&self, prompt: &str) -> Result<String, NarrationError> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[("prompt", prompt)])
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NarrationError::Timeout(self.timeout_secs)
                } else {
                    NarrationError::Request(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            return Err(NarrationError::Status(resp.status().as_u16()));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| NarrationError::MalformedResponse(e.to_string()))?;
        extract_text(&body)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_prefers_response_field() {
        let body = json!({"response": "first", "text": "second"});
        assert_eq!(extract_text(&body).unwrap(), "first");
    }

    #[test]
    fn test_extract_falls_back_to_text() {
        let body = json!({"text": "only text"});
        assert_eq!(extract_text(&body).unwrap(), "only text");
    }

    #[test]
    fn test_extract_skips_null_response() {
        let body = json!({"response": null, "text": "from text"});
        assert_eq!(extract_text(&body).unwrap(), "from text");
    }

    #[test]
    fn test_extract_rejects_unknown_shape() {
        let body = json!({"error": "quota exceeded"});
        assert!(matches!(
            extract_text(&body),
            Err(NarrationError::MalformedResponse(_))
        ));
    }
}
