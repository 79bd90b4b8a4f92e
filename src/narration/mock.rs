//! Mock 讲解客户端（用于测试与离线运行，无需 API）
//!
//! 正常模式取提示词中的 `Code line:` 行回显；失败模式模拟网络错误。

use async_trait::async_trait;

use crate::core::NarrationError;
use crate::narration::Explainer;

/// Mock 客户端
#[derive(Debug, Default)]
pub struct MockExplainer {
    fail: bool,
}

impl MockExplainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次调用都返回网络错误
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl Explainer for MockExplainer {
    async fn explain(&self, prompt: &str) -> Result<String, NarrationError> {
        if self.fail {
            return Err(NarrationError::Request(
                "simulated network failure".to_string(),
            ));
        }
        let line = prompt
            .lines()
            .find_map(|l| l.strip_prefix("Code line: "))
            .unwrap_or("(no code)");
        Ok(format!("This step runs `{line}`."))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
