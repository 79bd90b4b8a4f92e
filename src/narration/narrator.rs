//! 讲解请求器
//!
//! 把当前步骤拼成提示词交给 Explainer；成功时原样返回讲解文本，
//! 任何失败（网络、HTTP 状态、响应格式、超时）都替换为固定兜底文案，不向调用方传播错误。

use std::sync::Arc;
use std::time::Duration;

use crate::core::NarrationError;
use crate::narration::{build_step_prompt, Explainer, FALLBACK_NARRATION};
use crate::visualizer::Step;

/// 带超时与兜底的讲解请求器
#[derive(Clone)]
pub struct Narrator {
    /// None：后端不可用（缺少 API Key 等），每步直接使用兜底文案
    explainer: Option<Arc<dyn Explainer>>,
    timeout: Duration,
}

impl Narrator {
    pub fn new(explainer: Arc<dyn Explainer>, timeout: Duration) -> Self {
        Self {
            explainer: Some(explainer),
            timeout,
        }
    }

    /// 不发请求，始终返回兜底文案
    pub fn fallback_only() -> Self {
        Self {
            explainer: None,
            timeout: Duration::ZERO,
        }
    }

    /// 请求单步讲解；position 为 0-based 游标。永不失败
    pub async fn explain_step(&self, step: &Step, position: usize, total: usize) -> String {
        let Some(explainer) = &self.explainer else {
            return FALLBACK_NARRATION.to_string();
        };
        match self.try_explain(explainer.as_ref(), step, position, total).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    explainer = explainer.name(),
                    step = position + 1,
                    error = %e,
                    "narration failed, using fallback"
                );
                FALLBACK_NARRATION.to_string()
            }
        }
    }

    async fn try_explain(
        &self,
        explainer: &dyn Explainer,
        step: &Step,
        position: usize,
        total: usize,
    ) -> Result<String, NarrationError> {
        let prompt = build_step_prompt(step, position, total);
        tracing::debug!(
            explainer = explainer.name(),
            step = position + 1,
            total,
            "requesting narration"
        );
        match tokio::time::timeout(self.timeout, explainer.explain(&prompt)).await {
            Ok(result) => result,
            Err(_) => Err(NarrationError::Timeout(self.timeout.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::MockExplainer;
    use crate::visualizer::{classify, synthesize};
    use async_trait::async_trait;

    struct SlowExplainer;

    #[async_trait]
    impl Explainer for SlowExplainer {
        async fn explain(&self, _prompt: &str) -> Result<String, NarrationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    fn steps() -> Vec<Step> {
        let src = "x = 5\ny = 'hello'";
        synthesize(src, classify(src))
    }

    #[tokio::test]
    async fn test_success_returns_text_verbatim() {
        let narrator = Narrator::new(Arc::new(MockExplainer::new()), Duration::from_secs(5));
        let steps = steps();
        let text = narrator.explain_step(&steps[0], 0, steps.len()).await;
        assert_eq!(text, "This step runs `x = 5`.");
    }

    #[tokio::test]
    async fn test_failure_uses_fallback() {
        let narrator = Narrator::new(Arc::new(MockExplainer::failing()), Duration::from_secs(5));
        let steps = steps();
        let text = narrator.explain_step(&steps[1], 1, steps.len()).await;
        assert_eq!(text, FALLBACK_NARRATION);
    }

    #[tokio::test]
    async fn test_fallback_only_never_calls_backend() {
        let narrator = Narrator::fallback_only();
        let steps = steps();
        let text = narrator.explain_step(&steps[0], 0, steps.len()).await;
        assert_eq!(text, FALLBACK_NARRATION);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_uses_fallback() {
        let narrator = Narrator::new(Arc::new(SlowExplainer), Duration::from_secs(2));
        let steps = steps();
        let text = narrator.explain_step(&steps[0], 0, steps.len()).await;
        assert_eq!(text, FALLBACK_NARRATION);
    }
}
