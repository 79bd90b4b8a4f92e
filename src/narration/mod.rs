//! 讲解层：Explainer 抽象与实现（Gemini / OpenAI 兼容 / Mock）+ 带兜底的 Narrator

pub mod gemini;
pub mod mock;
pub mod narrator;
pub mod openai;
pub mod prompt;
pub mod traits;

use std::sync::Arc;
use std::time::Duration;

pub use gemini::GeminiClient;
pub use mock::MockExplainer;
pub use narrator::Narrator;
pub use openai::{OpenAiExplainer, TokenUsage};
pub use prompt::{build_step_prompt, FALLBACK_NARRATION};
pub use traits::Explainer;

use crate::config::NarrationSection;
use crate::core::NarrationError;

/// 根据配置与环境变量选择讲解后端（Gemini / OpenAI 兼容 / Mock）
///
/// Mock 只在显式配置 `provider = "mock"` 时使用；缺少 API Key 或后端未知时返回错误。
pub fn create_explainer_from_config(
    cfg: &NarrationSection,
) -> Result<Arc<dyn Explainer>, NarrationError> {
    select_explainer(
        cfg,
        std::env::var("RAPIDAPI_KEY").ok(),
        std::env::var("OPENAI_API_KEY").ok(),
    )
}

fn select_explainer(
    cfg: &NarrationSection,
    rapidapi_key: Option<String>,
    openai_key: Option<String>,
) -> Result<Arc<dyn Explainer>, NarrationError> {
    match cfg.provider.to_lowercase().as_str() {
        "gemini" => {
            let key = rapidapi_key.ok_or(NarrationError::MissingApiKey("RAPIDAPI_KEY"))?;
            tracing::info!("Using Gemini narration ({})", cfg.gemini_host);
            Ok(Arc::new(GeminiClient::new(
                &cfg.gemini_url,
                &cfg.gemini_host,
                &key,
                cfg.timeout_secs,
            )))
        }
        "openai" => {
            let key = openai_key.ok_or(NarrationError::MissingApiKey("OPENAI_API_KEY"))?;
            tracing::info!("Using OpenAI narration ({})", cfg.model);
            Ok(Arc::new(OpenAiExplainer::new(
                cfg.base_url.as_deref(),
                &cfg.model,
                &key,
            )))
        }
        "mock" => Ok(Arc::new(MockExplainer::new())),
        other => Err(NarrationError::UnknownProvider(other.to_string())),
    }
}

/// 按配置构造 Narrator；关闭讲解时返回 None，后端不可用时每步显示兜底文案
pub fn create_narrator_from_config(cfg: &NarrationSection) -> Option<Narrator> {
    if !cfg.enabled {
        tracing::info!("Narration disabled");
        return None;
    }
    let narrator = match create_explainer_from_config(cfg) {
        Ok(explainer) => Narrator::new(explainer, Duration::from_secs(cfg.timeout_secs)),
        Err(e) => {
            tracing::warn!("Narration unavailable ({}), showing fallback text", e);
            Narrator::fallback_only()
        }
    };
    Some(narrator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizer::build_walkthrough;

    fn section(provider: &str) -> NarrationSection {
        NarrationSection {
            provider: provider.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_mock_provider_selected_explicitly() {
        let explainer = select_explainer(&section("mock"), None, None).unwrap();
        assert_eq!(explainer.name(), "mock");
    }

    #[test]
    fn test_provider_with_key() {
        let gemini = select_explainer(&section("gemini"), Some("k".into()), None).unwrap();
        assert_eq!(gemini.name(), "gemini");
        let openai = select_explainer(&section("OpenAI"), None, Some("k".into())).unwrap();
        assert_eq!(openai.name(), "openai");
    }

    #[test]
    fn test_missing_key_is_an_error() {
        assert_eq!(
            select_explainer(&section("gemini"), None, Some("k".into())).err(),
            Some(NarrationError::MissingApiKey("RAPIDAPI_KEY"))
        );
        assert_eq!(
            select_explainer(&section("openai"), Some("k".into()), None).err(),
            Some(NarrationError::MissingApiKey("OPENAI_API_KEY"))
        );
    }

    #[tokio::test]
    async fn test_unknown_provider_narrates_fallback() {
        let cfg = section("bard");
        assert!(matches!(
            create_explainer_from_config(&cfg).err(),
            Some(NarrationError::UnknownProvider(_))
        ));
        let narrator = create_narrator_from_config(&cfg).unwrap();
        let (_, steps) = build_walkthrough("x = 5");
        let text = narrator.explain_step(&steps[0], 0, steps.len()).await;
        assert_eq!(text, FALLBACK_NARRATION);
    }

    #[test]
    fn test_disabled_narration_yields_none() {
        let cfg = NarrationSection {
            enabled: false,
            ..Default::default()
        };
        assert!(create_narrator_from_config(&cfg).is_none());
    }
}
