//! 讲解服务抽象
//!
//! 所有后端（Gemini RapidAPI / OpenAI 兼容 / Mock）实现 Explainer：纯文本进、纯文本出。

use async_trait::async_trait;

use crate::core::NarrationError;

/// 讲解服务客户端 trait
#[async_trait]
pub trait Explainer: Send + Sync {
    /// 发送提示词，返回讲解文本
    async fn explain(&self, prompt: &str) -> Result<String, NarrationError>;

    /// 后端名称（用于日志）
    fn name(&self) -> &str {
        "explainer"
    }
}
