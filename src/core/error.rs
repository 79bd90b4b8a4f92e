//! 错误类型
//!
//! 分类、步骤合成与播放控制均不会失败；只有三个对外边界可能出错：讲解服务、代码执行服务、学习计划文件。
//! 讲解错误不会向上传播，由 Narrator 统一替换为固定兜底文案。

use thiserror::Error;

/// 讲解服务（Gemini / OpenAI 兼容端点）调用错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NarrationError {
    #[error("Narration request timed out after {0}s")]
    Timeout(u64),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {0}")]
    Status(u16),

    /// 响应体缺少 response / text 字段，或不是合法 JSON
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// 所选后端需要的 API Key 环境变量未设置
    #[error("{0} is not set")]
    MissingApiKey(&'static str),

    #[error("Unknown narration provider: {0}")]
    UnknownProvider(String),
}

/// Judge0 代码执行错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Submission response has no token")]
    MissingToken,

    #[error("Decode error: {0}")]
    Decode(String),

    /// 轮询次数用尽时提交仍处于排队 / 运行中
    #[error("Submission still pending after {0} polls")]
    StillPending(u32),
}

/// 学习计划生成与持久化错误
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid daily hours: {0}")]
    InvalidHours(u32),
}
