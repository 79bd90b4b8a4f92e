//! 代码执行：Judge0 提交 / 轮询与结果归类
//!
//! 执行结果只用于展示；可视化走查并不依赖真实执行，`run --visualize` 仅在 Accepted 后才进入走查。

pub mod judge0;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::ExecutionError;

pub use judge0::Judge0Client;

/// Judge0 状态码：排队中
pub const STATUS_IN_QUEUE: u32 = 1;
/// Judge0 状态码：运行中
pub const STATUS_PROCESSING: u32 = 2;
pub const STATUS_ACCEPTED: u32 = 3;
pub const STATUS_TIME_LIMIT_EXCEEDED: u32 = 5;
pub const STATUS_COMPILATION_ERROR: u32 = 6;

/// 支持的语言；未知名称回退到 Python
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    Javascript,
    Java,
    Cpp,
    C,
}

impl Language {
    /// Judge0 language_id
    pub fn judge0_id(self) -> u32 {
        match self {
            Language::Python => 71,
            Language::Javascript => 63,
            Language::Java => 62,
            Language::Cpp => 54,
            Language::C => 50,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
        }
    }

    /// 按名称查找，大小写不敏感；未知名称得到 Python
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "javascript" | "js" => Language::Javascript,
            "java" => Language::Java,
            "cpp" | "c++" => Language::Cpp,
            "c" => Language::C,
            _ => Language::Python,
        }
    }
}

impl FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Language::from_name(s))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次执行请求
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub source: String,
    pub language: Language,
    pub stdin: String,
}

impl ExecutionRequest {
    pub fn new(source: impl Into<String>, language: Language) -> Self {
        Self {
            source: source.into(),
            language,
            stdin: String::new(),
        }
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = stdin.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub id: u32,
    #[serde(default)]
    pub description: String,
}

/// Judge0 GET /submissions/<token> 的响应体（只取用到的字段）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(default)]
    pub status: ExecutionStatus,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    /// 秒，Judge0 以字符串返回
    pub time: Option<String>,
    /// KB
    pub memory: Option<u64>,
}

impl ExecutionResult {
    pub fn is_pending(&self) -> bool {
        matches!(self.status.id, STATUS_IN_QUEUE | STATUS_PROCESSING)
    }
}

/// 执行结果归类，携带要展示的文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Accepted(String),
    CompilationError(String),
    TimeLimitExceeded,
    Failed(String),
}

/// 取第一个非空字段
fn first_non_empty<'a>(fields: &[&'a Option<String>]) -> Option<&'a str> {
    fields
        .iter()
        .copied()
        .filter_map(Option::as_deref)
        .find(|s| !s.is_empty())
}

impl ExecutionOutcome {
    pub fn from_result(result: &ExecutionResult) -> Self {
        match result.status.id {
            STATUS_ACCEPTED => ExecutionOutcome::Accepted(
                first_non_empty(&[&result.stdout])
                    .unwrap_or("Program executed successfully")
                    .to_string(),
            ),
            STATUS_COMPILATION_ERROR => ExecutionOutcome::CompilationError(
                first_non_empty(&[&result.compile_output, &result.stderr])
                    .unwrap_or_default()
                    .to_string(),
            ),
            STATUS_TIME_LIMIT_EXCEEDED => ExecutionOutcome::TimeLimitExceeded,
            _ => ExecutionOutcome::Failed(
                first_non_empty(&[&result.stderr, &result.stdout])
                    .unwrap_or("Unknown error occurred")
                    .to_string(),
            ),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ExecutionOutcome::Accepted(_))
    }

    /// 终端展示文本
    pub fn output_text(&self) -> String {
        match self {
            ExecutionOutcome::Accepted(out) | ExecutionOutcome::Failed(out) => out.clone(),
            ExecutionOutcome::CompilationError(out) => format!("Compilation Error:\n{out}"),
            ExecutionOutcome::TimeLimitExceeded => "Time Limit Exceeded".to_string(),
        }
    }
}

/// 代码执行后端
#[async_trait]
pub trait CodeRunner: Send + Sync {
    async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionResult, ExecutionError>;

    fn name(&self) -> &str {
        "runner"
    }
}

/// 返回固定结果的执行后端（测试与离线演示）
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    pub result: ExecutionResult,
}

impl MockRunner {
    pub fn accepted(stdout: &str) -> Self {
        Self {
            result: ExecutionResult {
                status: ExecutionStatus {
                    id: STATUS_ACCEPTED,
                    description: "Accepted".to_string(),
                },
                stdout: Some(stdout.to_string()),
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl CodeRunner for MockRunner {
    async fn run(&self, _request: &ExecutionRequest) -> Result<ExecutionResult, ExecutionError> {
        Ok(self.result.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
