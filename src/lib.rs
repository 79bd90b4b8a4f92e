//! AlgoMentor - 代码走查可视化与 AI 讲解引擎
//!
//! 模块划分：
//! - **visualizer**: 类别检测、步骤合成、播放状态机、场景渲染
//! - **narration**: 讲解客户端抽象与实现（Gemini / OpenAI 兼容 / Mock）与带兜底的 Narrator
//! - **session**: 可视化会话主控循环（命令通道 + 快照通道）
//! - **execution**: Judge0 代码执行与结果归类
//! - **planner**: 学习计划生成与 JSON 持久化
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型与优雅关闭
//! - **observability**: tracing 初始化

pub mod config;
pub mod core;
pub mod execution;
pub mod narration;
pub mod observability;
pub mod planner;
pub mod session;
pub mod visualizer;

pub use session::{spawn_session, SessionCommand, SessionView};
pub use visualizer::{build_walkthrough, Category, Step};
