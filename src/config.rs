//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `ALGOMENTOR__*` 覆盖（双下划线表示嵌套，如 `ALGOMENTOR__NARRATION__PROVIDER=openai`）。
//! API Key 不放在配置文件里：讲解与代码执行走 `RAPIDAPI_KEY`，OpenAI 兼容端点走 `OPENAI_API_KEY`。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub narration: NarrationSection,
    #[serde(default)]
    pub execution: ExecutionSection,
    #[serde(default)]
    pub playback: PlaybackSection,
    #[serde(default)]
    pub planner: PlannerSection,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub name: Option<String>,
    /// 未指定 --language 时使用的语言
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            default_language: default_language(),
        }
    }
}

fn default_language() -> String {
    "python".to_string()
}

/// [narration] 段：讲解服务选择与超时
#[derive(Debug, Clone, Deserialize)]
pub struct NarrationSection {
    /// 后端：gemini（RapidAPI）/ openai / mock
    #[serde(default = "default_narration_provider")]
    pub provider: String,
    #[serde(default = "default_gemini_url")]
    pub gemini_url: String,
    #[serde(default = "default_gemini_host")]
    pub gemini_host: String,
    /// OpenAI 兼容端点（可选，未设置时用官方地址）
    pub base_url: Option<String>,
    #[serde(default = "default_narration_model")]
    pub model: String,
    /// 单次讲解请求超时（秒），超时后使用兜底文案
    #[serde(default = "default_narration_timeout")]
    pub timeout_secs: u64,
    /// 关闭后不发请求，也不显示任何讲解
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for NarrationSection {
    fn default() -> Self {
        Self {
            provider: default_narration_provider(),
            gemini_url: default_gemini_url(),
            gemini_host: default_gemini_host(),
            base_url: None,
            model: default_narration_model(),
            timeout_secs: default_narration_timeout(),
            enabled: true,
        }
    }
}

fn default_narration_provider() -> String {
    "gemini".to_string()
}

fn default_gemini_url() -> String {
    "https://gemini-ai-api.p.rapidapi.com/api002".to_string()
}

fn default_gemini_host() -> String {
    "gemini-ai-api.p.rapidapi.com".to_string()
}

fn default_narration_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_narration_timeout() -> u64 {
    20
}

fn default_true() -> bool {
    true
}

/// [execution] 段：Judge0 端点与轮询参数
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionSection {
    #[serde(default = "default_judge0_url")]
    pub base_url: String,
    #[serde(default = "default_judge0_host")]
    pub host: String,
    /// 提交后首次查询前的等待（毫秒）
    #[serde(default = "default_poll_delay_ms")]
    pub poll_delay_ms: u64,
    /// 结果仍在排队 / 运行时最多查询次数
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
    #[serde(default = "default_execution_timeout")]
    pub timeout_secs: u64,
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            base_url: default_judge0_url(),
            host: default_judge0_host(),
            poll_delay_ms: default_poll_delay_ms(),
            max_polls: default_max_polls(),
            timeout_secs: default_execution_timeout(),
        }
    }
}

fn default_judge0_url() -> String {
    "https://judge0-ce.p.rapidapi.com".to_string()
}

fn default_judge0_host() -> String {
    "judge0-ce.p.rapidapi.com".to_string()
}

fn default_poll_delay_ms() -> u64 {
    2000
}

fn default_max_polls() -> u32 {
    5
}

fn default_execution_timeout() -> u64 {
    30
}

/// [playback] 段
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackSection {
    /// 自动播放间隔（毫秒）
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PlaybackSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    2500
}

/// [planner] 段：学习计划文件位置与默认每日时长
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerSection {
    #[serde(default = "default_plan_path")]
    pub plan_path: PathBuf,
    #[serde(default = "default_daily_hours")]
    pub daily_hours: u32,
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            plan_path: default_plan_path(),
            daily_hours: default_daily_hours(),
        }
    }
}

fn default_plan_path() -> PathBuf {
    PathBuf::from("data/algomentor_study_plan.json")
}

fn default_daily_hours() -> u32 {
    2
}

/// 从 config 目录加载配置，环境变量 ALGOMENTOR__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 ALGOMENTOR__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{name}.toml");
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("ALGOMENTOR")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
