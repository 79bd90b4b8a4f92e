//! 代码走查可视化：类别检测 → 步骤合成 → 播放状态机 → 场景渲染
//!
//! 走查数据是按类别套公式合成的演示数据，不代表真实执行结果。

pub mod category;
pub mod playback;
pub mod render;
pub mod step;

pub use category::{classify, Category, CategoryClassifier};
pub use playback::{Playback, PlaybackPhase, PlaybackTimer, DEFAULT_PLAY_INTERVAL};
pub use render::{render_text, Scene};
pub use step::{synthesize, CellKind, MemoryCell, Step, Variables};

/// 一次完整的走查生成：分类一次，再逐行合成
pub fn build_walkthrough(source: &str) -> (Category, Vec<Step>) {
    let category = classify(source);
    let steps = synthesize(source, category);
    tracing::debug!(%category, steps = steps.len(), "walkthrough generated");
    (category, steps)
}
