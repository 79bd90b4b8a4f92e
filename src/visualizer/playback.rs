//! 播放状态机
//!
//! Idle → Ready → Playing ⇄ Paused → Ended；reset 任意状态回到 Ready。
//! 所有转换都是纯内存更新，不会失败；越界推进只会停止自动播放，不报错。
//! 计时器本身不在这里：[`PlaybackTimer`] 负责按固定间隔投递 tick，由会话调用 [`Playback::tick`]。

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::step::Step;

/// 默认自动播放间隔
pub const DEFAULT_PLAY_INTERVAL: Duration = Duration::from_millis(2500);

/// 播放阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// 未加载步骤
    Idle,
    /// 已加载，游标在 0 或手动单步中，未播放
    Ready,
    Playing,
    Paused,
    /// 游标在最后一步且未播放
    Ended,
}

/// 播放状态：不可变步骤序列 + 游标
#[derive(Debug, Clone)]
pub struct Playback {
    steps: Arc<[Step]>,
    cursor: Option<usize>,
    phase: PlaybackPhase,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            steps: Arc::from(Vec::new()),
            cursor: None,
            phase: PlaybackPhase::Idle,
        }
    }
}

impl Playback {
    pub fn new() -> Self {
        Self::default()
    }

    /// 整体替换步骤序列；空序列保持 Idle
    pub fn load(&mut self, steps: impl Into<Arc<[Step]>>) {
        self.steps = steps.into();
        if self.steps.is_empty() {
            self.cursor = None;
            self.phase = PlaybackPhase::Idle;
        } else {
            self.cursor = Some(0);
            self.phase = PlaybackPhase::Ready;
        }
    }

    /// Ready / Paused → Playing；返回是否真正开始播放
    pub fn play(&mut self) -> bool {
        match self.phase {
            PlaybackPhase::Ready | PlaybackPhase::Paused => {
                self.phase = PlaybackPhase::Playing;
                true
            }
            _ => false,
        }
    }

    /// Playing → Paused；其余状态无操作
    pub fn pause(&mut self) -> bool {
        if self.phase == PlaybackPhase::Playing {
            self.phase = PlaybackPhase::Paused;
            true
        } else {
            false
        }
    }

    /// 计时器推进：已在最后一步时转为 Ended 并停止；返回游标是否移动
    pub fn tick(&mut self) -> bool {
        if self.phase != PlaybackPhase::Playing {
            return false;
        }
        match self.cursor {
            Some(cursor) if cursor < self.last_index() => {
                self.cursor = Some(cursor + 1);
                true
            }
            _ => {
                self.phase = PlaybackPhase::Ended;
                false
            }
        }
    }

    /// 手动单步：仅 Ready / Paused；到达最后一步转为 Ended；返回游标是否移动
    pub fn step(&mut self) -> bool {
        if !matches!(self.phase, PlaybackPhase::Ready | PlaybackPhase::Paused) {
            return false;
        }
        let Some(cursor) = self.cursor else {
            return false;
        };
        let last = self.last_index();
        if cursor >= last {
            return false;
        }
        self.cursor = Some(cursor + 1);
        if cursor + 1 == last {
            self.phase = PlaybackPhase::Ended;
        }
        true
    }

    /// 游标归零、停止播放；未加载时保持 Idle
    pub fn reset(&mut self) {
        if self.steps.is_empty() {
            self.cursor = None;
            self.phase = PlaybackPhase::Idle;
        } else {
            self.cursor = Some(0);
            self.phase = PlaybackPhase::Ready;
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }

    pub fn steps(&self) -> &Arc<[Step]> {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.cursor.and_then(|c| self.steps.get(c))
    }

    fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// 自动播放计时器：持有取消令牌，按固定间隔向会话投递带代次的 tick
///
/// pause / reset / 重新加载时调用 [`PlaybackTimer::cancel`]；Drop 时同样取消。
#[derive(Debug)]
pub struct PlaybackTimer {
    token: CancellationToken,
    generation: u64,
}

impl PlaybackTimer {
    /// 启动计时任务；`on_tick` 把代次包装成会话命令
    pub fn start<T, F>(
        interval: Duration,
        generation: u64,
        tx: mpsc::UnboundedSender<T>,
        on_tick: F,
    ) -> Self
    where
        T: Send + 'static,
        F: Fn(u64) -> T + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        if tx.send(on_tick(generation)).is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!(generation, "playback timer stopped");
        });
        Self { token, generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for PlaybackTimer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizer::{synthesize, Category};

    fn loaded(lines: usize) -> Playback {
        let src = (0..lines).map(|n| format!("x{n} = {n}")).collect::<Vec<_>>().join("\n");
        let mut playback = Playback::new();
        playback.load(synthesize(&src, Category::Variables));
        playback
    }

    #[test]
    fn test_load_empty_stays_idle() {
        let mut playback = Playback::new();
        playback.load(Vec::<Step>::new());
        assert_eq!(playback.phase(), PlaybackPhase::Idle);
        assert_eq!(playback.cursor(), None);
        assert!(!playback.play());
        assert!(!playback.step());
    }

    #[test]
    fn test_load_enters_ready() {
        let playback = loaded(3);
        assert_eq!(playback.phase(), PlaybackPhase::Ready);
        assert_eq!(playback.cursor(), Some(0));
        assert!(!playback.is_playing());
        assert_eq!(playback.current_step().unwrap().line_number, 1);
    }

    #[test]
    fn test_play_ticks_to_end() {
        let mut playback = loaded(3);
        assert!(playback.play());
        assert!(playback.tick());
        assert!(playback.tick());
        assert_eq!(playback.cursor(), Some(2));
        assert!(playback.is_playing());
        // 已在最后一步：停止而不是越界
        assert!(!playback.tick());
        assert_eq!(playback.phase(), PlaybackPhase::Ended);
        assert_eq!(playback.cursor(), Some(2));
        assert!(!playback.play());
    }

    #[test]
    fn test_pause_and_resume() {
        let mut playback = loaded(4);
        playback.play();
        playback.tick();
        assert!(playback.pause());
        assert_eq!(playback.phase(), PlaybackPhase::Paused);
        assert!(!playback.tick());
        assert_eq!(playback.cursor(), Some(1));
        assert!(!playback.pause());
        assert!(playback.play());
        assert!(playback.tick());
        assert_eq!(playback.cursor(), Some(2));
    }

    #[test]
    fn test_step_not_allowed_while_playing() {
        let mut playback = loaded(3);
        playback.play();
        assert!(!playback.step());
        assert_eq!(playback.cursor(), Some(0));
    }

    #[test]
    fn test_step_clamps_at_last_index() {
        let mut playback = loaded(2);
        assert!(playback.step());
        assert_eq!(playback.cursor(), Some(1));
        assert_eq!(playback.phase(), PlaybackPhase::Ended);
        assert!(!playback.step());
        assert_eq!(playback.cursor(), Some(1));
    }

    #[test]
    fn test_single_step_sequence() {
        let mut playback = loaded(1);
        assert!(!playback.step());
        assert!(playback.play());
        assert!(!playback.tick());
        assert_eq!(playback.phase(), PlaybackPhase::Ended);
        assert_eq!(playback.cursor(), Some(0));
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut playback = loaded(3);
        playback.play();
        playback.tick();
        playback.reset();
        assert_eq!(playback.cursor(), Some(0));
        assert!(!playback.is_playing());
        assert_eq!(playback.phase(), PlaybackPhase::Ready);

        playback.step();
        playback.step();
        assert_eq!(playback.phase(), PlaybackPhase::Ended);
        playback.reset();
        assert_eq!(playback.cursor(), Some(0));
        assert!(!playback.is_playing());

        let mut idle = Playback::new();
        idle.reset();
        assert_eq!(idle.phase(), PlaybackPhase::Idle);
    }

    #[test]
    fn test_reload_replaces_wholesale() {
        let mut playback = loaded(5);
        playback.step();
        playback.step();
        playback.load(synthesize("a = 1\nb = 2", Category::Variables));
        assert_eq!(playback.len(), 2);
        assert_eq!(playback.cursor(), Some(0));
        assert_eq!(playback.phase(), PlaybackPhase::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_sends_ticks_until_cancelled() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
        let timer = PlaybackTimer::start(DEFAULT_PLAY_INTERVAL, 7, tx, |g| g);
        assert_eq!(rx.recv().await, Some(7));
        assert_eq!(rx.recv().await, Some(7));
        timer.cancel();
        assert!(timer.is_cancelled());
        // 计时任务退出后发送端被释放
        assert_eq!(rx.recv().await, None);
    }
}
