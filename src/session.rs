//! 可视化会话：主控循环
//!
//! 会话任务独占播放状态；调用方通过 cmd 通道发送 [`SessionCommand`]，通过 watch 通道观察 [`SessionView`] 快照。
//! 计时器与讲解请求都是独立任务，结果同样回投到 cmd 通道，所以所有状态修改都发生在会话任务上。
//!
//! 讲解请求带 (加载代次, 游标) 标签，回来时标签与当前状态不一致则丢弃；在途请求不会被主动取消。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::narration::Narrator;
use crate::visualizer::{build_walkthrough, Category, Playback, PlaybackPhase, PlaybackTimer, Step};

/// 发往会话的命令
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// 载入新源码，整体替换步骤序列
    Load { source: String },
    Play,
    Pause,
    /// 手动前进一步
    Step,
    Reset,
    /// 计时器投递，携带计时器代次
    Tick(u64),
    /// 讲解任务完成，携带请求时的标签
    NarrationReady {
        generation: u64,
        cursor: usize,
        text: String,
    },
    /// 关闭会话
    Close,
}

/// 会话对外快照
#[derive(Debug, Clone)]
pub struct SessionView {
    pub phase: PlaybackPhase,
    pub cursor: Option<usize>,
    pub total: usize,
    pub category: Option<Category>,
    pub step: Option<Step>,
    pub narration: Option<String>,
    pub narration_loading: bool,
    /// 每次 Load 自增
    pub generation: u64,
}

impl Default for SessionView {
    fn default() -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            cursor: None,
            total: 0,
            category: None,
            step: None,
            narration: None,
            narration_loading: false,
            generation: 0,
        }
    }
}

struct SessionActor {
    playback: Playback,
    category: Option<Category>,
    narrator: Option<Narrator>,
    interval: Duration,
    timer: Option<PlaybackTimer>,
    timer_generation: u64,
    load_generation: u64,
    narration: Option<String>,
    narration_loading: bool,
    // 弱引用：调用方全部释放发送端后循环可以退出
    cmd_tx: mpsc::WeakUnboundedSender<SessionCommand>,
    view_tx: watch::Sender<SessionView>,
}

impl SessionActor {
    fn handle(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Load { source } => self.load(&source),
            SessionCommand::Play => {
                if self.playback.play() {
                    self.start_timer();
                }
            }
            SessionCommand::Pause => {
                if self.playback.pause() {
                    self.stop_timer();
                }
            }
            SessionCommand::Step => {
                if self.playback.step() {
                    self.request_narration();
                }
            }
            SessionCommand::Reset => {
                self.stop_timer();
                self.playback.reset();
                self.request_narration();
            }
            SessionCommand::Tick(generation) => self.on_tick(generation),
            SessionCommand::NarrationReady {
                generation,
                cursor,
                text,
            } => self.on_narration(generation, cursor, text),
            SessionCommand::Close => {}
        }
        self.publish();
    }

    fn load(&mut self, source: &str) {
        self.stop_timer();
        self.load_generation += 1;
        let (category, steps) = build_walkthrough(source);
        self.playback.load(steps);
        self.category = (!self.playback.is_empty()).then_some(category);
        tracing::info!(
            generation = self.load_generation,
            category = %category,
            steps = self.playback.len(),
            "walkthrough loaded"
        );
        self.request_narration();
    }

    fn on_tick(&mut self, generation: u64) {
        let current = self.timer.as_ref().map(PlaybackTimer::generation);
        if current != Some(generation) {
            tracing::debug!(generation, "stale tick ignored");
            return;
        }
        if self.playback.tick() {
            self.request_narration();
        }
        if self.playback.phase() == PlaybackPhase::Ended {
            tracing::debug!("playback reached the last step");
            self.stop_timer();
        }
    }

    fn on_narration(&mut self, generation: u64, cursor: usize, text: String) {
        if generation != self.load_generation || self.playback.cursor() != Some(cursor) {
            tracing::debug!(generation, cursor, "stale narration discarded");
            return;
        }
        self.narration = Some(text);
        self.narration_loading = false;
    }

    fn start_timer(&mut self) {
        let Some(tx) = self.cmd_tx.upgrade() else {
            return;
        };
        self.timer_generation += 1;
        self.timer = Some(PlaybackTimer::start(
            self.interval,
            self.timer_generation,
            tx,
            SessionCommand::Tick,
        ));
    }

    fn stop_timer(&mut self) {
        // Drop 即取消
        self.timer = None;
    }

    /// 游标变化后为当前步骤发起讲解
    fn request_narration(&mut self) {
        self.narration = None;
        self.narration_loading = false;

        let (Some(narrator), Some(cursor)) = (self.narrator.clone(), self.playback.cursor())
        else {
            return;
        };
        let Some(tx) = self.cmd_tx.upgrade() else {
            return;
        };
        let steps: Arc<[Step]> = self.playback.steps().clone();
        let generation = self.load_generation;
        self.narration_loading = true;

        tokio::spawn(async move {
            let total = steps.len();
            let text = narrator.explain_step(&steps[cursor], cursor, total).await;
            let _ = tx.send(SessionCommand::NarrationReady {
                generation,
                cursor,
                text,
            });
        });
    }

    fn publish(&self) {
        self.view_tx.send_replace(SessionView {
            phase: self.playback.phase(),
            cursor: self.playback.cursor(),
            total: self.playback.len(),
            category: self.category,
            step: self.playback.current_step().cloned(),
            narration: self.narration.clone(),
            narration_loading: self.narration_loading,
            generation: self.load_generation,
        });
    }
}

/// 创建可视化会话：返回命令发送端与快照接收端；后台任务消费命令直到 Close、发送端全部释放或 shutdown。
///
/// `narrator` 为 None 时不请求讲解，快照中的 narration 始终为空。
pub fn spawn_session(
    narrator: Option<Narrator>,
    interval: Duration,
    shutdown: CancellationToken,
) -> (
    mpsc::UnboundedSender<SessionCommand>,
    watch::Receiver<SessionView>,
) {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<SessionCommand>();
    let (view_tx, view_rx) = watch::channel(SessionView::default());

    let mut actor = SessionActor {
        playback: Playback::new(),
        category: None,
        narrator,
        interval,
        timer: None,
        timer_generation: 0,
        load_generation: 0,
        narration: None,
        narration_loading: false,
        cmd_tx: cmd_tx.downgrade(),
        view_tx,
    };

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                cmd = cmd_rx.recv() => match cmd {
                    Some(SessionCommand::Close) | None => break,
                    Some(cmd) => actor.handle(cmd),
                },
            }
        }
        actor.stop_timer();
        tracing::debug!("visualization session closed");
    });

    (cmd_tx, view_rx)
}
