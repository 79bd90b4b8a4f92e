//! AlgoMentor 命令行入口
//!
//! 子命令：visualize（走查 + 讲解）、run（Judge0 执行）、plan（生成学习计划）、progress（更新已保存的计划）。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use algomentor::config::{load_config, AppConfig};
use algomentor::core::ShutdownManager;
use algomentor::execution::{
    CodeRunner, ExecutionOutcome, ExecutionRequest, Judge0Client, Language,
};
use algomentor::narration::create_narrator_from_config;
use algomentor::observability;
use algomentor::planner::{
    completion_date, generate_roadmap, parse_start_date, total_hours, RoadmapItem,
    StudyPlanRecord, StudyPlanStore, StudySession,
};
use algomentor::visualizer::{render_text, Scene, Step};
use algomentor::{spawn_session, SessionCommand, SessionView};

#[derive(Parser, Debug)]
#[command(name = "algomentor")]
#[command(about = "Step-by-step code walkthroughs with AI narration")]
#[command(version)]
struct Cli {
    /// 额外的配置文件（覆盖 config/default.toml）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Walk through a source file step by step
    Visualize(VisualizeArgs),
    /// Execute a source file through Judge0
    Run(RunArgs),
    /// Generate a day-by-day study plan for a course (or from a roadmap JSON file)
    Plan(PlanArgs),
    /// Show or update the saved study plan
    Progress(ProgressArgs),
}

#[derive(Args, Debug)]
struct VisualizeArgs {
    file: PathBuf,

    #[arg(short, long)]
    language: Option<String>,

    /// Advance automatically at the configured interval
    #[arg(long)]
    autoplay: bool,

    #[arg(long)]
    no_narration: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    file: PathBuf,

    #[arg(short, long)]
    language: Option<String>,

    /// Text passed to the program's standard input
    #[arg(long, default_value = "")]
    stdin: String,

    /// Visualize the code after a successful run
    #[arg(long)]
    visualize: bool,
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Roadmap JSON file; generated from --course and --level when omitted
    roadmap: Option<PathBuf>,

    /// First study day, YYYY-MM-DD
    #[arg(long)]
    start: String,

    #[arg(long)]
    hours: Option<u32>,

    #[arg(long, default_value = "Python Programming")]
    course: String,

    /// Beginner, Intermediate or Advanced
    #[arg(long, default_value = "Beginner")]
    level: String,

    /// Persist the plan to the configured plan file
    #[arg(long)]
    save: bool,
}

#[derive(Args, Debug)]
struct ProgressArgs {
    /// Mark a session complete by id
    #[arg(long)]
    complete: Vec<String>,

    /// Move a session one day later by id
    #[arg(long)]
    postpone: Vec<String>,

    /// Clear all completion marks
    #[arg(long)]
    reset: bool,

    /// Week to list (0-based, 7 sessions per week)
    #[arg(long, default_value = "0")]
    week: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    observability::init(cli.verbose);

    let cfg = load_config(cli.config.clone()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.install_signal_handlers();

    match cli.command {
        Commands::Visualize(args) => {
            let language = resolve_language(args.language.as_deref(), &cfg);
            let source = read_source(&args.file)?;
            visualize(&cfg, &source, language, args.autoplay, !args.no_narration, &shutdown)
                .await
        }
        Commands::Run(args) => run(&cfg, args, &shutdown).await,
        Commands::Plan(args) => plan(&cfg, args),
        Commands::Progress(args) => progress(&cfg, args),
    }
}

fn resolve_language(flag: Option<&str>, cfg: &AppConfig) -> Language {
    Language::from_name(flag.unwrap_or(&cfg.app.default_language))
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

async fn visualize(
    cfg: &AppConfig,
    source: &str,
    language: Language,
    autoplay: bool,
    narrate: bool,
    shutdown: &ShutdownManager,
) -> anyhow::Result<()> {
    let narrator = if narrate {
        create_narrator_from_config(&cfg.narration)
    } else {
        None
    };
    let narrate = narrator.is_some();
    tracing::info!(%language, autoplay, narrate, "starting walkthrough");

    let (cmd_tx, mut view_rx) = spawn_session(
        narrator,
        Duration::from_millis(cfg.playback.interval_ms),
        shutdown.token(),
    );
    cmd_tx
        .send(SessionCommand::Load {
            source: source.to_string(),
        })
        .context("Visualization session closed")?;

    let result = present(&cmd_tx, &mut view_rx, autoplay, narrate, shutdown.token()).await;
    let _ = cmd_tx.send(SessionCommand::Close);
    if shutdown.is_shutdown() {
        tracing::info!("walkthrough closed by shutdown signal");
    }
    result
}

/// 消费会话快照并逐步打印；手动模式在每步讲解就绪后发送 Step
async fn present(
    cmd_tx: &mpsc::UnboundedSender<SessionCommand>,
    view_rx: &mut watch::Receiver<SessionView>,
    autoplay: bool,
    narrate: bool,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let first = view_rx
        .wait_for(|v| v.generation > 0)
        .await
        .context("Visualization session ended unexpectedly")?
        .clone();
    let Some(category) = first.category else {
        println!("Nothing to visualize: the source has no non-blank lines.");
        return Ok(());
    };
    println!("{} ({} steps)", category.title(), first.total);
    println!("Tools: {}", category.tools().join(", "));
    println!();

    if autoplay {
        cmd_tx.send(SessionCommand::Play)?;
    }

    let mut shown: Option<usize> = None;
    let mut narrated = false;
    let mut stepped_from: Option<usize> = None;

    loop {
        let view = view_rx.borrow_and_update().clone();

        if view.cursor != shown {
            if let (Some(step), Some(cursor)) = (&view.step, view.cursor) {
                print_step(step, cursor, view.total);
            }
            shown = view.cursor;
            narrated = !narrate;
        }
        if !narrated {
            if let Some(text) = &view.narration {
                println!("  Narration: {text}");
                println!();
                narrated = true;
            }
        }

        if narrated {
            if view.cursor.map(|c| c + 1) == Some(view.total) {
                break;
            }
            if !autoplay && stepped_from != view.cursor {
                cmd_tx.send(SessionCommand::Step)?;
                stepped_from = view.cursor;
            }
        }

        tokio::select! {
            _ = shutdown.cancelled() => {
                println!("Walkthrough interrupted.");
                break;
            }
            changed = view_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn print_step(step: &Step, cursor: usize, total: usize) {
    println!(
        "Step {} of {} | line {}: {}",
        cursor + 1,
        total,
        step.line_number,
        step.highlighted_text
    );
    print!("{}", render_text(&Scene::from_step(step, cursor, total)));
}

async fn run(cfg: &AppConfig, args: RunArgs, shutdown: &ShutdownManager) -> anyhow::Result<()> {
    let api_key =
        std::env::var("RAPIDAPI_KEY").context("RAPIDAPI_KEY must be set to execute code")?;
    let language = resolve_language(args.language.as_deref(), cfg);
    let source = read_source(&args.file)?;

    let runner = Judge0Client::new(&cfg.execution, &api_key);
    let request = ExecutionRequest::new(source.clone(), language).with_stdin(args.stdin);
    let result = runner
        .run(&request)
        .await
        .context("Failed to execute code")?;
    let outcome = ExecutionOutcome::from_result(&result);

    println!("Status: {}", result.status.description);
    if let Some(time) = &result.time {
        println!("Time: {time}s");
    }
    if let Some(memory) = result.memory {
        println!("Memory: {memory} KB");
    }
    println!("{}", outcome.output_text());

    if args.visualize {
        if !outcome.is_accepted() {
            bail!("Run the code successfully before visualizing it");
        }
        println!();
        visualize(cfg, &source, language, false, true, shutdown).await?;
    }
    Ok(())
}

fn print_sessions(sessions: &[StudySession]) {
    for session in sessions {
        let mark = if session.completed { "x" } else { " " };
        println!(
            "  [{mark}] #{:<3} {}  {:<40} {}h",
            session.id,
            session.date.format("%a %b %d"),
            session.topic,
            session.duration
        );
    }
}

fn plan(cfg: &AppConfig, args: PlanArgs) -> anyhow::Result<()> {
    let roadmap = match &args.roadmap {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str::<Vec<RoadmapItem>>(&data)
                .context("Roadmap must be a JSON array of roadmap items")?
        }
        None => generate_roadmap(&args.course, &args.level),
    };
    let start = parse_start_date(&args.start)?;
    let hours = args.hours.unwrap_or(cfg.planner.daily_hours);

    let record = StudyPlanRecord::generate(args.course, args.level, roadmap, start, hours)?;
    println!("{} - {} level", record.course, record.level);
    print_sessions(&record.study_plan);
    println!(
        "Total: {} sessions, {} hours",
        record.study_plan.len(),
        total_hours(&record.study_plan)
    );
    if let Some(end) = completion_date(&record.study_plan) {
        println!("Estimated completion: {end}");
    }

    if args.save {
        let store = StudyPlanStore::new(&cfg.planner.plan_path);
        store.save(&record).context("Failed to save study plan")?;
        println!("Saved to {}", store.path().display());
    }
    Ok(())
}

fn progress(cfg: &AppConfig, args: ProgressArgs) -> anyhow::Result<()> {
    let store = StudyPlanStore::new(&cfg.planner.plan_path);
    let Some(mut record) = store.load().context("Failed to load study plan")? else {
        bail!(
            "No saved study plan at {}; run `algomentor plan --save` first",
            store.path().display()
        );
    };

    let mut changed = false;
    if args.reset {
        record.reset_progress();
        changed = true;
    }
    for id in &args.complete {
        if record.mark_completed(id) {
            changed = true;
        } else {
            tracing::warn!(id = %id, "no such session");
        }
    }
    for id in &args.postpone {
        match record.postpone(id) {
            Some(date) => {
                println!("Session #{id} postponed to {date}");
                changed = true;
            }
            None => tracing::warn!(id = %id, "no such session"),
        }
    }
    if changed {
        store.save(&record).context("Failed to save study plan")?;
    }

    let stats = record.stats();
    println!(
        "{} - {} level: {}/{} sessions complete ({}%)",
        record.course, record.level, stats.completed, stats.total, stats.percentage
    );
    println!("Week {}:", args.week.saturating_add(1));
    print_sessions(record.week(args.week));
    Ok(())
}
