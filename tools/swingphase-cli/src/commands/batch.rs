//! Analyze many landmark streams concurrently.
//!
//! Each file gets its own task. Frames are streamed through a bounded channel
//! into the task that owns the session, and every finished report is sent
//! back to the host, which is the only owner of the [`SessionRegistry`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use swingphase_common::clock::AnalysisClock;
use swingphase_common::config::AppConfig;
use swingphase_engine::SwingSession;
use swingphase_pose_model::{FrameRecord, HandType, SessionReport};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::{load_frames, orient};

/// Frames buffered between a reader and its session.
const FRAME_CHANNEL_CAPACITY: usize = 64;

/// Results of finished sessions, keyed by task id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    reports: BTreeMap<String, SessionReport>,
}

impl SessionRegistry {
    /// Store a report. A second report for the same task replaces the first.
    pub fn insert(&mut self, report: SessionReport) {
        if let Some(previous) = self.reports.insert(report.task_id.clone(), report) {
            warn!(task_id = %previous.task_id, "task reported twice, keeping the latest");
        }
    }

    pub fn get(&self, task_id: &str) -> Option<&SessionReport> {
        self.reports.get(task_id)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Number of sessions that produced a step map.
    pub fn completed(&self) -> usize {
        self.reports.values().filter(|r| r.is_completed()).count()
    }

    /// Reports ordered by task id.
    pub fn reports(&self) -> impl Iterator<Item = &SessionReport> {
        self.reports.values()
    }
}

pub async fn run(
    paths: Vec<PathBuf>,
    hand: HandType,
    config: AppConfig,
    timeout_secs: u64,
) -> anyhow::Result<()> {
    let clock = AnalysisClock::start();
    let registry = process(paths, hand, config, Duration::from_secs(timeout_secs)).await;

    for report in registry.reports() {
        println!("{}", serde_json::to_string(report)?);
    }

    let failed = registry.len() - registry.completed();
    info!(
        sessions = registry.len(),
        completed = registry.completed(),
        failed,
        started_at = clock.epoch_wall(),
        elapsed_secs = clock.elapsed_secs(),
        "batch finished"
    );

    if failed > 0 {
        anyhow::bail!("{failed} of {} session(s) failed", registry.len());
    }
    Ok(())
}

/// Run one session per path and gather every report.
pub async fn process(
    paths: Vec<PathBuf>,
    hand: HandType,
    config: AppConfig,
    limit: Duration,
) -> SessionRegistry {
    let config = Arc::new(config);
    let (report_tx, mut report_rx) = mpsc::channel::<SessionReport>(paths.len().max(1));
    let mut join_set = JoinSet::new();
    let mut seen = BTreeSet::new();

    for path in paths {
        let task_id = path.display().to_string();
        if !seen.insert(task_id.clone()) {
            warn!(%task_id, "duplicate input skipped");
            continue;
        }

        let config = config.clone();
        let report_tx = report_tx.clone();
        join_set.spawn(async move {
            let report = analyze_file(task_id, path, hand, &config, limit).await;
            let _ = report_tx.send(report).await;
        });
    }
    drop(report_tx);

    let mut registry = SessionRegistry::default();
    while let Some(report) = report_rx.recv().await {
        debug!(task_id = %report.task_id, "report received");
        registry.insert(report);
    }

    while let Some(result) = join_set.join_next().await {
        if let Err(e) = result {
            warn!(error = %e, "batch task panicked");
        }
    }

    registry
}

async fn analyze_file(
    task_id: String,
    path: PathBuf,
    hand: HandType,
    config: &AppConfig,
    limit: Duration,
) -> SessionReport {
    let mut config = config.clone();
    let frames = match tokio::task::spawn_blocking(move || load_frames(&path)).await {
        Ok(Ok(frames)) => orient(frames, hand, &mut config),
        Ok(Err(e)) => return SessionReport::failed(task_id, hand, e.to_string()),
        Err(e) => return SessionReport::failed(task_id, hand, format!("Reader failed: {e}")),
    };

    let session = match SwingSession::new(&config) {
        Ok(session) => session,
        Err(e) => return SessionReport::failed(task_id, hand, e.to_string()),
    };

    let (frame_tx, frame_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
    tokio::spawn(feed(frames, frame_tx));

    supervise(session, frame_rx, limit, task_id, hand).await
}

/// Drive `session` from `frames`, aborting it if `limit` passes first.
async fn supervise(
    mut session: SwingSession,
    frames: mpsc::Receiver<FrameRecord>,
    limit: Duration,
    task_id: String,
    hand: HandType,
) -> SessionReport {
    if tokio::time::timeout(limit, drive(&mut session, frames))
        .await
        .is_err()
    {
        warn!(%task_id, limit_secs = limit.as_secs_f64(), "session timed out");
        session.abort(format!("timed out after {:.1}s", limit.as_secs_f64()));
    }

    session.report(task_id, hand)
}

async fn feed(frames: Vec<FrameRecord>, frame_tx: mpsc::Sender<FrameRecord>) {
    for record in frames {
        // The session hung up: it is terminal or was aborted.
        if frame_tx.send(record).await.is_err() {
            break;
        }
    }
}

async fn drive(session: &mut SwingSession, mut frames: mpsc::Receiver<FrameRecord>) {
    while let Some(record) = frames.recv().await {
        if session.push_frame(&record).is_terminal() {
            return;
        }
    }
    session.finish();
}
