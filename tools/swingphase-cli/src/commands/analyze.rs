//! Detect swing phases in a single landmark stream.

use std::path::PathBuf;

use swingphase_common::config::AppConfig;
use swingphase_engine::SwingSession;
use swingphase_pose_model::{FrameRecord, HandType, SessionReport, SessionStatus};
use tracing::info;

use super::{load_frames, orient};

pub fn run(
    path: PathBuf,
    hand: HandType,
    mut config: AppConfig,
    fps: Option<u32>,
    pretty: bool,
    include_pose: bool,
) -> anyhow::Result<()> {
    if let Some(fps) = fps {
        config.session.fps = fps;
    }

    let frames = load_frames(&path)?;
    let frames = orient(frames, hand, &mut config);
    info!(path = %path.display(), frames = frames.len(), %hand, "analyzing");

    let report = analyze(
        &frames,
        path.display().to_string(),
        hand,
        &config,
        include_pose,
    )?;

    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    if let SessionStatus::Error { message } = &report.status {
        anyhow::bail!("Analysis failed: {message}");
    }
    Ok(())
}

/// Run one session over already oriented frames.
///
/// With `include_pose` the report also carries the buffered landmark
/// trajectories.
pub fn analyze(
    frames: &[FrameRecord],
    task_id: String,
    hand: HandType,
    config: &AppConfig,
    include_pose: bool,
) -> anyhow::Result<SessionReport> {
    let mut session = SwingSession::new(config)
        .map_err(|e| anyhow::anyhow!("Failed to start session: {e}"))?;

    for record in frames {
        if session.push_frame(record).is_terminal() {
            break;
        }
    }
    session.finish();

    Ok(if include_pose {
        session.report_with_pose(task_id, hand)
    } else {
        session.report(task_id, hand)
    })
}
