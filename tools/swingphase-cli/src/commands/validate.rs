//! Validate a landmark stream before analysis.

use std::collections::BTreeSet;
use std::path::PathBuf;

use swingphase_common::config::AppConfig;
use swingphase_pose_model::FrameRecord;

use super::load_frames;

/// Problems found in a frame stream, one message each.
pub fn check(frames: &[FrameRecord], config: &AppConfig) -> Vec<String> {
    let mut issues = Vec::new();

    if let Err(e) = config.joints.validate() {
        issues.push(e.to_string());
        return issues;
    }

    for (expected, record) in frames.iter().enumerate() {
        if record.frame != expected {
            issues.push(format!(
                "frame indices are not dense: expected {expected}, found {}",
                record.frame
            ));
            break;
        }
    }

    for record in frames {
        if record.width == 0 || record.height == 0 {
            issues.push(format!("frame {}: zero frame size", record.frame));
        }
        if let Some(detection) = &record.landmarks {
            if let Err(e) = detection.select(&config.joints, record.frame) {
                issues.push(e.to_string());
            }
        }
    }

    issues
}

pub fn run(path: PathBuf, config: &AppConfig) -> anyhow::Result<()> {
    println!("Validating frames at: {}", path.display());

    let frames = load_frames(&path)?;

    let sizes: BTreeSet<(u32, u32)> = frames.iter().map(|f| (f.width, f.height)).collect();
    let none_frames: Vec<usize> = frames
        .iter()
        .filter(|f| !f.has_detection())
        .map(|f| f.frame)
        .collect();

    println!("  Frames: {}", frames.len());
    for (width, height) in &sizes {
        println!("  Resolution: {width}x{height}");
    }
    if none_frames.is_empty() {
        println!("  Detections: present in every frame");
    } else {
        println!(
            "  Detections: missing in {} frame(s) {:?}",
            none_frames.len(),
            none_frames
        );
    }

    let issues = check(&frames, config);
    if issues.is_empty() {
        println!("\nFrames are valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!("\n{} issue(s) found. Analysis may fail.", issues.len());
    }

    Ok(())
}
