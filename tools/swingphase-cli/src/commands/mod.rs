pub mod analyze;
pub mod batch;
pub mod init_config;
pub mod validate;

use std::path::Path;

use swingphase_common::config::AppConfig;
use swingphase_pose_model::{parse_frames, FrameRecord, HandType};

/// Read and parse a frames JSONL file.
pub fn load_frames(path: &Path) -> anyhow::Result<Vec<FrameRecord>> {
    let content = std::fs::read_to_string(path)
        .map_err(|_| anyhow::anyhow!("Frames file not found: {}", path.display()))?;
    parse_frames(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse frames in {}: {e}", path.display()))
}

/// Mirror left-handed input so the classifier always sees a right-handed
/// golfer. Index-addressed detections need the joint sides swapped as well.
pub fn orient(frames: Vec<FrameRecord>, hand: HandType, config: &mut AppConfig) -> Vec<FrameRecord> {
    match hand {
        HandType::Right => frames,
        HandType::Left => {
            config.joints = config.joints.mirrored();
            frames.iter().map(FrameRecord::mirrored).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swingphase_pose_model::Joint;

    #[test]
    fn test_right_hand_is_untouched() {
        let frames = load_frames(&fixture("swing-right.jsonl")).unwrap();
        let mut config = AppConfig::default();
        let oriented = orient(frames.clone(), HandType::Right, &mut config);
        assert_eq!(oriented, frames);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_left_hand_mirrors_frames_and_joints() {
        let frames = load_frames(&fixture("swing-left.jsonl")).unwrap();
        let mut config = AppConfig::default();
        let oriented = orient(frames, HandType::Left, &mut config);

        assert_eq!(config.joints.names[0], Joint::RightShoulder);
        assert_eq!(config.joints.indices[0], 11);
        assert!(oriented[12].landmarks.is_none());
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = load_frames(Path::new("/nonexistent/frames.jsonl")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    pub(crate) fn fixture(name: &str) -> std::path::PathBuf {
        std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("fixtures")
            .join(name)
    }
}
