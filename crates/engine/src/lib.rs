//! SwingPhase Engine: swing-phase detection
//!
//! Turns a stream of per-frame joint coordinates into the frame index at which
//! each golf swing phase begins:
//! - **Buffer:** Per-joint landmark history with hold-last gap filling
//! - **Smoothing:** Velocity-aware EMA applied to freshly buffered samples
//! - **Classifier:** Nine-state phase machine driven by geometric predicates
//! - **Session:** Per-video orchestration and result reporting
//!
//! This crate is pure computation: no I/O, no threads, no locks.
//! One [`SwingSession`] is driven by one caller, in frame order.

pub mod buffer;
pub mod classifier;
pub mod geometry;
pub mod session;
pub mod smooth;

pub use buffer::{AppendSlot, CurrentFrameLandmarks, LandmarkBuffer, LandmarkSample};
pub use classifier::{PhaseClassifier, StepEffect};
pub use session::SwingSession;
pub use smooth::AdaptiveSmoother;
