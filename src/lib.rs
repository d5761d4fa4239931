//! Flappy Pug - simulation core for a side-scrolling pipe-dodging game
//!
//! Core modules:
//! - `sim`: Fixed-timestep simulation (physics, pipes, scoring, session)
//! - `config`: Data-driven world dimensions and physics constants
//! - `snapshot`: Read-only render boundary for external renderers
//! - `error`: Typed errors for config loading

pub mod config;
pub mod error;
pub mod sim;
pub mod snapshot;

pub use config::GameConfig;
pub use error::ConfigError;
pub use snapshot::{EntityView, RenderSnapshot};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one update per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default screen dimensions (portrait phone)
    pub const DEFAULT_WIDTH: f32 = 400.0;
    pub const DEFAULT_HEIGHT: f32 = 800.0;

    /// Vertical clearance between the two pipes of a pair
    pub const GAP_SIZE: f32 = 200.0;
    /// Width of a pipe shaft
    pub const PIPE_WIDTH: f32 = 100.0;
    /// Smallest height a generated pipe segment may have
    pub const MIN_SEGMENT_HEIGHT: f32 = 100.0;

    /// Pipe cap is wider than the shaft by this much
    pub const PIPE_CAP_MARGIN: f32 = 20.0;
    /// Pipe cap height / width (cap artwork is 205x95)
    pub const PIPE_CAP_ASPECT: f32 = 95.0 / 205.0;

    /// Player body
    pub const PUG_WIDTH: f32 = 50.0;
    pub const PUG_HEIGHT: f32 = 41.0;

    /// Ground strip height
    pub const GROUND_HEIGHT: f32 = 50.0;
    /// Ground segments overlap by this much to hide the seam
    pub const GROUND_OVERLAP: f32 = 4.0;

    /// Gravity once the run has started (pixels/s²)
    pub const GRAVITY: f32 = 1200.0;
    /// Vertical velocity set by a flap (pixels/s, negative is up)
    pub const FLAP_VELOCITY: f32 = -420.0;
    /// Horizontal scroll per frame (pixels)
    pub const SCROLL_SPEED: f32 = 2.0;

    /// Frames between pose changes
    pub const POSE_FRAMES: u64 = 5;
    /// Number of flap poses
    pub const POSE_COUNT: u8 = 3;
}
