//! Trajectory model and per-frame animation sampling for selected launches.

pub mod activation;
pub mod animation;
pub mod path;

pub use activation::ActivationTracker;
pub use animation::{
    globe_coords, label_scale, progress, ExhaustFlicker, FrameSampler, FrameState, Speed, Vec3,
};
pub use path::{build_paths, date_seed, destination, GeoInterpolator, Hsla, TrajectoryPath};
