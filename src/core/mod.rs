//! Platform-agnostic core - shared between the WASM page and the CLI

pub mod animator;
pub mod config;
pub mod field;
pub mod surface;

pub use animator::{Animator, FrameScheduler, LoopState};
pub use config::FieldConfig;
pub use field::{FrameStats, Node, ParticleField};
pub use surface::{DrawCommand, Point, RecordingSurface, Rgba, Surface};
