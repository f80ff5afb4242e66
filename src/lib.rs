//! rigfix
//!
//! Normalizes imported humanoid armatures (MMD, source engine, Mixamo, DAZ,
//! VRM and similar exports) into one canonical skeleton with consolidated
//! vertex weights.

pub mod error;
pub mod fix;
pub mod logging;
pub mod project;
pub mod rules;
pub mod scene;

pub use error::FixError;
pub use fix::{FixOptions, FixOutcome, FixReport, check_preconditions, fix_armature};
pub use logging::{ConsoleSink, LogLevel, MemorySink, MessageSink, init_logging};
pub use scene::{Armature, BoneId, Mesh, Scene};
