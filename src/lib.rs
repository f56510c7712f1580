#![forbid(unsafe_code)]

//! Declarative layered video composition compiled to FFmpeg filter-graph
//! programs.
//!
//! Describe a composition (a main stream, optional lead-in/lead-out
//! clips, and independently positioned/timed overlays with chroma-key,
//! scaling and opacity) through [`CompositionBuilder`], then let
//! [`compile`] turn it into the `-filter_complex` text an external
//! execution backend runs. The crate never touches pixels or spawns
//! processes itself; [`TransformExecutor`] is the seam where a backend
//! plugs in.

pub mod builder;
pub mod compile;
pub mod error;
pub mod executor;
pub mod model;
pub mod position;
pub mod size;

pub use builder::{CompositionBuilder, ValidationReport};
pub use compile::compile;
pub use error::{FramestackError, FramestackResult};
pub use executor::{TransformExecutor, TransformRequest};
pub use model::{
    ChromaKey, CompiledProgram, CompositionState, MediaClip, OutputOptions, OverlayOptions,
    OverlaySpec,
};
pub use position::Position;
pub use size::{Axis, SizeSpec};
