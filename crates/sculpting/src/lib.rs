//! Carve-and-refine sculpting of winged-edge meshes.
//!
//! This crate provides local adaptive refinement under a spherical brush with:
//! - Optional displacement along the averaged surface normal
//! - Midpoint subdivision of edges longer than the brush detail allows
//! - Quality-improving edge flips and tangential smoothing
//! - Reversible action records grouped into undoable units
//!
//! # Architecture
//!
//! Every edit is recorded while it runs, so undo and redo replay stored state
//! instead of re-running the refinement.
//!
//! ## Key Components
//!
//! - **Brush**: Sphere, detail length and falloff
//! - **Refine**: Target set, subdivide, relax and smooth steps
//! - **Carve**: Passes of refinement followed by finalize
//! - **Action**: Reversible records, action units and the undo history
//! - **Pipeline**: Orchestrates carve → history → render upload

pub mod action;
pub mod brush;
pub mod carve;
pub mod pipeline;
pub mod refine;
pub mod render;

pub use action::{Action, ActionKind, ActionUnit, History};
pub use brush::{CarveBrush, FalloffCurve};
pub use carve::{Carve, CarveResult, CarveStats};
pub use pipeline::SculptingPipeline;
pub use render::{RecordingTarget, RenderTarget};
