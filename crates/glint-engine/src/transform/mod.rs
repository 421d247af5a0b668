//! Projection, view and model matrices, and the per-frame spin.
//!
//! Matrices are column-major `glam::Mat4`; "index n" below means
//! `to_cols_array()[n]`, which is also the order uploaded to shaders.

mod matrix;
mod spin;

pub use matrix::{build_projection, build_view, build_view_at, rotate_z, DEFAULT_VIEW_DISTANCE};
pub use spin::{Spin, DEFAULT_ANGULAR_RATE};
