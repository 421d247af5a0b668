//! Glint engine crate.
//!
//! A small WebGL-flavoured drawing layer over wgpu: a GL-style [`gl::Context`]
//! with pluggable backends, the resource helpers built on it ([`buffer`],
//! [`shader`], [`binding`]), matrix helpers ([`transform`]), canned
//! [`scene`]s and the [`render_loop`] that animates them. [`host`] puts a
//! scene in a window using the platform pieces ([`window`], [`device`],
//! [`core`], [`time`]).

pub mod gl;

pub mod binding;
pub mod buffer;
pub mod shader;
pub mod transform;

pub mod render_loop;
pub mod scene;

pub mod core;
pub mod device;
pub mod host;
pub mod logging;
pub mod time;
pub mod window;
