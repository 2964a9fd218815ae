//! Renderer-facing data
//!
//! The crate does not own a GPU device. It produces instance data in a
//! `wgpu`-compatible layout and leaves pipelines and buffers to the host.

pub mod instance;
pub mod scene;

pub use instance::InstanceRaw;
pub use scene::{DrawRange, InstanceBuffer};
