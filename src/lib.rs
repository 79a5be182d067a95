//! gridview
//!
//! A small cross-platform wgpu demo scene: a floor grid, a test cube and a
//! directional light, viewed through a perspective camera with mouse orbit
//! controls. Runs natively and in the browser via WASM. The crate exposes the
//! building blocks (camera, geometry, pipelines, context) so the demo can be
//! embedded or extended, plus a [`run`] entry point that opens a window and
//! drives the render loop until close.
//!
//! High-level modules
//! - `camera`: orbital camera, perspective projection and view uniforms
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `geometry`: CPU-side vertex data for the grid helper and the unit cube
//! - `layout`: room and furniture layout on a cell grid, with validation
//! - `risk`: earthquake-risk scoring for a layout
//! - `scene`: GPU scene contents (grid, boxes, directional light)
//! - `pipelines`: render pipeline construction (solid meshes, line lists)
//! - `app`: winit application handler and the per-frame render loop
//!

pub mod app;
pub mod camera;
pub mod context;
pub mod geometry;
pub mod layout;
pub mod pipelines;
pub mod risk;
pub mod scene;
pub mod texture;

pub use app::{run, run_with};

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
