//! # Viewer Engine
//!
//! A real-time 3D model viewer built on Vulkan.
//!
//! ## Features
//!
//! - **Vulkan Rendering**: forward-rendered, depth-tested, mipmapped textures
//! - **OBJ Import**: meshes, MTL materials, and texture maps via `tobj`
//! - **Orbit Camera**: drag to rotate, scroll to scale the model
//! - **RAII Resources**: every GPU object cleans itself up in drop order
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use viewer_engine::{ViewerApp, ViewerConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     viewer_engine::foundation::logging::init();
//!     let config = ViewerConfig::new("assets/model.obj");
//!     ViewerApp::new(config)?.run()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod application;
pub mod assets;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod window;

pub use application::{AppError, ViewerApp, ViewerConfig};
pub use render::{Camera, FrameStatus, OrbitController, Renderer};
pub use scene::{Model, Vertex};
pub use window::Window;
