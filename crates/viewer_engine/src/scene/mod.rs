//! Scene types: GPU-resident models and their materials.

pub mod model;

pub use model::{Material, Mesh, Model, ModelError, TextureCache, Vertex};
