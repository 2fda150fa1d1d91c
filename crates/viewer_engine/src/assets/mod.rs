//! Asset import: OBJ/MTL scenes and texture images.

pub mod image_loader;
pub mod importer;

pub use image_loader::{load_rgba8, DecodedImage};
pub use importer::{load_obj, AssetError, MaterialData, MeshData, SceneData};
