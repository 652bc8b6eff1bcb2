//! Asset collaborators
//!
//! Model and texture sources consumed by the background loader. File-format
//! parsing stays behind the `AssetProvider` seam; the engine only sees
//! in-memory vertex/index/material arrays and raw pixel data.

pub mod model;
pub mod procedural;

pub use model::{
    Aabb, AssetProvider, Material, ModelData, ModelVertex, TexturePixels,
};
pub use procedural::ProceduralAssets;
