/// Model data types and the asset collaborator trait

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::error::Result;
use crate::graphics_device::PixelFormat;

// ============================================================================
// Vertex and material data
// ============================================================================

/// One model vertex: position, normal, UV (interleaved, tightly packed)
///
/// This is the exact byte layout uploaded to the vertex buffer; attribute
/// offsets in the draw code are derived from the field order here.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl ModelVertex {
    /// Stride of one vertex in bytes
    pub const STRIDE: i32 = std::mem::size_of::<ModelVertex>() as i32;

    /// Byte offset of the position attribute
    pub const POSITION_OFFSET: i32 = 0;

    /// Byte offset of the normal attribute
    pub const NORMAL_OFFSET: i32 = 12;

    /// Byte offset of the UV attribute
    pub const UV_OFFSET: i32 = 24;
}

/// One material: a contiguous run of indices drawn with one diffuse source
///
/// Materials partition the index array: material 0 covers the first
/// `index_count` indices, material 1 the next run, and so on.
#[derive(Debug, Clone)]
pub struct Material {
    /// Material name (unique within the model)
    pub name: String,
    /// Diffuse color used when no texture is available; alpha must be
    /// nonzero so the shader's texture/color selector picks the color path
    pub diffuse: [f32; 4],
    /// Number of indices in this material's run
    pub index_count: u32,
    /// Texture asset name, or None for an untextured material
    pub diffuse_texture: Option<String>,
}

/// In-memory model: interleaved vertices, u16 indices, material runs
#[derive(Debug, Clone)]
pub struct ModelData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u16>,
    pub materials: Vec<Material>,
}

impl ModelData {
    /// Total index count across all materials
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Axis-aligned bounding box over all vertex positions
    ///
    /// Returns a degenerate box at the origin for an empty model.
    pub fn bounding_box(&self) -> Aabb {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for vertex in &self.vertices {
            let p = Vec3::from_array(vertex.position);
            min = min.min(p);
            max = max.max(p);
        }
        if self.vertices.is_empty() {
            return Aabb {
                min: Vec3::ZERO,
                max: Vec3::ZERO,
            };
        }
        Aabb { min, max }
    }

    /// Distinct texture names referenced by the materials, in first-use order
    pub fn texture_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for material in &self.materials {
            if let Some(name) = &material.diffuse_texture {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Box edge lengths
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

// ============================================================================
// Texture data
// ============================================================================

/// Decoded pixel data for one texture asset
#[derive(Debug, Clone)]
pub struct TexturePixels {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

// ============================================================================
// Asset collaborator trait
// ============================================================================

/// Synchronous source of model and texture assets
///
/// Implementations decode whatever storage format they like; the loader only
/// consumes the in-memory results. Shared with the background loader thread.
pub trait AssetProvider: Send + Sync {
    /// Load a model by asset name
    fn load_model(&self, name: &str) -> Result<ModelData>;

    /// Load decoded pixel data for a texture by asset name
    fn load_texture_pixels(&self, name: &str) -> Result<TexturePixels>;
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
