/// Built-in procedural asset provider
///
/// Generates a small figure model and checkerboard textures in memory, so
/// lessons, tests and the demo run without any asset files on disk. One
/// material is deliberately untextured to exercise the flat-color fallback
/// path in the dispatcher.

use glam::Vec3;

use crate::engine_bail;
use crate::error::Result;
use crate::graphics_device::PixelFormat;
use crate::asset::model::{AssetProvider, Material, ModelData, ModelVertex, TexturePixels};

/// Asset name of the built-in figure model
pub const FIGURE_MODEL: &str = "figure";

const HULL_TEXTURE: &str = "checker_hull";
const VISOR_TEXTURE: &str = "checker_visor";

/// Procedural asset provider
pub struct ProceduralAssets;

impl ProceduralAssets {
    pub fn new() -> Self {
        Self
    }

    /// Build the figure: hull (body + head), visor, and untextured fins
    fn build_figure() -> ModelData {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        let mut materials = Vec::new();

        // Material runs must stay contiguous in the index array
        let mut count = 0;
        count += push_box(&mut vertices, &mut indices, Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.6, 1.0, 0.4));
        count += push_box(&mut vertices, &mut indices, Vec3::new(0.0, 2.4, 0.0), Vec3::new(0.4, 0.4, 0.4));
        materials.push(Material {
            name: "hull".to_string(),
            diffuse: [0.9, 0.5, 0.1, 1.0],
            index_count: count,
            diffuse_texture: Some(HULL_TEXTURE.to_string()),
        });

        let count = push_box(
            &mut vertices,
            &mut indices,
            Vec3::new(0.0, 2.4, 0.45),
            Vec3::new(0.25, 0.15, 0.05),
        );
        materials.push(Material {
            name: "visor".to_string(),
            diffuse: [0.2, 0.4, 0.9, 1.0],
            index_count: count,
            diffuse_texture: Some(VISOR_TEXTURE.to_string()),
        });

        let mut count = 0;
        count += push_box(&mut vertices, &mut indices, Vec3::new(-0.8, 0.25, 0.0), Vec3::new(0.2, 0.25, 0.3));
        count += push_box(&mut vertices, &mut indices, Vec3::new(0.8, 0.25, 0.0), Vec3::new(0.2, 0.25, 0.3));
        materials.push(Material {
            name: "fins".to_string(),
            diffuse: [0.3, 0.3, 0.35, 1.0],
            index_count: count,
            diffuse_texture: None,
        });

        ModelData {
            vertices,
            indices,
            materials,
        }
    }
}

impl Default for ProceduralAssets {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetProvider for ProceduralAssets {
    fn load_model(&self, name: &str) -> Result<ModelData> {
        if name != FIGURE_MODEL {
            engine_bail!("nebula::ProceduralAssets", "unknown model asset '{}'", name);
        }
        Ok(Self::build_figure())
    }

    fn load_texture_pixels(&self, name: &str) -> Result<TexturePixels> {
        match name {
            HULL_TEXTURE => Ok(checkerboard(64, 64, 8, [230, 128, 26, 255], [245, 245, 240, 255])),
            VISOR_TEXTURE => Ok(checkerboard(32, 32, 4, [51, 102, 230, 255], [240, 248, 255, 255])),
            _ => {
                engine_bail!("nebula::ProceduralAssets", "unknown texture asset '{}'", name);
            }
        }
    }
}

/// Append one axis-aligned box (24 vertices, 36 indices); returns the number
/// of indices added
fn push_box(
    vertices: &mut Vec<ModelVertex>,
    indices: &mut Vec<u16>,
    center: Vec3,
    half: Vec3,
) -> u32 {
    // One quad per face: normal, then the four corners counter-clockwise
    // as seen from outside
    const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // +X
        ([1.0, 0.0, 0.0], [[1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]]),
        // -X
        ([-1.0, 0.0, 0.0], [[-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0]]),
        // +Y
        ([0.0, 1.0, 0.0], [[-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
        // -Y
        ([0.0, -1.0, 0.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [-1.0, -1.0, -1.0]]),
        // +Z
        ([0.0, 0.0, 1.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
        // -Z
        ([0.0, 0.0, -1.0], [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]]),
    ];
    const CORNER_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut added = 0;
    for (normal, corners) in FACES {
        let base = vertices.len() as u16;
        for (corner, uv) in corners.iter().zip(CORNER_UVS) {
            let position = center + half * Vec3::from_array(*corner);
            vertices.push(ModelVertex {
                position: position.to_array(),
                normal,
                uv,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        added += 6;
    }
    added
}

/// Generate checkerboard RGBA pixels
fn checkerboard(width: u32, height: u32, cell: u32, even: [u8; 4], odd: [u8; 4]) -> TexturePixels {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let color = if ((x / cell) + (y / cell)) % 2 == 0 {
                even
            } else {
                odd
            };
            pixels.extend_from_slice(&color);
        }
    }
    TexturePixels {
        width,
        height,
        format: PixelFormat::Rgba8,
        pixels,
    }
}

#[cfg(test)]
#[path = "procedural_tests.rs"]
mod tests;
