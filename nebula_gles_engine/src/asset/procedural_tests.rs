//! Unit tests for the procedural asset provider

use crate::asset::model::AssetProvider;
use crate::asset::procedural::{ProceduralAssets, FIGURE_MODEL};
use crate::graphics_device::PixelFormat;

// ============================================================================
// MODEL TESTS
// ============================================================================

#[test]
fn test_figure_model_is_well_formed() {
    let assets = ProceduralAssets::new();
    let model = assets.load_model(FIGURE_MODEL).unwrap();

    assert!(!model.vertices.is_empty());
    assert!(!model.indices.is_empty());
    assert!(model.materials.len() >= 2);

    // Material runs partition the index array exactly
    let run_total: u32 = model.materials.iter().map(|m| m.index_count).sum();
    assert_eq!(run_total, model.index_count());

    // Every index points at a real vertex
    let vertex_count = model.vertices.len() as u16;
    assert!(model.indices.iter().all(|&i| i < vertex_count));
}

#[test]
fn test_figure_model_mixes_textured_and_flat_materials() {
    let assets = ProceduralAssets::new();
    let model = assets.load_model(FIGURE_MODEL).unwrap();

    let textured = model
        .materials
        .iter()
        .filter(|m| m.diffuse_texture.is_some())
        .count();
    let flat = model
        .materials
        .iter()
        .filter(|m| m.diffuse_texture.is_none())
        .count();

    // The flat-color fallback path needs at least one of each
    assert!(textured >= 1);
    assert!(flat >= 1);

    // Flat materials must carry nonzero alpha: the shader's selector treats
    // zero alpha as "use the texture"
    for material in &model.materials {
        assert!(material.diffuse[3] > 0.0, "material '{}' has zero alpha", material.name);
    }
}

#[test]
fn test_figure_model_bounds_are_sane() {
    let assets = ProceduralAssets::new();
    let model = assets.load_model(FIGURE_MODEL).unwrap();
    let bounds = model.bounding_box();

    assert!(bounds.min.y < bounds.max.y);
    assert!(bounds.min.z < 0.0);
    assert!(bounds.max.z > 0.0);
}

#[test]
fn test_unknown_model_fails() {
    let assets = ProceduralAssets::new();
    assert!(assets.load_model("missing").is_err());
}

// ============================================================================
// TEXTURE TESTS
// ============================================================================

#[test]
fn test_referenced_textures_load() {
    let assets = ProceduralAssets::new();
    let model = assets.load_model(FIGURE_MODEL).unwrap();

    for name in model.texture_names() {
        let pixels = assets.load_texture_pixels(name).unwrap();
        assert_eq!(pixels.format, PixelFormat::Rgba8);
        let expected = (pixels.width * pixels.height * 4) as usize;
        assert_eq!(pixels.pixels.len(), expected);
    }
}

#[test]
fn test_unknown_texture_fails() {
    let assets = ProceduralAssets::new();
    assert!(assets.load_texture_pixels("missing").is_err());
}

#[test]
fn test_checkerboard_has_two_colors() {
    let assets = ProceduralAssets::new();
    let pixels = assets.load_texture_pixels("checker_hull").unwrap();

    let first = &pixels.pixels[0..4];
    let mut found_other = false;
    for chunk in pixels.pixels.chunks_exact(4) {
        if chunk != first {
            found_other = true;
            break;
        }
    }
    assert!(found_other);
}
