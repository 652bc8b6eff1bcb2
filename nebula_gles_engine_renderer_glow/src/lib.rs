/*!
# Nebula GLES Engine - glow backend

OpenGL ES 2.0 implementation of the engine's `GraphicsDevice` trait over
[glow]. The host creates the GL contexts (window context plus a share
context for the background loader) and wraps each in one
`GlowGraphicsDevice`.

[glow]: https://docs.rs/glow
*/

// Internal modules
mod convert;
mod glow_graphics_device;

// Main nebula namespace module
pub mod nebula {
    pub use crate::glow_graphics_device::GlowGraphicsDevice;
}

// Convenience re-export at crate root
pub use glow_graphics_device::GlowGraphicsDevice;
