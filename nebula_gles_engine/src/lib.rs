/*!
# Nebula GLES Engine

Core traits and types for the Nebula OpenGL ES 2.0 lesson engine.

This crate provides the platform-agnostic API for a small rendering-lesson
framework whose centerpiece is asynchronous GPU resource loading: a
background worker prepares shaders, buffers, render targets and textures on
a second shared context while the render thread keeps drawing, and finished
resource groups are handed over through write-once shared slots.

## Architecture

- **GraphicsDevice**: OpenGL ES 2.0-shaped device trait (factory, state,
  draw, sync, validity). Backend implementations (glow, headless) provide
  concrete types.
- **GpuObject**: RAII owner of one GPU-side object
- **ResourceDescriptorSet**: declarative plan consumed by the loader
- **BackgroundLoader / ResourceSlot / RenderDispatcher / LifecycleController**:
  the load-and-handoff protocol
- **Lesson / LessonRegistry**: host-facing lifecycle surface

Backend implementations provide concrete types that implement these traits.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod asset;
pub mod lesson;

// Main nebula namespace module
pub mod nebula {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine facade
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are crate-level
    }

    // Device sub-module with all graphics device types
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Asset sub-module
    pub mod asset {
        pub use crate::asset::*;
    }

    // Lesson sub-module
    pub mod lesson {
        pub use crate::lesson::*;
    }
}

// Convenience re-exports at crate root (backend crates import these directly)
pub use crate::error::{Error, Result};
pub use crate::graphics_device::GraphicsDevice;

// Re-export math library at crate root
pub use glam;
