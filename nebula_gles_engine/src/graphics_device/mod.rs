/// Graphics device module - all device-related types and traits

// Module declarations
pub mod graphics_device;
pub mod handle;
pub mod descriptor;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use handle::*;
pub use descriptor::*;

// Headless graphics device (no GPU required); used by tests and the demo
#[cfg(feature = "headless")]
pub mod headless;
#[cfg(feature = "headless")]
pub use headless::HeadlessGraphicsDevice;
