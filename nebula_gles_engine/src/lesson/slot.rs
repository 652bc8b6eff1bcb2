/// Shared resource slot - the write-once publish point of the handoff protocol

use std::sync::{Arc, OnceLock};

use crate::error::{Error, Result};

/// Write-once hand-off slot between the background loader and the render
/// thread
///
/// The loader publishes exactly once, after a full device-side
/// synchronization of everything that produced the value; the render thread
/// polls non-blockingly every frame. `OnceLock` provides the
/// release/acquire ordering, so a reader that observes the slot as ready is
/// guaranteed to see the fully initialized value — the GPU-side guarantee
/// comes from the `finish()` the loader issues before publishing.
///
/// Readiness is monotonic: once `is_ready()` returns true it stays true for
/// the slot's lifetime.
pub struct ResourceSlot<T> {
    cell: OnceLock<Arc<T>>,
}

impl<T> ResourceSlot<T> {
    /// Create an empty (not ready) slot
    pub fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Publish the finished resource group
    ///
    /// # Errors
    ///
    /// Returns an error if the slot was already published; each slot has
    /// exactly one writer and one publication.
    pub fn publish(&self, value: T) -> Result<()> {
        self.cell
            .set(Arc::new(value))
            .map_err(|_| Error::InvalidResource("resource slot published twice".to_string()))
    }

    /// Non-blocking read; None while the loader has not published yet
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }

    /// Whether the slot has been published
    pub fn is_ready(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Remove and return the published value, leaving the slot empty
    ///
    /// Used only during teardown to control release ordering.
    pub(crate) fn take(&mut self) -> Option<Arc<T>> {
        self.cell.take()
    }
}

impl<T> Default for ResourceSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod tests;
