/// Lifecycle controller - owns the session and the loader thread
///
/// Guarantees the two teardown-ordering invariants of the handoff protocol:
/// teardown never runs concurrently with an in-flight loader (cancel, then
/// blocking join), and GPU objects are released in reverse-acquisition
/// order after the loader has quiesced.

use std::sync::Arc;
use std::thread::JoinHandle;

use crate::{engine_error, engine_warn};
use crate::error::{Error, Result};
use crate::asset::AssetProvider;
use crate::graphics_device::{GraphicsDevice, ResourceDescriptorSet};
use crate::lesson::loader::BackgroundLoader;
use crate::lesson::session::LessonSession;

const SOURCE: &str = "nebula::LifecycleController";

/// Controller for one lesson run: fresh session in, everything released out
pub struct LifecycleController {
    session: Arc<LessonSession>,
    worker: Option<JoinHandle<()>>,
}

impl LifecycleController {
    /// Create a fresh session (every slot not ready) and start the
    /// background loader against the worker device
    pub fn start(
        worker_device: Arc<dyn GraphicsDevice>,
        assets: Arc<dyn AssetProvider>,
        descriptors: ResourceDescriptorSet,
    ) -> Result<Self> {
        let session = Arc::new(LessonSession::new());
        let worker =
            BackgroundLoader::spawn(worker_device, assets, descriptors, session.clone())?;
        Ok(Self {
            session,
            worker: Some(worker),
        })
    }

    /// The session shared with the loader and read by the dispatcher
    pub fn session(&self) -> &Arc<LessonSession> {
        &self.session
    }

    /// Tear the lesson down
    ///
    /// Requests cancellation, joins the loader (teardown must never race an
    /// in-flight load), then releases every published resource group in
    /// reverse-acquisition order. A loader panic is surfaced as an error
    /// after everything published before the panic has been released.
    pub fn teardown(mut self) -> Result<()> {
        self.session.request_cancel();

        let worker_panicked = match self.worker.take() {
            Some(worker) => worker.join().is_err(),
            None => false,
        };
        if worker_panicked {
            engine_error!(SOURCE, "background loader panicked; releasing published resources");
        }

        let session = std::mem::replace(&mut self.session, Arc::new(LessonSession::new()));
        match Arc::try_unwrap(session) {
            Ok(session) => session.release(),
            Err(shared) => {
                // A clone escaped (dispatcher bug); release through the
                // shared drop instead of the ordered path.
                engine_warn!(SOURCE, "lesson session still shared at teardown");
                drop(shared);
            }
        }

        if worker_panicked {
            return Err(Error::BackendError(
                "background loader thread panicked".to_string(),
            ));
        }
        Ok(())
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        // Teardown was skipped: still honor join-before-free
        if let Some(worker) = self.worker.take() {
            self.session.request_cancel();
            if worker.join().is_err() {
                engine_error!(SOURCE, "background loader panicked during drop");
            }
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
