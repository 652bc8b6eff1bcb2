//! Unit tests for the Engine facade
//!
//! Tests initialization, shutdown, and logger management.
//!
//! IMPORTANT: the logger is process-global and other tests log through it
//! concurrently; counting loggers filter on a test-private source string,
//! and tests that replace the logger run with #[serial].

use std::sync::{Arc, Mutex};
use serial_test::serial;

use crate::engine::Engine;
use crate::log::{LogEntry, LogSeverity, Logger};

struct CountingLogger {
    source: &'static str,
    count: Arc<Mutex<usize>>,
}

impl Logger for CountingLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source == self.source {
            *self.count.lock().unwrap() += 1;
        }
    }
}

// ============================================================================
// INITIALIZATION AND SHUTDOWN TESTS
// ============================================================================

#[test]
fn test_engine_initialize_is_idempotent() {
    Engine::initialize().unwrap();
    Engine::initialize().unwrap();
    Engine::initialize().unwrap();
}

#[test]
#[serial]
fn test_shutdown_restores_default_logger() {
    let count = Arc::new(Mutex::new(0));
    Engine::set_logger(CountingLogger {
        source: "nebula::test::shutdown",
        count: count.clone(),
    });

    Engine::log(LogSeverity::Info, "nebula::test::shutdown", "one".to_string());
    assert_eq!(*count.lock().unwrap(), 1);

    Engine::shutdown();

    // The counting logger is gone; further logs go to the default logger
    Engine::log(LogSeverity::Info, "nebula::test::shutdown", "two".to_string());
    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
#[serial]
fn test_set_logger_replaces_previous() {
    let first = Arc::new(Mutex::new(0));
    let second = Arc::new(Mutex::new(0));

    Engine::set_logger(CountingLogger {
        source: "nebula::test::replace",
        count: first.clone(),
    });
    Engine::set_logger(CountingLogger {
        source: "nebula::test::replace",
        count: second.clone(),
    });

    Engine::log(LogSeverity::Info, "nebula::test::replace", "msg".to_string());

    assert_eq!(*first.lock().unwrap(), 0);
    assert_eq!(*second.lock().unwrap(), 1);

    Engine::reset_logger();
}
