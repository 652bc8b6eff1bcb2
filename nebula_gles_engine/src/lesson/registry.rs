/// Lesson registry - name to constructor table
///
/// The host picks which lesson runs by name; each entry constructs a fresh
/// lesson instance per run.

use rustc_hash::FxHashMap;

use crate::engine_bail;
use crate::error::Result;
use crate::lesson::async_load::AsyncLoadLesson;
use crate::lesson::lesson::Lesson;

/// Constructor for one lesson variant
pub type LessonFactory = Box<dyn Fn() -> Box<dyn Lesson> + Send + Sync>;

/// Registry of available lessons
pub struct LessonRegistry {
    factories: FxHashMap<String, LessonFactory>,
    /// Registration order, for stable listing
    order: Vec<String>,
}

impl LessonRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Registry pre-populated with the built-in lessons
    pub fn with_builtin_lessons() -> Result<Self> {
        let mut registry = Self::new();
        registry.register("async_load", || Box::new(AsyncLoadLesson::new()))?;
        Ok(registry)
    }

    /// Register a lesson under a unique name
    ///
    /// # Errors
    ///
    /// Returns an error if a lesson with the same name already exists.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn Lesson> + Send + Sync + 'static,
    {
        if self.factories.contains_key(name) {
            engine_bail!("nebula::LessonRegistry", "lesson '{}' already registered", name);
        }
        self.order.push(name.to_string());
        self.factories.insert(name.to_string(), Box::new(factory));
        Ok(())
    }

    /// Construct a fresh instance of the named lesson
    pub fn create(&self, name: &str) -> Result<Box<dyn Lesson>> {
        match self.factories.get(name) {
            Some(factory) => Ok(factory()),
            None => {
                engine_bail!("nebula::LessonRegistry", "no lesson named '{}'", name);
            }
        }
    }

    /// Whether a lesson with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered lesson names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|name| name.as_str()).collect()
    }

    /// Number of registered lessons
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for LessonRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
