use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::animations::Easing;
use crate::errors::{Error, UnknownEasingSnafu};

/// A shareable easing curve: maps a normalized time (0 - 1) to a normalized value.
pub type EasingFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Named collection of easing functions.
///
/// The default registry knows every built-in [`Easing`] under its canonical name
/// (`"linear"`, `"easeInOutCubic"`, ...). Custom curves can be added with [`EasingRegistry::register()`].
///
/// # Example
/// ```
/// use tempo::animations::EasingRegistry;
///
/// let registry = EasingRegistry::default().register("step", |t| if t < 0.5 { 0.0 } else { 1.0 });
/// let step = registry.resolve("step").unwrap();
/// assert_eq!(step(0.7), 1.0);
/// ```
#[derive(Clone)]
pub struct EasingRegistry {
    functions: HashMap<String, EasingFn>,
}

impl Default for EasingRegistry {
    fn default() -> Self {
        Easing::ALL
            .into_iter()
            .fold(Self::empty(), |registry, easing| {
                registry.register(easing.name(), move |t| easing.call(t))
            })
    }
}

impl EasingRegistry {
    /// Creates a registry without any easing function.
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Registers (or replaces) the easing function known as `name`.
    pub fn register<S, F>(mut self, name: S, function: F) -> Self
    where
        S: Into<String>,
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// Returns the easing function known as `name`, if any.
    pub fn get(&self, name: &str) -> Option<EasingFn> {
        self.functions.get(name).cloned()
    }

    /// Returns the easing function known as `name`.
    ///
    /// # Errors
    /// `UnknownEasing` configuration error if no function is registered under that name.
    pub fn resolve(&self, name: &str) -> Result<EasingFn, Error> {
        Ok(self
            .get(name)
            .ok_or_else(|| UnknownEasingSnafu { name }.build())?)
    }

    /// Indicates if a function is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Debug for EasingRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EasingRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
