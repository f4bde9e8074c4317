//! Explicit scope registration table.
//!
//! Maps `(module, declaration path)` to the kind of scope declared there.
//! The module is the declaring unit's `module_path!()`, e.g.
//! `plant::pumps`, so files sharing a stem stay separate.
//! Paths are dotted and encode lexical nesting, so a class `Inner`
//! declared inside function `build` is registered as `build.Inner`.
//! Unregistered scopes are treated as functions.

use crate::utils::error::RegistryError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of a declared scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Class,
    Function,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Class => "class",
            ScopeKind::Function => "function",
        }
    }
}

/// Registry of declared scopes, keyed by module then path
///
/// Built once at set-up time and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ScopeRegistry {
    modules: HashMap<String, HashMap<String, ScopeKind>>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class declared at `path` in `module`
    ///
    /// # Errors
    /// * `RegistryError::Conflict` - path already registered as a function
    /// * `RegistryError::InvalidPath` - empty path or empty segment
    pub fn register_class(&mut self, module: &str, path: &str) -> Result<(), RegistryError> {
        self.register(module, path, ScopeKind::Class)
    }

    /// Register a function that encloses other declarations
    pub fn register_function(&mut self, module: &str, path: &str) -> Result<(), RegistryError> {
        self.register(module, path, ScopeKind::Function)
    }

    /// Builder form of [`register_class`](Self::register_class)
    pub fn with_class(mut self, module: &str, path: &str) -> Result<Self, RegistryError> {
        self.register_class(module, path)?;
        Ok(self)
    }

    /// Builder form of [`register_function`](Self::register_function)
    pub fn with_function(mut self, module: &str, path: &str) -> Result<Self, RegistryError> {
        self.register_function(module, path)?;
        Ok(self)
    }

    fn register(&mut self, module: &str, path: &str, kind: ScopeKind) -> Result<(), RegistryError> {
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return Err(RegistryError::InvalidPath(path.to_string()));
        }

        let scopes = self.modules.entry(module.to_string()).or_default();
        match scopes.get(path) {
            Some(existing) if *existing != kind => {
                return Err(RegistryError::Conflict {
                    module: module.to_string(),
                    path: path.to_string(),
                    existing: existing.as_str(),
                });
            }
            Some(_) => return Ok(()),
            None => {}
        }

        debug!("Registered {} {}::{}", kind.as_str(), module, path);
        scopes.insert(path.to_string(), kind);
        Ok(())
    }

    /// Kind registered for a path, if any
    pub fn kind_of(&self, module: &str, path: &str) -> Option<ScopeKind> {
        self.modules.get(module)?.get(path).copied()
    }

    /// Number of registered scopes across all modules
    pub fn len(&self) -> usize {
        self.modules.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Innermost class enclosing the declaration of `qualified`
    ///
    /// `qualified` is a dotted path ending in a function name. Its
    /// enclosing prefixes are checked from the innermost outward and the
    /// last segment of the first one registered as a class is returned.
    ///
    /// # Example
    /// ```ignore
    /// // build.Inner registered as a class
    /// registry.enclosing_class("shapes", "build.Inner.area") == Some("Inner")
    /// registry.enclosing_class("shapes", "build.helper") == None
    /// ```
    pub fn enclosing_class<'p>(&self, module: &str, qualified: &'p str) -> Option<&'p str> {
        let scopes = self.modules.get(module)?;

        let mut end = qualified.len();
        while let Some(dot) = qualified[..end].rfind('.') {
            let prefix = &qualified[..dot];
            if scopes.get(prefix) == Some(&ScopeKind::Class) {
                return Some(last_segment(prefix));
            }
            end = dot;
        }
        None
    }
}

/// Final dotted segment of a path
pub fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}
