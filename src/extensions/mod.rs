// ABOUTME: Extension registry injecting host-provided callables into the global scope

use crate::env::Environment;
use crate::value::{NativeFn, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub mod math;
pub mod strings;

/// A named bundle of host functions that can be installed into an
/// interpreter. Each function supplies its global name, its arity, and a
/// plain `fn(&[Value]) -> Result<Value, RuntimeError>`.
pub trait Extension {
    fn name(&self) -> &'static str;
    fn functions(&self) -> Vec<NativeFn>;
}

/// Tracks installed extensions. Registering one defines every function it
/// provides as an ordinary global binding.
#[derive(Default)]
pub struct ExtensionRegistry {
    extensions: HashMap<String, Box<dyn Extension>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        ExtensionRegistry {
            extensions: HashMap::new(),
        }
    }

    pub fn register(&mut self, extension: Box<dyn Extension>, env: &Arc<Environment>) {
        for function in extension.functions() {
            env.define(function.name, Value::Extension(function));
        }
        self.extensions
            .insert(extension.name().to_string(), extension);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Extension> {
        self.extensions.get(name).map(|e| e.as_ref())
    }

    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.extensions.keys().map(|n| n.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Every registered function name; the resolver pre-declares these.
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .extensions
            .values()
            .flat_map(|extension| extension.functions())
            .map(|function| function.name.to_string())
            .collect();
        names.sort_unstable();
        names
    }
}

/// Install the built-in extensions shipped with the interpreter.
pub fn register_extensions(env: &Arc<Environment>) -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::new();
    registry.register(Box::new(math::MathExtension), env);
    registry.register(Box::new(strings::StringExtension), env);
    registry
}
