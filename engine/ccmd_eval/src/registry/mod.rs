//! Function registry.
//!
//! Maps function names to descriptors. A descriptor records the accepted
//! arity, whether the function is pure or touches a host collaborator, and
//! whether its result is written back into the variable named by its first
//! argument. The registry is built once and shared read-only by every
//! evaluation through [`SharedRegistry`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use ccmd_value::{Context, Value};
use rustc_hash::FxHashMap;

use crate::config::EngineConfig;
use crate::errors::{wrong_arg_count, FnError, FnResult};
use crate::host::{Platform, Store};

/// Number of arguments a function accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    /// Inclusive range.
    Between(usize, usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Between(lo, hi) => (lo..=hi).contains(&count),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = |n: usize| if n == 1 { "argument" } else { "arguments" };
        match *self {
            Arity::Exact(n) => write!(f, "{n} {}", noun(n)),
            Arity::AtLeast(n) => write!(f, "at least {n} {}", noun(n)),
            Arity::Between(lo, hi) => write!(f, "{lo} to {hi} {}", noun(hi)),
        }
    }
}

/// Effect classification of a function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Deterministic apart from explicit randomness; no host access.
    Pure,
    /// Reaches the platform or the store.
    Effecting,
}

/// Where a function's result goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WriteBack {
    /// The result is the directive's value.
    #[default]
    None,
    /// When the first argument is a bare `$var`, the result replaces that
    /// variable and the directive renders nothing.
    FirstArgument,
}

/// Everything an effecting function may reach.
pub struct CallContext<'a> {
    pub context: &'a Context,
    pub platform: &'a dyn Platform,
    pub store: &'a dyn Store,
    pub config: &'a EngineConfig,
}

impl CallContext<'_> {
    /// Identifier of the invoking user, if the context has one.
    pub fn invoker_id(&self) -> Option<String> {
        self.context.lookup_id(&["User", "ID"])
    }

    /// Identifier of the channel the template runs in, if any.
    pub fn channel_id(&self) -> Option<String> {
        self.context.lookup_id(&["Channel", "ID"])
    }
}

/// A pure function over already-evaluated arguments.
pub type PureFn = fn(&[Value]) -> FnResult;

/// A function that performs host I/O.
#[async_trait]
pub trait EffectingFunction: Send + Sync {
    async fn call(&self, cx: &CallContext<'_>, args: Vec<Value>) -> FnResult;
}

/// How a function is invoked.
#[derive(Clone)]
pub enum Callable {
    Pure(PureFn),
    Effecting(Arc<dyn EffectingFunction>),
}

impl Callable {
    pub fn effect(&self) -> Effect {
        match self {
            Callable::Pure(_) => Effect::Pure,
            Callable::Effecting(_) => Effect::Effecting,
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Pure(_) => f.write_str("Callable::Pure"),
            Callable::Effecting(_) => f.write_str("Callable::Effecting"),
        }
    }
}

/// A registered function.
#[derive(Clone, Debug)]
pub struct FunctionDescriptor {
    pub name: String,
    pub arity: Arity,
    pub callable: Callable,
    pub write_back: WriteBack,
}

impl FunctionDescriptor {
    pub fn pure(name: impl Into<String>, arity: Arity, f: PureFn) -> Self {
        FunctionDescriptor {
            name: name.into(),
            arity,
            callable: Callable::Pure(f),
            write_back: WriteBack::None,
        }
    }

    pub fn effecting(
        name: impl Into<String>,
        arity: Arity,
        f: impl EffectingFunction + 'static,
    ) -> Self {
        FunctionDescriptor {
            name: name.into(),
            arity,
            callable: Callable::Effecting(Arc::new(f)),
            write_back: WriteBack::None,
        }
    }

    #[must_use]
    pub fn with_write_back(mut self, write_back: WriteBack) -> Self {
        self.write_back = write_back;
        self
    }

    #[inline]
    pub fn effect(&self) -> Effect {
        self.callable.effect()
    }

    /// Validate an argument count against the declared arity.
    pub fn check_arity(&self, count: usize) -> Result<(), FnError> {
        if self.arity.accepts(count) {
            Ok(())
        } else {
            Err(wrong_arg_count(self.arity, count))
        }
    }
}

/// Name to descriptor table.
#[derive(Clone, Debug, Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<String, FunctionDescriptor>,
}

impl FunctionRegistry {
    /// An empty registry. Every call is an unknown function.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in function.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::functions::register_builtins(&mut registry);
        registry
    }

    /// Add or replace a function. Returns the descriptor it replaced.
    pub fn register(&mut self, descriptor: FunctionDescriptor) -> Option<FunctionDescriptor> {
        self.functions.insert(descriptor.name.clone(), descriptor)
    }

    pub fn register_pure(&mut self, name: &str, arity: Arity, f: PureFn) {
        self.register(FunctionDescriptor::pure(name, arity, f));
    }

    pub fn register_effecting(
        &mut self,
        name: &str,
        arity: Arity,
        f: impl EffectingFunction + 'static,
    ) {
        self.register(FunctionDescriptor::effecting(name, arity, f));
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// All descriptors, sorted by name.
    pub fn sorted(&self) -> Vec<&FunctionDescriptor> {
        let mut all: Vec<_> = self.functions.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}

/// Read-only registry shared across evaluations and threads.
pub struct SharedRegistry<T>(Arc<T>);

impl<T> SharedRegistry<T> {
    pub fn new(registry: T) -> Self {
        SharedRegistry(Arc::new(registry))
    }
}

impl<T> Clone for SharedRegistry<T> {
    fn clone(&self) -> Self {
        SharedRegistry(Arc::clone(&self.0))
    }
}

impl<T> std::ops::Deref for SharedRegistry<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedRegistry({:?})", &*self.0)
    }
}

#[cfg(test)]
mod tests;
