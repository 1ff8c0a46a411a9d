//! Ccmd Eval - evaluator for custom command templates.
//!
//! A template is text with `{{ ... }}` directives. Evaluating it against an
//! invocation [`Context`](ccmd_value::Context) produces the response text
//! and, through effecting functions, actions on the host platform.
//!
//! # Modules
//!
//! - [`evaluator`]: [`Engine`] and the directive loop
//! - [`registry`]: function descriptors and lookup
//! - [`functions`]: the built-in function library
//! - [`resolve`]: `.Context.Path` and `$var.path` resolution
//! - [`host`]: the platform and store traits effecting functions call
//! - [`config`]: quotas and the query whitelist
//!
//! # Example
//!
//! ```
//! use ccmd_eval::Engine;
//! use ccmd_value::Context;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ccmd_eval::EngineError> {
//! let engine = Engine::new();
//! let ctx = Context::builder().field("User", "Username", "Nova").build();
//! let out = engine.evaluate("Hello {{ .User.Username }}!", &ctx, &[]).await?;
//! assert_eq!(out, "Hello Nova!");
//! # Ok(())
//! # }
//! ```

pub mod config;
mod errors;
pub mod evaluator;
pub mod functions;
pub mod host;
pub mod registry;
pub mod resolve;
mod vars;

pub use config::{EngineConfig, JsonFallback, QueryPolicy};
pub use errors::{
    division_by_zero, index_out_of_bounds, integer_overflow, invalid_argument, modulo_by_zero,
    not_finite, policy_violation, timed_out, wrong_arg_count, wrong_arg_type, EngineError,
    FnError, FnErrorKind, FnResult,
};
pub use evaluator::{Engine, EngineBuilder};
pub use host::{
    EntryType, HostError, HostResult, Member, MessageContent, Platform, Query, Row, Store,
    Unavailable, MAX_ENTRY_LEN,
};
pub use registry::{
    Arity, CallContext, Callable, Effect, EffectingFunction, FunctionDescriptor,
    FunctionRegistry, PureFn, SharedRegistry, WriteBack,
};
pub use vars::VariableTable;

// Re-exported so implementors of `Platform`, `Store` and
// `EffectingFunction` need no direct dependency.
pub use async_trait::async_trait;
