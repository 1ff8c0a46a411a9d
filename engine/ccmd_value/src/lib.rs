//! Ccmd Value - runtime values and the invocation context.
//!
//! - [`Value`]: the dynamically typed result of every template expression
//! - [`Heap`]: shared, immutable storage for the heap-backed variants
//! - [`Context`]: the read-only tree of invocation data (`.User.ID`, ...)
//! - [`traverse`]: dotted-path lookup shared by context and variable
//!   resolution
//! - [`Value::render`]: output rendering that stops at a byte limit

mod context;
mod heap;
mod path;
mod render;
mod value;

pub use context::{groups, Context, ContextBuilder, ContextError};
pub use heap::Heap;
pub use path::traverse;
pub use render::RenderLimit;
pub use value::{Map, Value};
