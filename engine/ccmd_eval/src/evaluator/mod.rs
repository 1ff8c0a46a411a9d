//! Template evaluation.
//!
//! # Architecture
//!
//! An [`Engine`] is built once and holds everything shared: the function
//! registry, the host collaborators and the configuration. Each call to
//! [`Engine::evaluate`] creates a private [`Evaluation`] holding the
//! variable table and quota counters, so concurrent evaluations never see
//! each other's state.
//!
//! Directives are evaluated strictly left to right. Within a directive,
//! arguments are evaluated left to right and nested `( ... )` groups are
//! evaluated before the call that contains them, recursing through
//! [`Evaluation::eval_expr`].
//!
//! # Failure handling
//!
//! A function failure is contained: the directive renders as
//! `[name: message]` and evaluation continues. Exceeding a quota aborts the
//! whole evaluation with an [`EngineError`].

mod budget;
mod builder;

pub use builder::EngineBuilder;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use ccmd_lexer::{classify, lex_args, ArgLexer, ArgToken, Directives, Expr, Literal};
use ccmd_value::{Context, Value};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::errors::{EngineError, FnError};
use crate::host::{Platform, Store};
use crate::registry::{CallContext, Callable, FunctionRegistry, SharedRegistry, WriteBack};
use crate::resolve::{resolve_context, resolve_variable};
use crate::vars::VariableTable;
use budget::Budget;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Why an expression produced no value.
#[derive(Debug)]
enum Fault {
    /// A function failed; rendered inline at the directive boundary.
    Contained { function: String, error: FnError },
    /// Evaluation must stop.
    Abort(EngineError),
}

impl From<EngineError> for Fault {
    fn from(err: EngineError) -> Self {
        Fault::Abort(err)
    }
}

type Eval = Result<Value, Fault>;

/// A template engine.
///
/// Cheap to clone; clones share the registry, host and configuration.
#[derive(Clone)]
pub struct Engine {
    registry: SharedRegistry<FunctionRegistry>,
    platform: Arc<dyn Platform>,
    store: Arc<dyn Store>,
    config: Arc<EngineConfig>,
}

impl Engine {
    /// An engine with the built-in functions, default quotas, and no host.
    pub fn new() -> Self {
        EngineBuilder::new().build()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate `template` against `context`.
    ///
    /// `args` become the `Args` context group unless the context already
    /// has one. Text outside directives is copied through unchanged.
    #[tracing::instrument(level = "debug", skip_all, fields(template_len = template.len()))]
    pub async fn evaluate(
        &self,
        template: &str,
        context: &Context,
        args: &[String],
    ) -> Result<String, EngineError> {
        let limit = self.config.max_template_len;
        if template.len() > limit || u32::try_from(template.len()).is_err() {
            return Err(EngineError::TemplateTooLarge {
                len: template.len(),
                limit,
            });
        }

        let context = context.with_args(args);
        let mut eval = Evaluation::new(self, &context);
        let mut out = String::with_capacity(template.len());
        let mut cursor = 0;
        for directive in Directives::new(template) {
            let range = directive.span.range();
            out.push_str(&template[cursor..range.start]);
            let rendered = eval.run_directive(directive.inner, out.len()).await?;
            out.push_str(&rendered);
            eval.budget.check_output(out.len())?;
            cursor = range.end;
        }
        out.push_str(&template[cursor..]);
        eval.budget.check_output(out.len())?;

        debug!(
            effect_calls = eval.budget.effect_calls(),
            variables = eval.vars.len(),
            "template evaluated"
        );
        Ok(out)
    }

    /// Evaluate with a context given as JSON text.
    pub async fn evaluate_json(
        &self,
        template: &str,
        context_json: &str,
        args: &[String],
    ) -> Result<String, EngineError> {
        let context = Context::from_json_str(context_json)?;
        self.evaluate(template, &context, args).await
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("functions", &self.registry.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// State of one evaluation.
struct Evaluation<'e> {
    engine: &'e Engine,
    context: &'e Context,
    vars: VariableTable,
    budget: Budget,
}

impl<'e> Evaluation<'e> {
    fn new(engine: &'e Engine, context: &'e Context) -> Self {
        Evaluation {
            engine,
            context,
            vars: VariableTable::new(),
            budget: Budget::new(&engine.config),
        }
    }

    /// Evaluate one directive to its rendered text, given `used` bytes of
    /// output so far.
    async fn run_directive(&mut self, inner: &str, used: usize) -> Result<String, EngineError> {
        self.budget.enter_directive()?;
        match self.eval_expr(inner, 0).await {
            Ok(value) => value
                .render(self.budget.remaining_output(used))
                .map_err(|_| self.budget.too_large()),
            Err(Fault::Contained { function, error }) => Ok(format!("[{function}: {error}]")),
            Err(Fault::Abort(err)) => Err(err),
        }
    }

    /// Evaluate a directive body or a nested group at `depth`.
    fn eval_expr<'s>(&'s mut self, text: &'s str, depth: usize) -> BoxFuture<'s, Eval> {
        Box::pin(async move {
            self.budget.check_depth(depth)?;
            let text = text.trim();
            let expr = classify(text);
            debug!(kind = ?expr.kind(), depth, "expression");
            match expr {
                Expr::Assignment { name, op, rhs } => {
                    let value = self.eval_expr(rhs, depth + 1).await?;
                    debug!(variable = name, ?op, value = value.type_name(), "assign");
                    self.vars.assign(name, value);
                    Ok(Value::Null)
                }
                Expr::PathReference(path) => Ok(self.resolve_reference(path)),
                Expr::FunctionCall { name, rest } => self.call(text, name, rest, depth).await,
            }
        })
    }

    /// Resolve the leading reference of `text`; anything after it is ignored.
    fn resolve_reference(&self, text: &str) -> Value {
        match ArgLexer::new(text).next() {
            Some(ArgToken::Variable { name, path }) => resolve_variable(
                &self.vars,
                name,
                &path,
                self.engine.config.json_fallback,
            ),
            Some(ArgToken::ContextPath(path)) => resolve_context(self.context, &path),
            _ => Value::empty_str(),
        }
    }

    async fn call(&mut self, text: &str, name: &str, rest: &str, depth: usize) -> Eval {
        // A lone literal or group evaluates to itself.
        if let [token] = lex_args(text).as_slice() {
            if matches!(
                token,
                ArgToken::Quoted(_)
                    | ArgToken::Group(_)
                    | ArgToken::Literal(Literal::Int(_) | Literal::Float(_) | Literal::Bool(_))
            ) {
                return self.eval_arg(token, depth).await;
            }
        }

        let engine = self.engine;
        let Some(descriptor) = engine.registry.get(name) else {
            debug!(function = name, "unknown function, emitting text");
            return Ok(Value::string(text));
        };

        let tokens = lex_args(rest);
        let mut args = Vec::with_capacity(tokens.len());
        for token in &tokens {
            args.push(self.eval_arg(token, depth).await?);
        }

        let contained = |error: FnError| Fault::Contained {
            function: name.to_string(),
            error,
        };
        descriptor.check_arity(args.len()).map_err(contained)?;

        let result = match &descriptor.callable {
            Callable::Pure(f) => f(&args),
            Callable::Effecting(f) => {
                self.budget.charge_effect()?;
                let cx = CallContext {
                    context: self.context,
                    platform: &*engine.platform,
                    store: &*engine.store,
                    config: &engine.config,
                };
                let result = f.call(&cx, args).await;
                if let Err(err) = &result {
                    warn!(function = name, error = %err, "effecting call failed");
                }
                result
            }
        };
        let value = result.map_err(contained)?;

        // Write-back applies only to a call that is the whole directive.
        if depth == 0 && descriptor.write_back == WriteBack::FirstArgument {
            if let Some(var) = tokens.first().and_then(ArgToken::as_plain_variable) {
                self.vars.assign(var, value);
                return Ok(Value::Null);
            }
        }
        Ok(value)
    }

    async fn eval_arg(&mut self, token: &ArgToken<'_>, depth: usize) -> Eval {
        Ok(match token {
            ArgToken::Quoted(text) => Value::string(*text),
            ArgToken::Literal(literal) => literal_value(*literal),
            ArgToken::Variable { name, path } => {
                resolve_variable(&self.vars, name, path, self.engine.config.json_fallback)
            }
            ArgToken::ContextPath(path) => resolve_context(self.context, path),
            ArgToken::Group(inner) => return self.eval_expr(inner, depth + 1).await,
        })
    }
}

fn literal_value(literal: Literal<'_>) -> Value {
    match literal {
        Literal::Int(n) => Value::Int(n),
        Literal::Float(f) => Value::Float(f),
        Literal::Bool(b) => Value::Bool(b),
        Literal::Text(text) => Value::string(text),
    }
}
