//! Subcommand implementations.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ccmd_eval::{Effect, Engine, EngineConfig, EngineError, FunctionRegistry, MessageContent};
use ccmd_host::{Event, MemoryPlatform, MemoryStore, Seed, SeedError};
use ccmd_value::{Context, ContextError};
use tracing::debug;

/// Anything that stops a subcommand.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("invalid config: {0}")]
    Config(#[source] serde_json::Error),
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Options for `ccmd run`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub template: PathBuf,
    pub context: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub seed: Option<PathBuf>,
    /// Invocation arguments, everything after `--`.
    pub args: Vec<String>,
}

impl RunOptions {
    /// Parse the arguments that follow `run`.
    pub fn parse(args: &[String]) -> Result<Self, CliError> {
        let mut options = RunOptions::default();
        let mut template = None;
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_str();
            match arg {
                "--" => {
                    options.args = args[i + 1..].to_vec();
                    break;
                }
                "--context" | "--config" | "--seed" => {
                    let Some(value) = args.get(i + 1) else {
                        return Err(CliError::Usage(format!("{arg} needs a file")));
                    };
                    let slot = match arg {
                        "--context" => &mut options.context,
                        "--config" => &mut options.config,
                        _ => &mut options.seed,
                    };
                    *slot = Some(PathBuf::from(value));
                    i += 2;
                    continue;
                }
                _ if arg.starts_with('-') => {
                    return Err(CliError::Usage(format!("unknown option '{arg}'")));
                }
                _ if template.is_none() => template = Some(PathBuf::from(arg)),
                _ => {
                    return Err(CliError::Usage(format!("unexpected argument '{arg}'")));
                }
            }
            i += 1;
        }
        options.template =
            template.ok_or_else(|| CliError::Usage("missing template file".to_string()))?;
        Ok(options)
    }
}

/// File contents for one run, already read.
#[derive(Clone, Debug, Default)]
pub struct Sources {
    pub template: String,
    pub context: Option<String>,
    pub config: Option<String>,
    pub seed: Option<String>,
}

impl Sources {
    pub fn read(options: &RunOptions) -> Result<Self, CliError> {
        let optional = |path: &Option<PathBuf>| path.as_deref().map(read_file).transpose();
        Ok(Sources {
            template: read_file(&options.template)?,
            context: optional(&options.context)?,
            config: optional(&options.config)?,
            seed: optional(&options.seed)?,
        })
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// What a run produced.
#[derive(Debug)]
pub struct Report {
    pub output: String,
    pub events: Vec<Event>,
}

impl Report {
    /// The response, then one line per platform event.
    pub fn render(&self) -> String {
        let mut out = self.output.clone();
        if !self.events.is_empty() {
            out.push('\n');
        }
        for event in &self.events {
            let _ = write!(out, "\n{}", describe(event));
        }
        out
    }
}

fn content_text(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Embed(embed) => format!("embed {embed}"),
    }
}

fn describe(event: &Event) -> String {
    match event {
        Event::Nickname { member, nickname } => format!("# nickname {member} -> {nickname:?}"),
        Event::RoleAdded { member, role } => format!("# role +{role} {member}"),
        Event::RoleRemoved { member, role } => format!("# role -{role} {member}"),
        Event::Message {
            id,
            channel,
            content,
        } => format!("# message {id} in {channel}: {}", content_text(content)),
        Event::DirectMessage { user, content } => {
            format!("# dm {user}: {}", content_text(content))
        }
    }
}

/// Evaluate one template against fresh in-memory hosts.
pub async fn run_sources(sources: &Sources, args: &[String]) -> Result<Report, CliError> {
    let context = match &sources.context {
        Some(text) => Context::from_json_str(text)?,
        None => Context::empty(),
    };
    let config = match &sources.config {
        Some(text) => EngineConfig::from_json_str(text).map_err(CliError::Config)?,
        None => EngineConfig::default(),
    };
    let (platform, store) = match &sources.seed {
        Some(text) => Seed::from_json_str(text)?.into_hosts()?,
        None => (MemoryPlatform::new(), MemoryStore::new()),
    };
    let platform = Arc::new(platform);
    let engine = Engine::builder()
        .platform(platform.clone())
        .store(Arc::new(store))
        .config(config)
        .build();

    debug!(
        template_len = sources.template.len(),
        args = args.len(),
        seeded = sources.seed.is_some(),
        "running template"
    );
    let output = engine.evaluate(&sources.template, &context, args).await?;
    let events = platform.take_events();
    debug!(output_len = output.len(), events = events.len(), "run finished");
    Ok(Report { output, events })
}

/// `ccmd run`.
pub async fn run(options: &RunOptions) -> Result<(), CliError> {
    let sources = Sources::read(options)?;
    let report = run_sources(&sources, &options.args).await?;
    println!("{}", report.render());
    Ok(())
}

/// One line per registered function: name, arity, and effect.
pub fn function_table(registry: &FunctionRegistry) -> String {
    let mut out = String::new();
    for descriptor in registry.sorted() {
        let effect = match descriptor.effect() {
            Effect::Pure => "pure",
            Effect::Effecting => "effecting",
        };
        let arity = descriptor.arity.to_string();
        let _ = writeln!(out, "{:<16} {arity:<24} {effect}", descriptor.name);
    }
    out
}

/// `ccmd functions`.
pub fn list_functions() {
    print!("{}", function_table(&FunctionRegistry::with_builtins()));
}
