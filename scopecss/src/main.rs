use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use scopecss_lib::scope::registry::ElementRegistry;
use scopecss_lib::{ResolverState, ScopeBehaviour, ScopeConfig, ScopeResolver, StyleEngine};

#[derive(Parser)]
#[command(name = "scopecss")]
#[command(about = "Scope CSS selectors and compile style templates")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rewrite selector lists, one per line, into scoped class selectors.
    Resolve {
        /// Input file name.
        input: PathBuf,

        /// Scope identifier used for namespaced tags and attributes.
        #[arg(short, long)]
        scope: String,

        #[arg(short, long, value_enum, default_value_t = Behaviour::Local)]
        behaviour: Behaviour,

        /// Element registry file. Loaded first if it exists, then rewritten.
        #[arg(short, long)]
        registry: Option<PathBuf>,
    },
    /// Compile a style template without interpolations.
    Compile {
        /// Input file name.
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Behaviour {
    Local,
    Global,
}

impl From<Behaviour> for ScopeBehaviour {
    fn from(behaviour: Behaviour) -> Self {
        match behaviour {
            Behaviour::Local => ScopeBehaviour::Local,
            Behaviour::Global => ScopeBehaviour::Global,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Args = Args::parse();
    let outcome = match args.command {
        Command::Resolve {
            input,
            scope,
            behaviour,
            registry,
        } => resolve(&input, scope, behaviour.into(), registry.as_deref()),
        Command::Compile { input } => compile(&input),
    };

    if let Err(message) = outcome {
        error!("{message}");
        eprintln!("Error: {message}");
        process::exit(1);
    }
}

fn resolve(
    input: &Path,
    scope: String,
    behaviour: ScopeBehaviour,
    registry: Option<&Path>,
) -> Result<(), String> {
    let source = read(input)?;
    let mut resolver = ScopeResolver::new(ScopeConfig { scope, behaviour });

    if let Some(path) = registry.filter(|path| path.exists()) {
        let elements: ElementRegistry = serde_json::from_str(&read(path)?)
            .map_err(|e| format!("invalid registry {}: {e}", path.display()))?;
        info!("loaded {} elements from {}", elements.len(), path.display());
        resolver.set_state(ResolverState { elements });
    }

    for (number, line) in source.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let rewritten = resolver
            .run(line)
            .map_err(|e| format!("{}:{}: {e}", input.display(), number + 1))?;
        println!("{rewritten}");
    }

    if let Some(path) = registry {
        let json = serde_json::to_string_pretty(resolver.elements())
            .map_err(|e| format!("cannot serialize registry: {e}"))?;
        fs::write(path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))?;
        info!("wrote {} elements to {}", resolver.elements().len(), path.display());
    }
    Ok(())
}

fn compile(input: &Path) -> Result<(), String> {
    let source = read(input)?;
    let mut engine = StyleEngine::new();
    let token = engine
        .css(&[source.as_str()], Vec::new())
        .map_err(|e| format!("{}: {e}", input.display()))?;

    println!("{}", token.compiled());
    let global = engine.sink().to_css();
    if !global.is_empty() {
        println!("-- global --");
        println!("{global}");
    }
    Ok(())
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}
