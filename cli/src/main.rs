use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use callset_core::{
    ArgPool, CallConfig, Instance, TypeCache, Unpooled,
    demo::{self, ManyArgs, Person},
    stat, stat_type,
};
use tracing::debug;


static TRACE_INIT: Once = Once::new();
const DEFAULT_TRACE_FILTER: &str = "callset::cache=debug,callset::pool=trace,callset::call=trace,callset_cli=info";

#[derive(Debug, Parser)]
#[command(name = "callset", author, version, about = "Inspect and exercise callset method tables", long_about = None)]
struct CliArgs {
    /// TOML file with argument pool settings
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the method table of every demo type, or of one
    Describe {
        #[arg(value_name = "TYPE")]
        type_name: Option<String>,
    },
    /// Greet people through one rebound instance
    Greet {
        #[arg(value_name = "NAME:AGE", required = true, value_parser = parse_person)]
        people: Vec<Person>,
    },
    /// Time repeated args()/call() round trips of ManyArgs.Many
    Bench {
        #[arg(long, default_value_t = 100_000)]
        iterations: u64,
        /// Allocate a fresh argument container for every call
        #[arg(long)]
        unpooled: bool,
    },
}

fn parse_person(raw: &str) -> Result<Person, String> {
    let (name, age) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:AGE, got '{}'", raw))?;
    if name.trim().is_empty() {
        return Err(format!("missing name in '{}'", raw));
    }
    let age = age
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid age in '{}': {}", raw, e))?;
    Ok(Person::new(name.trim(), age))
}

/// Filter requested through `CALLSET_TRACE`: `None` when tracing stays off, otherwise an
/// explicit `EnvFilter` directive if one was given.
fn trace_request(raw: &str) -> Option<Option<&str>> {
    match raw.trim() {
        "" | "0" | "false" | "off" => None,
        "1" | "true" | "on" => Some(None),
        directive => Some(Some(directive)),
    }
}

fn maybe_init_tracing() {
    let Ok(raw) = std::env::var("CALLSET_TRACE") else {
        return;
    };
    let Some(directive) = trace_request(&raw) else {
        return;
    };

    TRACE_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = directive
            .map(str::to_string)
            .or_else(|| std::env::var("RUST_LOG").ok())
            .and_then(|expr| EnvFilter::try_new(expr).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_TRACE_FILTER));
        let _ = fmt().with_writer(io::stderr).with_env_filter(filter).try_init();
    });
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CallConfig> {
    let Some(path) = path else {
        return Ok(CallConfig::from_env());
    };
    let src = std::fs::read_to_string(path).with_context(|| format!("Failed to read config '{}'", path.display()))?;
    let config = CallConfig::from_toml_str(&src).with_context(|| format!("Failed to load config '{}'", path.display()))?;
    debug!(path = %path.display(), ?config, "config.loaded");
    Ok(config)
}

fn describe(out: &mut impl Write, type_name: Option<&str>) -> anyhow::Result<()> {
    let catalog = demo::catalog();
    let selected: Vec<_> = match type_name {
        None => catalog,
        Some(wanted) => {
            let found: Vec<_> = catalog.iter().filter(|(name, _)| *name == wanted).cloned().collect();
            if found.is_empty() {
                let known: Vec<_> = catalog.iter().map(|(name, _)| *name).collect();
                anyhow::bail!("unknown type '{}'; known types: {}", wanted, known.join(", "));
            }
            found
        }
    };

    for (name, ty) in selected {
        let template = stat_type(ty);
        writeln!(out, "{} ({} methods)", name, template.methods().len())?;
        for method in template.methods() {
            writeln!(out, "  {}", method.pretty())?;
        }
    }
    Ok(())
}

fn greet_line(instance: &Instance) -> anyhow::Result<String> {
    let greet = instance.methods().named("Greet")?;
    let result = greet.call(greet.args());
    result
        .get::<String>(0)
        .cloned()
        .context("Greet returned no greeting")
}

fn greet(out: &mut impl Write, people: Vec<Person>) -> anyhow::Result<()> {
    let mut people = people.into_iter();
    let Some(first) = people.next() else {
        return Ok(());
    };
    let mut instance = stat(first);
    writeln!(out, "{}", greet_line(&instance)?)?;
    for person in people {
        instance.rebind(person);
        writeln!(out, "{}", greet_line(&instance)?)?;
    }
    Ok(())
}

fn bench(out: &mut impl Write, config: &CallConfig, iterations: u64, unpooled: bool) -> anyhow::Result<()> {
    let pool = Arc::new(ArgPool::from_config(config));
    let fresh = Arc::new(Unpooled::new());
    let cache = if unpooled {
        TypeCache::with_allocator(fresh.clone())
    } else {
        TypeCache::with_allocator(pool.clone())
    };

    let instance = cache.stat(ManyArgs);
    let many = instance.methods().named("Many")?;
    let started = Instant::now();
    for _ in 0..iterations {
        let result = many.call(many.args());
        if let Some(err) = result.error {
            anyhow::bail!("ManyArgs.Many failed: {}", err);
        }
    }
    let elapsed = started.elapsed();

    let allocations = if unpooled { fresh.allocated() } else { pool.allocated() };
    let per_call = elapsed.as_nanos() / u128::from(iterations.max(1));
    writeln!(
        out,
        "{} {} iterations in {:.3}ms ({} ns/call), {} container allocations",
        many.pretty(),
        iterations,
        elapsed.as_secs_f64() * 1000.0,
        per_call,
        allocations
    )?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    maybe_init_tracing();

    let CliArgs { config, command } = CliArgs::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Describe { type_name } => describe(&mut out, type_name.as_deref()),
        Commands::Greet { people } => greet(&mut out, people),
        Commands::Bench { iterations, unpooled } => {
            let config = load_config(config.as_deref())?;
            bench(&mut out, &config, iterations, unpooled)
        }
    }
}
