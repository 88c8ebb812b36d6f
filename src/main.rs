use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use athena_router::config::{self, Config};
use athena_router::{Resolver, RoutingSession, Target};

fn main() -> anyhow::Result<()> {
    // Initialize logging (stdout carries routing output)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    let config = load_config()?;
    let resolver = Arc::new(Resolver::from_config(&config).context("Invalid topology")?);

    let registry = resolver.registry();
    info!(
        master = %registry.master().name(),
        groups = ?registry.group_names(),
        default_group = ?registry.default_group().map(|g| g.name()),
        "Athena router ready"
    );

    let session = RoutingSession::new(1, resolver);
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(directive) = line.strip_prefix('\\') {
            if let Err(e) = apply_directive(&session, directive) {
                warn!(directive = directive, error = %e, "Directive rejected");
            }
            continue;
        }

        let decision = session.route(line);
        writeln!(
            stdout,
            "{}\t{}\t{}",
            decision.connection.name(),
            decision.reason,
            line
        )?;
    }

    Ok(())
}

/// A stdin line starting with `\`
#[derive(Debug, PartialEq, Eq)]
enum Directive {
    /// `using master`, `using connection NAME`, `using group NAME`
    Using(Target),
    /// `end`
    End,
}

impl Directive {
    fn parse(directive: &str) -> anyhow::Result<Self> {
        let words: Vec<&str> = directive.split_whitespace().collect();
        let parsed = match words.as_slice() {
            ["using", "master"] => Directive::Using(Target::Master),
            ["using", "connection", name] => Directive::Using(Target::connection(*name)),
            ["using", "group", name] => Directive::Using(Target::slave_group(*name)),
            ["end"] => Directive::End,
            _ => bail!("unknown directive: {}", directive),
        };
        Ok(parsed)
    }
}

fn apply_directive(session: &RoutingSession, directive: &str) -> anyhow::Result<()> {
    match Directive::parse(directive)? {
        Directive::Using(target) => session.scope().push(target)?,
        Directive::End => {
            session.scope().pop()?;
        }
    }
    Ok(())
}

fn load_config() -> anyhow::Result<Config> {
    if let Some(path) = std::env::args().nth(1) {
        return config::load_config(&path).with_context(|| format!("Failed to load {}", path));
    }
    if let Ok(path) = std::env::var("ATHENA_ROUTER_CONFIG") {
        return config::load_config(&path).with_context(|| format!("Failed to load {}", path));
    }

    let config_paths = ["config/athena-router.toml", "athena-router.toml"];
    for path in config_paths {
        match config::load_config(path) {
            Ok(config) => {
                info!(path = path, "Loaded configuration");
                return Ok(config);
            }
            Err(e) => {
                warn!(path = path, error = %e, "Failed to load config");
            }
        }
    }

    bail!("No configuration found (pass a path or set ATHENA_ROUTER_CONFIG)")
}
