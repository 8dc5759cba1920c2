use anyhow::Context as _;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::{Directive, LevelFilter};

/// HTTP stack crates that are chatty at `debug`; kept at `warn` unless `RUST_LOG` names them.
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls", "html5ever"];

/// Installs the global subscriber on stderr, where the progress bar also draws.
pub fn init() -> anyhow::Result<()> {
    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let filter = build_filter(&env_directives)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}

fn build_filter(env_directives: &str) -> anyhow::Result<EnvFilter> {
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse(env_directives)
        .with_context(|| format!("parse log filter: {env_directives}"))?;

    for target in QUIET_TARGETS {
        if names_target(env_directives, target) {
            continue;
        }
        let directive = format!("{target}=warn")
            .parse::<Directive>()
            .with_context(|| format!("build log directive for {target}"))?;
        filter = filter.add_directive(directive);
    }

    Ok(filter)
}

/// Whether any directive (`target[span{field}]=level`) is for exactly `target`.
fn names_target(env_directives: &str, target: &str) -> bool {
    env_directives
        .split(',')
        .filter_map(|directive| directive.split(['[', '=']).next())
        .any(|name| name.trim() == target)
}
