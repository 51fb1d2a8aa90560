use anyhow::{Context, Result};
use tracing_subscriber::filter::{Directive, EnvFilter};

/// Install the global subscriber. Output goes to stderr so `trip page`
/// can write HTML to stdout. `RUST_LOG` directives are layered on top of
/// `filter` (default `info`).
pub fn init_tracing(filter: Option<&str>) -> Result<()> {
    let filter = filter.unwrap_or("info");
    let directive: Directive = filter
        .parse()
        .with_context(|| format!("invalid log directive '{}'", filter))?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_directives() {
        assert!(init_tracing(Some("trip=loudest")).is_err());
    }

    #[test]
    fn repeated_initialisation_is_harmless() {
        assert!(init_tracing(Some("debug")).is_ok());
        assert!(init_tracing(None).is_ok());
    }
}
