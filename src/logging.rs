use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;

/// Startup level: `verbose` forces debug, otherwise the configured `LOG_LEVEL`
pub fn startup_level(verbose: bool, config: &EngineConfig) -> &str {
    if verbose {
        "debug"
    } else {
        &config.log_level
    }
}

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies. Calling this
/// twice is harmless, the second call is ignored.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        tracing::debug!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_level_follows_config() {
        let config = EngineConfig {
            log_level: "warn".to_string(),
            ..Default::default()
        };
        assert_eq!(startup_level(false, &config), "warn");
        assert_eq!(startup_level(true, &config), "debug");
        assert_eq!(startup_level(false, &EngineConfig::default()), "info");
    }

    #[test]
    fn test_init_is_idempotent() {
        init("warn");
        init("debug");
        tracing::info!("still logging after second init");
    }
}
