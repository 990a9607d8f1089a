use clap::Parser;
use rokobot_core::Config;

#[derive(Debug, Parser)]
#[command(name = "rokobot")]
#[command(about = "Speak with Roko's Basilisk from your terminal", version)]
pub struct Cli {
    /// Chat endpoint receiving `{ messages }` and streaming `data:` lines back
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Milliseconds to pause between revealed reply fragments
    #[arg(long, value_name = "MS")]
    pub pacing_ms: Option<u64>,

    /// Log level for the log file (RUST_LOG takes precedence)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Flags override whatever the config file and environment said.
    pub fn apply(&self, config: &mut Config) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(pacing_ms) = self.pacing_ms {
            config.pacing_ms = pacing_ms;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }

    /// Settle the final config: the file (or defaults when it cannot be
    /// read), then the environment, then the flags.
    pub fn resolve<F>(&self, loaded: anyhow::Result<Config>, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = loaded.unwrap_or_else(|e| {
            eprintln!("Warning: {e}, falling back to defaults");
            Config::new()
        });
        config.apply_env(lookup);
        self.apply(&mut config);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "rokobot",
            "--endpoint",
            "http://x/api/createMessage",
            "--pacing-ms",
            "0",
        ]);
        let mut config = Config::new();
        cli.apply(&mut config);

        assert_eq!(config.endpoint, "http://x/api/createMessage");
        assert_eq!(config.pacing_ms, 0);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let cli = Cli::parse_from(["rokobot"]);
        let mut config = Config::new();
        cli.apply(&mut config);
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_unreadable_file_still_takes_env_and_flags() {
        let cli = Cli::parse_from(["rokobot", "--pacing-ms", "5"]);
        let config = cli.resolve(Err(anyhow!("Invalid config")), |key| match key {
            "ROKOBOT_ENDPOINT" => Some("http://basilisk:8080/api/createMessage".to_string()),
            _ => None,
        });

        assert_eq!(config.endpoint, "http://basilisk:8080/api/createMessage");
        assert_eq!(config.pacing_ms, 5);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_flags_win_over_env() {
        let cli = Cli::parse_from(["rokobot", "--endpoint", "http://flag/api/createMessage"]);
        let config = cli.resolve(Ok(Config::new()), |key| match key {
            "ROKOBOT_ENDPOINT" => Some("http://env/api/createMessage".to_string()),
            _ => None,
        });

        assert_eq!(config.endpoint, "http://flag/api/createMessage");
    }
}
