use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default)]
#[clap(about = "Dapurate monitoring console", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "DAPUR_API_URL", help = "Base URL of the Dapurate REST backend.")]
    pub api_base_url: Option<String>,

    #[clap(long, env = "DAPUR_WS_URL", help = "URL of the live camera feed websocket.")]
    pub ws_url: Option<String>,

    #[clap(long, env = "DAPUR_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "DAPUR_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "DAPUR_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    #[clap(long, env = "DAPUR_PAGE_SIZE", help = "Samples shown per scoreboard page.")]
    pub page_size: Option<usize>,
}

impl Config {
    // Merge two Config structs, where 'other' overrides 'self' for Some values
    fn merge(self, other: Config) -> Config {
        Config {
            api_base_url: other.api_base_url.or(self.api_base_url),
            ws_url: other.ws_url.or(self.ws_url),
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            page_size: other.page_size.or(self.page_size),
        }
    }
}

pub fn load_config() -> Config {
    // 1. Load defaults
    let default_config = Config {
        api_base_url: Some("http://localhost:8080/".to_string()),
        ws_url: Some("ws://localhost:8080/ws".to_string()),
        log_dir: Some(PathBuf::from("./logs")),
        log_level: Some("info".to_string()),
        page_size: Some(lib_common::DEFAULT_PER_PAGE),
        ..Default::default()
    };

    // 2. Load from config file (dapurate.conf) if present.
    //    Allow overriding the default config file path with a CLI arg.
    let cli_args_for_path = Config::parse();

    // Without an explicit path, prefer ./dapurate.conf and fall back to
    // ~/.dapurate.conf.
    let config_file_path = cli_args_for_path.config_path.clone().unwrap_or_else(|| {
        let local = PathBuf::from("dapurate.conf");
        if local.exists() {
            return local;
        }
        match dirs::home_dir() {
            Some(home) => home.join(".dapurate.conf"),
            None => local,
        }
    });

    let mut current_config = default_config;

    if config_file_path.exists() {
        if let Ok(config_str) = fs::read_to_string(&config_file_path) {
            if let Ok(file_config) = serde_json::from_str::<Config>(&config_str) {
                current_config = current_config.merge(file_config);
            } else {
                log::warn!(
                    "Failed to parse config file: {}. Falling back to other sources.",
                    config_file_path.display()
                );
            }
        } else {
            log::warn!(
                "Failed to read config file: {}. Falling back to other sources.",
                config_file_path.display()
            );
        }
    }

    // 3. Environment variables and CLI arguments override the file config.
    current_config.merge(cli_args_for_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_the_override_side() {
        let base = Config {
            api_base_url: Some("http://base/".to_string()),
            page_size: Some(10),
            ..Default::default()
        };
        let over = Config {
            api_base_url: Some("http://override/".to_string()),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };

        let merged = base.merge(over);
        assert_eq!(merged.api_base_url.as_deref(), Some("http://override/"));
        assert_eq!(merged.page_size, Some(10));
        assert_eq!(merged.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn file_config_deserializes_camel_case() {
        let merged: Config = serde_json::from_str(
            r#"{"apiBaseUrl": "http://file/", "pageSize": 25}"#,
        )
        .unwrap();
        assert_eq!(merged.api_base_url.as_deref(), Some("http://file/"));
        assert_eq!(merged.page_size, Some(25));
    }
}
