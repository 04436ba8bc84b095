use config::{Config, ConfigError, Environment, File, FileFormat};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{env, fmt};

pub static SETTINGS: Lazy<Settings> = Lazy::new(|| Settings::new().expect("Failed to setup settings"));

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
const DEFAULT_MAX_UPLOAD_SIZE: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct App {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub http_port: u16,
    pub request_timeout: Option<u64>,
    pub max_upload_size: Option<usize>,
}

impl Server {
    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_size.unwrap_or(DEFAULT_MAX_UPLOAD_SIZE)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tracer {
    pub uri: String,
}

/// Location of the pretrained cascade loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Detector {
    pub cascade_path: String,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub environment: Option<String>,
    pub server: Server,
    pub logger: Option<Logger>,
    pub tracer: Option<Tracer>,
    pub detector: Detector,
    pub app: App,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .add_source(File::with_name("conf/config.toml").format(FileFormat::Toml))
            .add_source(File::with_name("conf/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(File::with_name("conf/local").required(false))
            .add_source(Environment::default().separator("__"));

        if let Ok(port) = env::var("PORT") {
            builder = builder.set_override("server.http_port", port)?;
        }

        builder.build()?.try_deserialize()
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "http://localhost:{}", &self.http_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let settings = match Settings::new() {
            Ok(settings) => settings,
            Err(e) => {
                println!("{:?}", e);
                return;
            }
        };

        assert!(!settings.detector.cascade_path.is_empty());
        assert!(settings.server.request_timeout_secs() > 0);
    }

    #[test]
    fn test_server_defaults() {
        let server = Server {
            http_port: 5000,
            request_timeout: None,
            max_upload_size: None,
        };

        assert_eq!(server.request_timeout_secs(), DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(server.max_upload_bytes(), DEFAULT_MAX_UPLOAD_SIZE);
        assert_eq!(server.to_string(), "http://localhost:5000");
    }
}
