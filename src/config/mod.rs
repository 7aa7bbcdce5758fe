use serde::Deserialize;
use std::net::SocketAddr;

const DEFAULT_STREAM_PATH: &str = "/stream";
const DEFAULT_LOG_FILTER: &str = "echo_stream=debug,info";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub stream: StreamConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub tcp_keepalive_secs: Option<u64>,
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8989)),
            tcp_keepalive_secs: None,
            tcp_nodelay: true,
        }
    }
}

/// Options applied to every upgraded session. Never mutated after load.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StreamConfig {
    pub path: String,
    /// `None` keeps the transport's own limit.
    pub max_message_size: Option<usize>,
    pub max_frame_size: Option<usize>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_STREAM_PATH.to_string(),
            max_message_size: None,
            max_frame_size: None,
        }
    }
}

impl StreamConfig {
    /// A literal route that does not collide with `/api`.
    fn validate(&self) -> anyhow::Result<()> {
        if !self.path.starts_with('/') {
            anyhow::bail!("stream.path must start with '/': {:?}", self.path);
        }
        if self.path.contains(['{', '}', '*', ':']) {
            anyhow::bail!("stream.path must be a literal path: {:?}", self.path);
        }
        if self.path == "/api" {
            anyhow::bail!("stream.path cannot be /api");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.stream.validate()?;
        Ok(config)
    }

    /// Reads `path` when given, otherwise falls back to the built-in defaults.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
