use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Personal reading log with cover lookup and CSV export.
#[derive(Parser, Debug, Clone)]
#[command(name = "reading-log")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file.
    #[arg(short, long, env = "READING_LOG_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Google Books API key (overrides the config file).
    #[arg(long, env = "GOOGLE_BOOKS_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the server (default if no command given).
    Serve {
        /// Address to bind the server to.
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// Path to the SQLite database.
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Initialize database and create default config.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },

    /// Export the whole library as CSV.
    Export {
        /// Output file (defaults to reading_log_<timestamp>.csv).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Main configuration from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Cover lookup configuration.
    #[serde(default)]
    pub covers: CoversConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Directory holding `index.html` and the `static/` assets.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::new(
        std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        5000,
    )
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("books.db")
}

/// Cover lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoversConfig {
    /// Whether to look up covers at all.
    #[serde(default = "default_covers_enabled")]
    pub enabled: bool,

    /// Volumes search endpoint.
    #[serde(default = "default_covers_endpoint")]
    pub endpoint: String,

    /// Optional API key to raise quota limits.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds (0 for none).
    #[serde(default)]
    pub timeout_seconds: u64,
}

impl Default for CoversConfig {
    fn default() -> Self {
        Self {
            enabled: default_covers_enabled(),
            endpoint: default_covers_endpoint(),
            api_key: None,
            timeout_seconds: 0,
        }
    }
}

fn default_covers_enabled() -> bool {
    true
}

fn default_covers_endpoint() -> String {
    "https://www.googleapis.com/books/v1/volumes".to_string()
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &PathBuf) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> crate::error::Result<Self> {
        toml::from_str(content).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to parse config file: {}", e))
        })
    }

    /// Find config file in default locations.
    pub fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            PathBuf::from("config.toml"),
            PathBuf::from("reading-log.toml"),
            dirs::config_dir()
                .map(|p| p.join("reading-log").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/reading-log/config.toml"),
        ];

        candidates.into_iter().find(|p| p.is_file())
    }

    /// Generate default config file content.
    pub fn generate_default() -> String {
        r#"# reading-log configuration

[server]
bind = "127.0.0.1:5000"
# Directory containing index.html and static/
static_dir = "."

[database]
path = "books.db"

[covers]
enabled = true
endpoint = "https://www.googleapis.com/books/v1/volumes"
# Optional, raises the anonymous quota
# api_key = ""
# Request timeout in seconds (0 for none)
timeout_seconds = 0
"#
        .to_string()
    }
}
