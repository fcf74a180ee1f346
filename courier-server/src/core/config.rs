/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | WORK_DIR | ./work_dir | Working directory holding the database and logs |
/// | LOG_LEVEL | info | Log level filter |
/// | LOG_JSON | false | JSON log format (production) |
/// | LOG_DIR | unset | Directory for rotating file logs (console-only if unset) |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/courier LOG_LEVEL=debug cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and log files
    pub work_dir: String,
    /// Log level: trace | debug | info | warn | error
    pub log_level: String,
    /// JSON log format (production)
    pub log_json: bool,
    /// Optional directory for rotating file logs
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Path of the marketplace database inside the working directory
    pub fn db_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("market.redb")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: "./work_dir".into(),
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
        }
    }
}
