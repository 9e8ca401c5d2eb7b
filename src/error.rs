use std::path::PathBuf;

/// Vehicle configuration errors. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read vehicle config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed vehicle config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid parameter `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
