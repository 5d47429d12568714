use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default bytes per chunk (1 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Configuration for chunked uploads
#[derive(Debug, Clone)]
pub struct FluxConfig {
    /// Base directory of the local chunk store
    pub upload_dir: PathBuf,

    /// Bytes per chunk sent by the client driver
    pub chunk_size: usize,

    /// Pause between chunk uploads in the client driver
    pub upload_delay: Duration,

    /// Serialize chunk writes, completion and cancellation per upload
    pub serialize_per_upload: bool,
}

impl Default for FluxConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            upload_delay: Duration::from_secs(1),
            serialize_per_upload: true,
        }
    }
}

impl FluxConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `FLUX_UPLOAD_DIR`, `FLUX_CHUNK_SIZE`, `FLUX_UPLOAD_DELAY_MS` and
    /// `FLUX_SERIALIZE_UPLOADS`, keeping defaults for anything unset or unparsable
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            upload_dir: std::env::var("FLUX_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            chunk_size: env_var_or("FLUX_CHUNK_SIZE", defaults.chunk_size).max(1),
            upload_delay: Duration::from_millis(env_var_or(
                "FLUX_UPLOAD_DELAY_MS",
                defaults.upload_delay.as_millis() as u64,
            )),
            serialize_per_upload: env_var_or(
                "FLUX_SERIALIZE_UPLOADS",
                defaults.serialize_per_upload,
            ),
        }
    }

    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    /// Set chunk size; zero is bumped to one byte
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }

    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = delay;
        self
    }

    pub fn with_serialize_per_upload(mut self, enabled: bool) -> Self {
        self.serialize_per_upload = enabled;
        self
    }
}

/// Parse an environment variable, falling back to `default`
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
