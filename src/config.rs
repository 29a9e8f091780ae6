use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Override globale del base URL di tutti i tool
    pub base_url: Option<String>,
    /// Override per singolo tool (slug -> base URL)
    pub tool_urls: HashMap<String, String>,
    pub output_dir: PathBuf,
    pub poll_interval_ms: u64,
    pub poll_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Override del limite dimensione file dei singoli tool
    pub max_file_size_mb: Option<u64>,
    pub history_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let history_path = match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".convoglia").join("history.jsonl"),
            None => std::env::temp_dir().join("convoglia").join("history.jsonl"),
        };

        Self {
            base_url: None,
            tool_urls: HashMap::new(),
            output_dir: PathBuf::from("."),
            poll_interval_ms: 1500,
            poll_timeout_secs: 300,
            connect_timeout_secs: 30,
            request_timeout_secs: 30,
            max_file_size_mb: None,
            history_path,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CONVOGLIA_BASE_URL") {
            if !url.is_empty() {
                config.base_url = Some(url);
            }
        }

        if let Ok(dir) = std::env::var("CONVOGLIA_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }

        if let Ok(ms) = std::env::var("CONVOGLIA_POLL_INTERVAL_MS") {
            if let Ok(v) = ms.parse() {
                config.poll_interval_ms = v;
            }
        }

        if let Ok(secs) = std::env::var("CONVOGLIA_POLL_TIMEOUT_SECS") {
            if let Ok(v) = secs.parse() {
                config.poll_timeout_secs = v;
            }
        }

        if let Ok(secs) = std::env::var("CONVOGLIA_CONNECT_TIMEOUT_SECS") {
            if let Ok(v) = secs.parse() {
                config.connect_timeout_secs = v;
            }
        }

        if let Ok(secs) = std::env::var("CONVOGLIA_REQUEST_TIMEOUT_SECS") {
            if let Ok(v) = secs.parse() {
                config.request_timeout_secs = v;
            }
        }

        if let Ok(size) = std::env::var("CONVOGLIA_MAX_FILE_SIZE_MB") {
            if let Ok(v) = size.parse() {
                config.max_file_size_mb = Some(v);
            }
        }

        if let Ok(path) = std::env::var("CONVOGLIA_HISTORY") {
            config.history_path = PathBuf::from(path);
        }

        // CONVOGLIA_TOOL_PDF_TO_JPG_URL=... sovrascrive il solo pdf-to-jpg
        for (key, value) in std::env::vars() {
            if let Some(middle) = key
                .strip_prefix("CONVOGLIA_TOOL_")
                .and_then(|rest| rest.strip_suffix("_URL"))
            {
                if !value.is_empty() {
                    let slug = middle.to_lowercase().replace('_', "-");
                    config.tool_urls.insert(slug, value);
                }
            }
        }

        config
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
