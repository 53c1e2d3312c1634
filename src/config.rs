use std::path::PathBuf;
use std::time::Duration;

use tracing::trace;

/// On-disk layout of persisted probe records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkFormat {
    /// One compact JSON object per line
    #[default]
    Lines,

    /// Four-space indented JSON block per record
    Pretty,
}

/// Where probe records are persisted
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum SinkConfig {
    /// Keep records in memory only (dry runs)
    #[serde(rename = "none")]
    None,

    /// Append records to a file
    File {
        #[serde(default = "default_output_path")]
        path: PathBuf,

        #[serde(default)]
        format: SinkFormat,
    },
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig::File {
            path: default_output_path(),
            format: SinkFormat::default(),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProbeConfig {
    /// Newline-delimited list of URLs
    #[serde(default = "default_input_path")]
    pub input: PathBuf,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Cap on probes in flight; `None` launches every target at once
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Capacity of the result channel between probers and the collector
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Drop blank lines from the target list instead of probing them
    #[serde(default)]
    pub skip_blank_lines: bool,

    #[serde(default)]
    pub sink: SinkConfig,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject values that would make every probe fail
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be at least 1 second");
        }
        Ok(())
    }

    /// Layer command-line values over this configuration
    ///
    /// An output path or `pretty` always yields a file sink, even if the
    /// configuration disabled persistence.
    pub fn apply_overrides(mut self, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        if let Some(input) = &overrides.input {
            self.input = input.clone();
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        if overrides.max_concurrency.is_some() {
            self.max_concurrency = overrides.max_concurrency;
        }
        if overrides.skip_blank_lines {
            self.skip_blank_lines = true;
        }

        if overrides.output.is_some() || overrides.pretty {
            let (path, format) = match &self.sink {
                SinkConfig::File { path, format } => (path.clone(), *format),
                SinkConfig::None => (default_output_path(), SinkFormat::default()),
            };
            self.sink = SinkConfig::File {
                path: overrides.output.clone().unwrap_or(path),
                format: if overrides.pretty {
                    SinkFormat::Pretty
                } else {
                    format
                },
            };
        }

        self.validate()?;
        Ok(self)
    }
}

/// Values given on the command line; `None` and `false` keep what the
/// configuration says
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub max_concurrency: Option<usize>,
    pub pretty: bool,
    pub skip_blank_lines: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            input: default_input_path(),
            timeout_secs: default_timeout_secs(),
            max_concurrency: None,
            channel_capacity: default_channel_capacity(),
            skip_blank_lines: false,
            sink: SinkConfig::default(),
        }
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("urls.txt")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("results.txt")
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_channel_capacity() -> usize {
    1
}

pub fn read_config_file(path: &str) -> anyhow::Result<ProbeConfig> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))
        .and_then(|config: ProbeConfig| config.validate().map(|_| config))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
