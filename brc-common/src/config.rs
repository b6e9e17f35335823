//! Configuration loading and layered resolution
//!
//! Every setting resolves with the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`BRC_*`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The resolved [`BatchConfig`] is an explicit value handed to the pipeline;
//! inner components never read configuration implicitly.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default SQL statement for the query-backed key source.
///
/// Expected to return distinct, non-empty keys ordered by key; the source
/// still trims and drops blanks defensively.
pub const DEFAULT_KEY_QUERY: &str =
    "SELECT DISTINCT s3_path FROM order_documents \
     WHERE s3_path IS NOT NULL AND s3_path != '' ORDER BY s3_path";

/// Default expected brand for classification.
pub const DEFAULT_EXPECTED_BRAND: &str = "Digitalpay";

/// Object store connection settings
#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    /// Base endpoint URL, e.g. `https://storage.example.net`
    pub endpoint: String,
    /// Bucket name, prepended path-style to every key
    pub bucket: String,
    /// Optional basic credentials for the GET requests
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

/// Filesystem locations used by a run
#[derive(Debug, Clone)]
pub struct PathsConfig {
    /// Local cache directory; downloaded objects land here flat
    pub cache_dir: PathBuf,
    /// Input report table (index + key columns)
    pub input_report: PathBuf,
    /// Output report location, replaced atomically each run
    pub output_report: PathBuf,
}

/// Key-source selection: query-backed when `database_url` is set,
/// table-backed otherwise
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub database_url: Option<String>,
    pub key_query: String,
}

/// Classification settings
#[derive(Debug, Clone)]
pub struct ClassifyConfig {
    pub expected_brand: String,
}

/// Fully resolved run configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub object_store: ObjectStoreConfig,
    pub paths: PathsConfig,
    pub source: SourceConfig,
    pub classify: ClassifyConfig,
}

/// Raw TOML schema; every field optional so a partial file still loads
#[derive(Debug, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub object_store: TomlObjectStore,
    #[serde(default)]
    pub paths: TomlPaths,
    #[serde(default)]
    pub source: TomlSource,
    #[serde(default)]
    pub classify: TomlClassify,
}

#[derive(Debug, Default, Deserialize)]
pub struct TomlObjectStore {
    pub endpoint: Option<String>,
    pub bucket: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TomlPaths {
    pub cache_dir: Option<PathBuf>,
    pub input_report: Option<PathBuf>,
    pub output_report: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TomlSource {
    pub database_url: Option<String>,
    pub key_query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TomlClassify {
    pub expected_brand: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file. A missing file is not an error (the
    /// caller falls back to defaults), but an unreadable or malformed
    /// file is.
    pub fn load(path: &Path) -> Result<Option<TomlConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let parsed = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(Some(parsed))
    }
}

/// Command-line overrides collected by the binary and applied on top of
/// environment, file, and defaults
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub bucket: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub input_report: Option<PathBuf>,
    pub output_report: Option<PathBuf>,
    pub database_url: Option<String>,
    pub expected_brand: Option<String>,
}

/// Default config file path: `<platform config dir>/brc/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("brc").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("brc.toml"))
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_path(name: &str) -> Option<PathBuf> {
    env_string(name).map(PathBuf::from)
}

impl BatchConfig {
    /// Resolve the full configuration from overrides, environment,
    /// and an optional TOML file.
    pub fn resolve(overrides: Overrides, config_file: Option<&Path>) -> Result<BatchConfig> {
        let file_path = config_file
            .map(Path::to_path_buf)
            .or_else(|| env_path("BRC_CONFIG"))
            .unwrap_or_else(default_config_path);

        let file = match TomlConfig::load(&file_path)? {
            Some(cfg) => {
                tracing::debug!("Loaded config file: {}", file_path.display());
                cfg
            }
            None => {
                tracing::debug!(
                    "No config file at {}; using environment and defaults",
                    file_path.display()
                );
                TomlConfig::default()
            }
        };

        let endpoint = overrides
            .endpoint
            .or_else(|| env_string("BRC_ENDPOINT"))
            .or(file.object_store.endpoint)
            .ok_or_else(|| Error::Config("object store endpoint is not set".into()))?;

        let bucket = overrides
            .bucket
            .or_else(|| env_string("BRC_BUCKET"))
            .or(file.object_store.bucket)
            .ok_or_else(|| Error::Config("object store bucket is not set".into()))?;

        let access_key = env_string("BRC_ACCESS_KEY").or(file.object_store.access_key);
        let secret_key = env_string("BRC_SECRET_KEY").or(file.object_store.secret_key);

        let cache_dir = overrides
            .cache_dir
            .or_else(|| env_path("BRC_CACHE_DIR"))
            .or(file.paths.cache_dir)
            .unwrap_or_else(|| PathBuf::from("DownloadedFiles"));

        let input_report = overrides
            .input_report
            .or_else(|| env_path("BRC_INPUT_REPORT"))
            .or(file.paths.input_report)
            .unwrap_or_else(|| PathBuf::from("input.csv"));

        let output_report = overrides
            .output_report
            .or_else(|| env_path("BRC_OUTPUT_REPORT"))
            .or(file.paths.output_report)
            .unwrap_or_else(|| PathBuf::from("report.csv"));

        let database_url = overrides
            .database_url
            .or_else(|| env_string("BRC_DATABASE_URL"))
            .or(file.source.database_url);

        let key_query = env_string("BRC_KEY_QUERY")
            .or(file.source.key_query)
            .unwrap_or_else(|| DEFAULT_KEY_QUERY.to_string());

        let expected_brand = overrides
            .expected_brand
            .or_else(|| env_string("BRC_EXPECTED_BRAND"))
            .or(file.classify.expected_brand)
            .unwrap_or_else(|| DEFAULT_EXPECTED_BRAND.to_string());

        let config = BatchConfig {
            object_store: ObjectStoreConfig {
                endpoint,
                bucket,
                access_key,
                secret_key,
            },
            paths: PathsConfig {
                cache_dir,
                input_report,
                output_report,
            },
            source: SourceConfig {
                database_url,
                key_query,
            },
            classify: ClassifyConfig { expected_brand },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.object_store.endpoint.trim().is_empty() {
            return Err(Error::Config("object store endpoint is empty".into()));
        }
        if self.object_store.bucket.trim().is_empty() {
            return Err(Error::Config("object store bucket is empty".into()));
        }
        if self.classify.expected_brand.trim().is_empty() {
            return Err(Error::Config("expected brand is empty".into()));
        }
        Ok(())
    }
}
