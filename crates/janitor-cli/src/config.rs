//! Configuration management for the CLI.
//!
//! Settings are layered: built-in defaults, then the TOML file, then
//! command-line flags.

use crate::cli::{CliFormat, GlobalArgs};
use crate::error::{CliError, Result};
use janitor_aws::S3Location;
use janitor_core::JanitorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
///
/// ```toml
/// regions = ["us-east-1", "us-west-2"]
/// state = "s3://janitor-state/ci"
/// format = "json"
///
/// ttl_hours = 12
/// exclude_tags = ["keep"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Regions to sweep
    pub regions: Vec<String>,

    /// Account to sweep; resolved from credentials when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// AWS profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Ledger location (`s3://bucket/prefix` or a directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Output settings
    pub format: OutputFormat,

    /// Enable colored output
    pub color: bool,

    /// Scan settings
    #[serde(flatten)]
    pub janitor: JanitorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            regions: Vec::new(),
            account: None,
            profile: None,
            state: None,
            format: OutputFormat::Table,
            color: true,
            janitor: JanitorConfig::default(),
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Quiet (totals only) format
    Quiet,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

/// Where per-scope ledgers are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateLocation {
    /// One object per scope under an S3 prefix
    S3(S3Location),
    /// One file per scope under a local directory
    Dir(PathBuf),
}

impl StateLocation {
    /// Parse `s3://bucket/prefix` or treat the value as a directory.
    pub fn parse(value: &str) -> Result<Self> {
        if value.starts_with("s3://") {
            let location = value
                .parse::<S3Location>()
                .map_err(|e| CliError::InvalidInput(format!("Invalid state location: {}", e)))?;
            Ok(StateLocation::S3(location))
        } else {
            Ok(StateLocation::Dir(PathBuf::from(value)))
        }
    }

    /// Per-user default: `<data dir>/aws-janitor/state`.
    pub fn default_dir() -> Result<Self> {
        let data = dirs::data_local_dir()
            .ok_or_else(|| CliError::Config("Could not find a data directory; pass --state".into()))?;
        Ok(StateLocation::Dir(data.join("aws-janitor").join("state")))
    }
}

impl Config {
    /// Default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Could not find config directory".into()))?;
        Ok(dir.join("aws-janitor").join("config.toml"))
    }

    /// Load from `path`, or from the default path if it exists.
    ///
    /// An explicitly named file must exist; a missing default file yields the
    /// built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Overlay command-line flags on top of file settings.
    pub fn apply_args(&mut self, args: &GlobalArgs) {
        if !args.region.is_empty() {
            self.regions = args.region.clone();
        }
        if args.account.is_some() {
            self.account = args.account.clone();
        }
        if args.profile.is_some() {
            self.profile = args.profile.clone();
        }
        if args.state.is_some() {
            self.state = args.state.clone();
        }
        if let Some(format) = args.format {
            self.format = format.into();
        }
        if args.no_color {
            self.color = false;
        }

        let janitor = &mut self.janitor;
        if let Some(ttl) = args.ttl_hours {
            janitor.ttl_hours = ttl;
        }
        if args.dry_run {
            janitor.dry_run = true;
        }
        if let Some(timeout) = args.timeout_secs {
            janitor.adapter_timeout_secs = timeout;
        }
        if !args.only.is_empty() {
            janitor.enabled_types = args.only.clone();
        }
        janitor.disabled_types.extend(args.skip.iter().cloned());
        janitor.include_tags.extend(args.include_tag.iter().cloned());
        janitor.exclude_tags.extend(args.exclude_tag.iter().cloned());
    }

    /// Reject settings no scan can run with.
    pub fn validate(&self, known_types: &[&str]) -> Result<()> {
        if self.regions.is_empty() {
            return Err(CliError::InvalidInput(
                "At least one region is required (--region or `regions` in the config file)".into(),
            ));
        }
        self.janitor
            .validate(known_types)
            .map_err(|e| CliError::InvalidInput(e.to_string()))
    }

    /// Resolved ledger location.
    pub fn state_location(&self) -> Result<StateLocation> {
        match &self.state {
            Some(state) => StateLocation::parse(state),
            None => StateLocation::default_dir(),
        }
    }
}
