/// Configuration management using figment
///
/// Loads configuration with this precedence (highest wins):
/// 1. Defaults (hardcoded)
/// 2. TOML file: fedrank.toml (in working directory)
/// 3. Environment variables: prefixed FEDRANK_, nested keys split on `__`
///    (e.g., FEDRANK_LOG_LEVEL=debug, FEDRANK_MERGING__METHOD__TYPE=ssl)
///
/// Values are only shaped here; parameters are validated when a section is
/// built into algorithm values.

use figment::{
    Figment,
    providers::{Env, Format, Toml, Serialized},
};
use serde::{Deserialize, Serialize};
use crate::errors::{FedRankError, Result};
use crate::merging::{Cori, MergingMethod, Safe, Ssl};
use crate::merging::{cori, safe, ssl};
use crate::norm::{Normalization, ScoreNormalizer};
use crate::pipeline::FederatedQuery;
use crate::selection::{RankCutoff, ResourceSelection, SelectionMethod, DEFAULT_COMPLETE_RANK_CUTOFF};

pub const CONFIG_FILE: &str = "fedrank.toml";
pub const ENV_PREFIX: &str = "FEDRANK_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional file path for JSON log output (in addition to stderr)
    #[serde(default)]
    pub log_file: Option<String>,

    #[serde(default)]
    pub selection: SelectionConfig,

    /// Normalizer for per-source result lists (plain merging, CORI base).
    #[serde(default)]
    pub normalization: NormalizationConfig,

    #[serde(default)]
    pub merging: MergingConfig,

    /// Search only this many of the best resources; all when unset.
    #[serde(default)]
    pub top_resources: Option<usize>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_log_level(),
            log_file: None,
            selection: SelectionConfig::default(),
            normalization: NormalizationConfig::default(),
            merging: MergingConfig::default(),
            top_resources: None,
        }
    }
}

/// Resource selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default)]
    pub method: SelectionMethod,

    /// Cutoff as a rank in the full collections.
    #[serde(default = "default_complete_rank_cutoff")]
    pub complete_rank_cutoff: Option<usize>,

    /// Cutoff as a rank in the sample ranking; takes precedence when set.
    #[serde(default)]
    pub sample_rank_cutoff: Option<usize>,
}

fn default_complete_rank_cutoff() -> Option<usize> {
    Some(DEFAULT_COMPLETE_RANK_CUTOFF)
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            method: SelectionMethod::default(),
            complete_rank_cutoff: default_complete_rank_cutoff(),
            sample_rank_cutoff: None,
        }
    }
}

impl SelectionConfig {
    pub fn cutoff(&self) -> RankCutoff {
        match (self.sample_rank_cutoff, self.complete_rank_cutoff) {
            (Some(rank), _) => RankCutoff::Sample(rank),
            (None, Some(rank)) => RankCutoff::Complete(rank),
            (None, None) => RankCutoff::default(),
        }
    }

    pub fn build(&self) -> Result<ResourceSelection> {
        ResourceSelection::new(self.method, self.cutoff())
    }
}

/// Score normalization configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizationConfig {
    #[serde(default)]
    pub method: Normalization,

    #[serde(default)]
    pub rank_cutoff: Option<usize>,
}

impl NormalizationConfig {
    pub fn build(&self) -> Result<ScoreNormalizer> {
        let normalizer = ScoreNormalizer::new(self.method);
        match self.rank_cutoff {
            Some(cutoff) => normalizer.with_rank_cutoff(cutoff),
            None => Ok(normalizer),
        }
    }
}

/// Results merging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergingConfig {
    #[serde(default)]
    pub method: MergingMethodConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MergingMethodConfig {
    /// The `[normalization]` normalizer on its own.
    Normalize,
    Cori {
        #[serde(default = "default_lambda")]
        lambda: f64,
    },
    Ssl {
        #[serde(default = "default_max_training_points")]
        max_training_points: usize,
        #[serde(default = "default_min_training_points")]
        min_training_points: usize,
    },
    Safe {
        #[serde(default = "default_min_observations")]
        min_observations: usize,
    },
}

fn default_lambda() -> f64 {
    cori::DEFAULT_LAMBDA
}

fn default_max_training_points() -> usize {
    ssl::DEFAULT_MAX_TRAINING_POINTS
}

fn default_min_training_points() -> usize {
    ssl::DEFAULT_MIN_TRAINING_POINTS
}

fn default_min_observations() -> usize {
    safe::DEFAULT_MIN_OBSERVATIONS
}

impl Default for MergingMethodConfig {
    fn default() -> Self {
        MergingMethodConfig::Cori { lambda: default_lambda() }
    }
}

impl MergingConfig {
    /// `normalizer` is the configured per-source normalizer.
    pub fn build(&self, normalizer: ScoreNormalizer) -> Result<MergingMethod> {
        Ok(match self.method {
            MergingMethodConfig::Normalize => MergingMethod::Normalize(normalizer),
            MergingMethodConfig::Cori { lambda } => MergingMethod::Cori(Cori::new(lambda, normalizer)?),
            MergingMethodConfig::Ssl { max_training_points, min_training_points } => {
                MergingMethod::Ssl(Ssl::new(max_training_points, min_training_points)?)
            }
            MergingMethodConfig::Safe { min_observations } => {
                MergingMethod::Safe(Safe::new(min_observations)?)
            }
        })
    }
}

impl Config {
    /// Load configuration from defaults, TOML file, and environment variables
    ///
    /// Environment variables override TOML file values.
    /// Example: FEDRANK_LOG_LEVEL=debug overrides log_level in fedrank.toml
    pub fn load() -> Result<Config> {
        Self::extract(
            Self::figment()
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    fn figment() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    fn extract(figment: Figment) -> Result<Config> {
        figment
            .extract()
            .map_err(|e| FedRankError::Config(format!("Failed to load config: {}", e)))
    }

    /// Build the configured query pipeline, validating every parameter.
    pub fn pipeline(&self) -> Result<FederatedQuery> {
        let selection = self.selection.build()?;
        let merging = self.merging.build(self.normalization.build()?)?;
        let query = FederatedQuery::new(selection, merging);
        match self.top_resources {
            Some(top) => query.with_top_resources(top),
            None => Ok(query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::RankWeighting;

    fn from_toml(toml: &str) -> Result<Config> {
        Config::extract(Config::figment().merge(Toml::string(toml)))
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_file, None);
        assert_eq!(config.selection.cutoff(), RankCutoff::Complete(100));
        assert_eq!(config.normalization.method, Normalization::MinMax);
        assert_eq!(config.merging.method, MergingMethodConfig::Cori { lambda: 0.4 });
        assert!(config.pipeline().is_ok());
    }

    #[test]
    fn test_toml_overrides() {
        let config = from_toml(
            r#"
            log_level = "debug"
            top_resources = 5

            [selection]
            method = { type = "redde", weighting = { type = "crcs_exp", beta = 0.2 } }
            sample_rank_cutoff = 10

            [normalization]
            method = "z_score"
            rank_cutoff = 20

            [merging]
            method = { type = "safe", min_observations = 4 }
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.selection.method,
            SelectionMethod::Redde { weighting: RankWeighting::CrcsExp { beta: 0.2 } }
        );
        assert_eq!(config.selection.cutoff(), RankCutoff::Sample(10));
        assert_eq!(config.normalization.rank_cutoff, Some(20));

        let query = config.pipeline().unwrap();
        assert_eq!(query.top_resources(), Some(5));
        assert_eq!(query.merging(), MergingMethod::Safe(Safe::new(4).unwrap()));
    }

    #[test]
    fn test_partial_method_keeps_defaults() {
        let config = from_toml(
            r#"
            [merging]
            method = { type = "ssl", min_training_points = 4 }
            "#,
        )
        .unwrap();
        assert_eq!(
            config.merging.method,
            MergingMethodConfig::Ssl { max_training_points: 10, min_training_points: 4 }
        );
    }

    #[test]
    fn test_invalid_parameters_fail_on_build() {
        let config = from_toml(
            r#"
            [merging]
            method = { type = "cori", lambda = -1.0 }
            "#,
        )
        .unwrap();
        assert!(config.pipeline().is_err());

        let config = from_toml("[selection]\ncomplete_rank_cutoff = 0").unwrap();
        assert!(config.pipeline().is_err());
    }

    #[test]
    fn test_malformed_config() {
        let err = from_toml("top_resources = \"many\"").unwrap_err();
        assert!(matches!(err, FedRankError::Config(_)));
    }
}
