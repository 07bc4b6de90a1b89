//! Configuration types for the cleaning pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};

/// How missing values are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImputationMode {
    /// Pick mean/median/mode/"unknown" per column from its profile
    #[default]
    Adaptive,
    /// Median for numeric columns, "unknown" for categorical columns
    Fixed,
}

/// Strategy for handling outliers in numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutlierPolicy {
    /// Clip values to the IQR bounds, keeping every row
    #[default]
    Cap,
    /// Drop rows whose value falls outside the IQR bounds
    Remove,
}

/// Configuration for the cleaning pipeline.
///
/// Use [`CleaningConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use dqi_cleaner::config::{CleaningConfig, ImputationMode, OutlierPolicy};
///
/// let config = CleaningConfig::builder()
///     .imputation_mode(ImputationMode::Fixed)
///     .outlier_policy(OutlierPolicy::Remove)
///     .generate_plots(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Imputation strategy selection.
    /// Default: Adaptive
    pub imputation_mode: ImputationMode,

    /// Outlier treatment policy.
    /// Default: Cap
    pub outlier_policy: OutlierPolicy,

    /// Whether to chart every numeric column of the cleaned table.
    /// Only takes effect when a plot renderer is attached to the pipeline.
    /// Default: false
    pub generate_plots: bool,

    /// Fraction of cells that must parse as numbers for a column to become numeric.
    /// Default: 0.5
    pub numeric_ratio_threshold: f64,

    /// Missing ratio above which adaptive imputation falls back to median/"unknown".
    /// Default: 0.3
    pub missing_ratio_threshold: f64,

    /// Absolute skewness below which numeric columns are filled with the mean.
    /// Default: 0.5
    pub skewness_threshold: f64,

    /// Share of the modal value above which categorical columns are filled with it.
    /// Default: 0.5
    pub mode_share_threshold: f64,

    /// Multiplier applied to the IQR when computing outlier bounds.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Replace negative numeric values with the column median.
    /// Default: false
    pub correct_negative_values: bool,

    /// Drop document rows that repeat the header cell for cell.
    /// Default: false
    pub skip_repeated_headers: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            imputation_mode: ImputationMode::default(),
            outlier_policy: OutlierPolicy::default(),
            generate_plots: false,
            numeric_ratio_threshold: 0.5,
            missing_ratio_threshold: 0.3,
            skewness_threshold: 0.5,
            mode_share_threshold: 0.5,
            iqr_multiplier: 1.5,
            correct_negative_values: false,
            skip_repeated_headers: false,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let ratios = [
            ("numeric_ratio_threshold", self.numeric_ratio_threshold),
            ("missing_ratio_threshold", self.missing_ratio_threshold),
            ("mode_share_threshold", self.mode_share_threshold),
        ];
        for (field, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::InvalidThreshold {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if !self.skewness_threshold.is_finite() || self.skewness_threshold < 0.0 {
            return Err(ConfigValidationError::InvalidSkewnessThreshold(
                self.skewness_threshold,
            ));
        }

        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid skewness threshold: {0} (must be a non-negative number)")]
    InvalidSkewnessThreshold(f64),

    #[error("Invalid IQR multiplier: {0} (must be a non-negative number)")]
    InvalidIqrMultiplier(f64),

    #[error("Plots were requested but no plot renderer is attached")]
    MissingPlotRenderer,
}

impl From<ConfigValidationError> for crate::error::CleaningError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::CleaningError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    imputation_mode: Option<ImputationMode>,
    outlier_policy: Option<OutlierPolicy>,
    generate_plots: Option<bool>,
    numeric_ratio_threshold: Option<f64>,
    missing_ratio_threshold: Option<f64>,
    skewness_threshold: Option<f64>,
    mode_share_threshold: Option<f64>,
    iqr_multiplier: Option<f64>,
    correct_negative_values: Option<bool>,
    skip_repeated_headers: Option<bool>,
}

impl CleaningConfigBuilder {
    /// Set how missing values are imputed.
    pub fn imputation_mode(mut self, mode: ImputationMode) -> Self {
        self.imputation_mode = Some(mode);
        self
    }

    /// Set the outlier treatment policy.
    pub fn outlier_policy(mut self, policy: OutlierPolicy) -> Self {
        self.outlier_policy = Some(policy);
        self
    }

    /// Enable or disable histogram generation for numeric columns.
    pub fn generate_plots(mut self, generate: bool) -> Self {
        self.generate_plots = Some(generate);
        self
    }

    /// Set the parse ratio a column needs to be treated as numeric.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.5 = more than half)
    pub fn numeric_ratio_threshold(mut self, threshold: f64) -> Self {
        self.numeric_ratio_threshold = Some(threshold);
        self
    }

    /// Set the missing ratio above which the robust fill is always used.
    pub fn missing_ratio_threshold(mut self, threshold: f64) -> Self {
        self.missing_ratio_threshold = Some(threshold);
        self
    }

    /// Set the absolute skewness under which mean imputation is chosen.
    pub fn skewness_threshold(mut self, threshold: f64) -> Self {
        self.skewness_threshold = Some(threshold);
        self
    }

    /// Set the modal share above which mode imputation is chosen.
    pub fn mode_share_threshold(mut self, threshold: f64) -> Self {
        self.mode_share_threshold = Some(threshold);
        self
    }

    /// Set the IQR multiplier for outlier bounds.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Enable or disable replacing negative numeric values with the median.
    pub fn correct_negative_values(mut self, correct: bool) -> Self {
        self.correct_negative_values = Some(correct);
        self
    }

    /// Enable or disable dropping repeated header rows from table documents.
    pub fn skip_repeated_headers(mut self, skip: bool) -> Self {
        self.skip_repeated_headers = Some(skip);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let defaults = CleaningConfig::default();
        let config = CleaningConfig {
            imputation_mode: self.imputation_mode.unwrap_or_default(),
            outlier_policy: self.outlier_policy.unwrap_or_default(),
            generate_plots: self.generate_plots.unwrap_or(defaults.generate_plots),
            numeric_ratio_threshold: self
                .numeric_ratio_threshold
                .unwrap_or(defaults.numeric_ratio_threshold),
            missing_ratio_threshold: self
                .missing_ratio_threshold
                .unwrap_or(defaults.missing_ratio_threshold),
            skewness_threshold: self
                .skewness_threshold
                .unwrap_or(defaults.skewness_threshold),
            mode_share_threshold: self
                .mode_share_threshold
                .unwrap_or(defaults.mode_share_threshold),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            correct_negative_values: self
                .correct_negative_values
                .unwrap_or(defaults.correct_negative_values),
            skip_repeated_headers: self
                .skip_repeated_headers
                .unwrap_or(defaults.skip_repeated_headers),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CleaningConfig::default();
        assert_eq!(config.imputation_mode, ImputationMode::Adaptive);
        assert_eq!(config.outlier_policy, OutlierPolicy::Cap);
        assert!(!config.generate_plots);
        assert_eq!(config.missing_ratio_threshold, 0.3);
        assert_eq!(config.iqr_multiplier, 1.5);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = CleaningConfig::builder()
            .imputation_mode(ImputationMode::Fixed)
            .outlier_policy(OutlierPolicy::Remove)
            .generate_plots(true)
            .iqr_multiplier(3.0)
            .correct_negative_values(true)
            .build()
            .unwrap();

        assert_eq!(config.imputation_mode, ImputationMode::Fixed);
        assert_eq!(config.outlier_policy, OutlierPolicy::Remove);
        assert!(config.generate_plots);
        assert_eq!(config.iqr_multiplier, 3.0);
        assert!(config.correct_negative_values);
        // Untouched fields keep their defaults
        assert_eq!(config.skewness_threshold, 0.5);
    }

    #[test]
    fn test_validation_invalid_threshold() {
        let result = CleaningConfig::builder()
            .missing_ratio_threshold(1.5)
            .build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { .. }
        ));
    }

    #[test]
    fn test_validation_negative_multiplier() {
        let result = CleaningConfig::builder().iqr_multiplier(-1.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidIqrMultiplier(_)
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        // Missing fields fall back to defaults
        let json = r#"{
            "imputation_mode": "fixed",
            "outlier_policy": "remove",
            "generate_plots": true
        }"#;

        let config: CleaningConfig = serde_json::from_str(json).expect("Should deserialize");

        assert_eq!(config.imputation_mode, ImputationMode::Fixed);
        assert_eq!(config.outlier_policy, OutlierPolicy::Remove);
        assert!(config.generate_plots);
        assert_eq!(config.numeric_ratio_threshold, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = CleaningConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: CleaningConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.outlier_policy, config.outlier_policy);
        assert_eq!(back.mode_share_threshold, config.mode_share_threshold);
    }
}
