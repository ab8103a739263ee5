//! Solver configuration.
//!
//! The defaults reproduce the reference numerical behaviour: force balance rows
//! carry unit weight while rope continuity rows are weighted heavily enough to act
//! as hard constraints.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::linalg::DEFAULT_PIVOT_TOLERANCE;

/// Weight of each force balance row.
pub const FORCE_BALANCE_WEIGHT: f64 = 1.0;

/// Weight of each rope continuity row.
pub const CONTINUITY_WEIGHT: f64 = 1000.0;

/// Efficiencies this close to 1.0 report effective MA equal to the target MA.
pub const EFFICIENCY_TOLERANCE: f64 = 0.01;

/// Tunable parameters of the equilibrium solver.
///
/// # Examples
/// ```
/// use rigx::SolverConfig;
///
/// let config = SolverConfig::from_json_str(r#"{ "continuity_weight": 500.0 }"#)
///     .expect("partial configuration is filled with defaults");
/// assert_eq!(config.continuity_weight, 500.0);
/// assert_eq!(config.force_balance_weight, 1.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Least-squares weight of force balance equations.
    pub force_balance_weight: f64,
    /// Least-squares weight of rope continuity equations.
    pub continuity_weight: f64,
    /// Pivot magnitude below which Gaussian elimination skips a column.
    pub pivot_tolerance: f64,
    /// Distance from 1.0 within which an efficiency counts as lossless when a
    /// target mechanical advantage overrides the result.
    pub efficiency_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            force_balance_weight: FORCE_BALANCE_WEIGHT,
            continuity_weight: CONTINUITY_WEIGHT,
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
            efficiency_tolerance: EFFICIENCY_TOLERANCE,
        }
    }
}

impl SolverConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value fails [`SolverConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise the
    /// errors of [`SolverConfig::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a weight or tolerance is not a
    /// positive finite number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("force_balance_weight", self.force_balance_weight)?;
        positive("continuity_weight", self.continuity_weight)?;
        positive("pivot_tolerance", self.pivot_tolerance)?;
        if !self.efficiency_tolerance.is_finite() || self.efficiency_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "efficiency_tolerance must be a non-negative number (received {})",
                self.efficiency_tolerance
            )));
        }
        Ok(())
    }
}

/// Parameters of the skate-block bisection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkateBlockConfig {
    /// Vertical residual accepted, relative to `max(load_weight, 1)`.
    pub tolerance: f64,
    /// Upper bound on bisection steps.
    pub max_iterations: usize,
    /// Largest sag below the lower anchor searched before giving up.
    pub max_sag: f64,
}

impl Default for SkateBlockConfig {
    fn default() -> Self {
        Self {
            tolerance: 1.0e-9,
            max_iterations: 200,
            max_sag: 1.0e6,
        }
    }
}

impl SkateBlockConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value fails [`SkateBlockConfig::validate`].
    ///
    /// # Examples
    /// ```
    /// use rigx::SkateBlockConfig;
    ///
    /// let config = SkateBlockConfig::from_json_str(r#"{ "max_iterations": 50 }"#)
    ///     .expect("partial configuration is filled with defaults");
    /// assert_eq!(config.max_iterations, 50);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise the
    /// errors of [`SkateBlockConfig::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a non-positive tolerance or sag
    /// limit, or a zero iteration budget.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tolerance", self.tolerance)?;
        positive("max_sag", self.max_sag)?;
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reject values that are not strictly positive and finite.
fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be positive (received {value})"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let config = SolverConfig::default();
        assert_eq!(config.force_balance_weight, 1.0);
        assert_eq!(config.continuity_weight, 1000.0);
        assert_eq!(config.pivot_tolerance, 1.0e-10);
        assert_eq!(config.efficiency_tolerance, 0.01);
        config.validate().expect("defaults are valid");
        SkateBlockConfig::default()
            .validate()
            .expect("defaults are valid");
    }

    #[test]
    fn json_roundtrip_preserves_values() {
        let config = SolverConfig {
            continuity_weight: 250.0,
            ..SolverConfig::default()
        };
        let json = serde_json::to_string(&config).expect("serialises");
        let parsed = SolverConfig::from_json_str(&json).expect("parses");
        assert_eq!(parsed, config);
    }

    #[test]
    fn empty_object_yields_defaults() {
        let parsed = SolverConfig::from_json_str("{}").expect("parses");
        assert_eq!(parsed, SolverConfig::default());
    }

    #[test]
    fn non_positive_weight_is_rejected() {
        let error = SolverConfig::from_json_str(r#"{ "continuity_weight": 0.0 }"#)
            .expect_err("zero weight rejected");
        assert!(matches!(error, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let error = SolverConfig::from_json_str("{ continuity_weight: }").expect_err("invalid");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error = SolverConfig::from_path("/nonexistent/rigx-config.json")
            .expect_err("missing file rejected");
        assert!(matches!(error, ConfigError::Io(_)));
    }

    #[test]
    fn skate_block_config_rejects_zero_iterations() {
        let config = SkateBlockConfig {
            max_iterations: 0,
            ..SkateBlockConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn skate_block_config_loads_with_defaults() {
        let parsed = SkateBlockConfig::from_json_str(r#"{ "max_sag": 500.0 }"#).expect("parses");
        assert_eq!(parsed.max_sag, 500.0);
        assert_eq!(parsed.max_iterations, 200);
    }

    #[test]
    fn skate_block_config_loader_validates() {
        let error = SkateBlockConfig::from_json_str(r#"{ "max_iterations": 0 }"#)
            .expect_err("zero iterations rejected");
        assert!(matches!(error, ConfigError::Invalid(_)));
        let error = SkateBlockConfig::from_json_str(r#"{ "tolerance": -1.0 }"#)
            .expect_err("negative tolerance rejected");
        assert!(matches!(error, ConfigError::Invalid(_)));
        let error = SkateBlockConfig::from_path("/nonexistent/rigx-skate.json")
            .expect_err("missing file rejected");
        assert!(matches!(error, ConfigError::Io(_)));
    }
}
