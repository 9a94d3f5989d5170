//! Configuration for the pairing pipeline.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::util::safe_read_to_string;
use crate::error::{Result, SpecimenPairError};
use crate::models::record::SpecimenCategory;

/// Default width of the collection-date window, in days
pub const DEFAULT_MAX_SPAN_DAYS: i64 = 60;

/// Subjects whose cross product exceeds this many pairs are logged
pub const DEFAULT_CROSS_PRODUCT_WARN_THRESHOLD: usize = 64;

/// The two specimen categories to pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPair {
    /// Enumerated first in the cross product
    pub first: SpecimenCategory,
    pub second: SpecimenCategory,
}

impl CategoryPair {
    #[must_use]
    pub const fn new(first: SpecimenCategory, second: SpecimenCategory) -> Self {
        Self { first, second }
    }
}

impl Default for CategoryPair {
    fn default() -> Self {
        Self::new(SpecimenCategory::Blood, SpecimenCategory::Tissue)
    }
}

impl fmt::Display for CategoryPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}

/// Configuration for the `PairingPipeline`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    /// Largest allowed distance, in days, between the first and last
    /// collection dates kept for a subject
    pub max_span_days: i64,
    /// Categories a pair is made of
    pub category_pair: CategoryPair,
    /// Process subjects on the rayon pool for large batches
    pub use_parallel: bool,
    /// Warn when a subject's cross product grows past this size
    pub cross_product_warn_threshold: usize,
    /// Draw a progress bar while processing
    pub show_progress: bool,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            max_span_days: DEFAULT_MAX_SPAN_DAYS,
            category_pair: CategoryPair::default(),
            use_parallel: true,
            cross_product_warn_threshold: DEFAULT_CROSS_PRODUCT_WARN_THRESHOLD,
            show_progress: false,
        }
    }
}

impl PairingConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder for constructing a configuration
    #[must_use]
    pub fn builder() -> PairingConfigBuilder {
        PairingConfigBuilder::new()
    }

    /// Load a configuration from a JSON file; absent keys take defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = safe_read_to_string(path, "loading pairing configuration")?;
        let config: Self = serde_json::from_str(&text)
            .map_err(SpecimenPairError::Json)
            .with_context(|| format!("Invalid pairing configuration in {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> std::result::Result<(), SpecimenPairError> {
        if self.max_span_days < 0 {
            return Err(SpecimenPairError::invalid_config(format!(
                "max_span_days must not be negative, got {}",
                self.max_span_days
            )));
        }
        if self.category_pair.first == self.category_pair.second {
            return Err(SpecimenPairError::invalid_config(format!(
                "category_pair must name two different categories, got {}",
                self.category_pair
            )));
        }
        Ok(())
    }
}

impl fmt::Display for PairingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pairing Configuration:")?;
        writeln!(f, "  Max span: {} days", self.max_span_days)?;
        writeln!(f, "  Category pair: {}", self.category_pair)?;
        writeln!(f, "  Parallel: {}", self.use_parallel)?;
        write!(
            f,
            "  Cross product warning threshold: {}",
            self.cross_product_warn_threshold
        )
    }
}

/// Builder for constructing a pairing configuration
#[derive(Debug, Clone, Default)]
pub struct PairingConfigBuilder {
    config: PairingConfig,
}

impl PairingConfigBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PairingConfig::default(),
        }
    }

    /// Set the window width in days
    #[must_use]
    pub const fn max_span_days(mut self, days: i64) -> Self {
        self.config.max_span_days = days;
        self
    }

    /// Set the two categories to pair
    #[must_use]
    pub fn category_pair(mut self, first: SpecimenCategory, second: SpecimenCategory) -> Self {
        self.config.category_pair = CategoryPair::new(first, second);
        self
    }

    /// Set whether to use parallel processing
    #[must_use]
    pub const fn use_parallel(mut self, parallel: bool) -> Self {
        self.config.use_parallel = parallel;
        self
    }

    /// Set the cross product warning threshold
    #[must_use]
    pub const fn cross_product_warn_threshold(mut self, threshold: usize) -> Self {
        self.config.cross_product_warn_threshold = threshold;
        self
    }

    /// Set whether to draw a progress bar
    #[must_use]
    pub const fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> std::result::Result<PairingConfig, SpecimenPairError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
