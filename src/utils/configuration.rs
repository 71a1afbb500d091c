//! Configuration management: built-in defaults, optional TOML file,
//! environment overrides.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::core::kmer::MAX_K;
use crate::detect::branching::BranchingMode;
use crate::detect::complexity::DEFAULT_COMPLEXITY_THRESHOLD;
use crate::detect::traversal::TraversalKind;
use crate::detect::DetectionOptions;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("configuration error: {0}")]
    Load(#[from] ConfigError),
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

/// Complete tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfiguration {
    pub general: GeneralConfig,
    pub graph: GraphConfig,
    pub detection: DetectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output FASTA bank path.
    pub output_path: PathBuf,
    /// Worker threads; 0 selects the number of logical CPUs.
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// K-mer size. Odd sizes avoid self-reverse-complement words.
    pub kmer_size: usize,
    /// Minimum k-mer abundance kept in the graph.
    pub min_coverage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Branching tolerance during path expansion.
    pub branching: BranchingMode,
    /// Flank extension flavor.
    pub extension: TraversalKind,
    /// Low-complexity score cutoff.
    pub complexity_threshold: f64,
    /// Keep bubbles whose score reaches the cutoff.
    pub keep_low_complexity: bool,
}

impl Default for ToolConfiguration {
    fn default() -> Self {
        Self {
            general: GeneralConfig {
                output_path: PathBuf::from("snps.fa"),
                threads: 0,
            },
            graph: GraphConfig {
                kmer_size: 31,
                min_coverage: 1,
            },
            detection: DetectionConfig {
                branching: BranchingMode::Strict,
                extension: TraversalKind::None,
                complexity_threshold: DEFAULT_COMPLEXITY_THRESHOLD,
                keep_low_complexity: false,
            },
        }
    }
}

impl ToolConfiguration {
    /// Layer built-in defaults, an optional TOML file (`snp-forge.toml` in
    /// the working directory unless an explicit path is given) and
    /// `SNP_FORGE__*` environment variables.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigurationError> {
        let defaults = Config::try_from(&Self::default())?;
        let mut builder = Config::builder().add_source(defaults);
        match explicit {
            Some(path) => {
                builder = builder.add_source(File::from(path.to_path_buf()));
            }
            None => {
                builder = builder.add_source(File::with_name("snp-forge").required(false));
            }
        }
        builder = builder.add_source(Environment::with_prefix("SNP_FORGE").separator("__"));

        let configuration: Self = builder.build()?.try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let k = self.graph.kmer_size;
        if !(3..=MAX_K).contains(&k) {
            return Err(ConfigurationError::Invalid {
                message: format!("k-mer size must be in 3..={MAX_K}, got {k}"),
            });
        }
        if k % 2 == 0 {
            warn!("even k-mer size {k} admits self-reverse-complement words; odd sizes are recommended");
        }
        if self.graph.min_coverage == 0 {
            return Err(ConfigurationError::Invalid {
                message: "min_coverage must be at least 1".into(),
            });
        }
        let threshold = self.detection.complexity_threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(ConfigurationError::Invalid {
                message: format!("complexity threshold must be in 0..=100, got {threshold}"),
            });
        }
        Ok(())
    }

    /// Worker count with the 0-means-auto rule applied.
    pub fn effective_threads(&self) -> usize {
        if self.general.threads == 0 {
            num_cpus::get()
        } else {
            self.general.threads
        }
    }

    /// The subset of knobs the detection core consumes.
    pub fn detection_options(&self) -> DetectionOptions {
        DetectionOptions {
            branching: self.detection.branching,
            traversal: self.detection.extension,
            complexity_threshold: self.detection.complexity_threshold,
            keep_low_complexity: self.detection.keep_low_complexity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn defaults_are_valid() {
        let configuration = ToolConfiguration::default();
        assert!(configuration.validate().is_ok());
        assert_eq!(configuration.graph.kmer_size, 31);
        assert_eq!(configuration.detection.branching, BranchingMode::Strict);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut configuration = ToolConfiguration::default();
        configuration.graph.kmer_size = 64;
        assert!(configuration.validate().is_err());

        let mut configuration = ToolConfiguration::default();
        configuration.graph.min_coverage = 0;
        assert!(configuration.validate().is_err());

        let mut configuration = ToolConfiguration::default();
        configuration.detection.complexity_threshold = 150.0;
        assert!(configuration.validate().is_err());
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[graph]\nkmer_size = 21\n\n[detection]\nbranching = \"any\"\nextension = \"unitig\""
        )
        .unwrap();
        let configuration = ToolConfiguration::load(Some(file.path())).unwrap();
        assert_eq!(configuration.graph.kmer_size, 21);
        assert_eq!(configuration.detection.branching, BranchingMode::Any);
        assert_eq!(configuration.detection.extension, TraversalKind::Unitig);
        // untouched keys keep their defaults
        assert_eq!(configuration.graph.min_coverage, 1);
        assert_eq!(
            configuration.detection.complexity_threshold,
            DEFAULT_COMPLEXITY_THRESHOLD
        );
    }
}
