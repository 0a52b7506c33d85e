//! TOML configuration: algebra signature, optional frame and linear map.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use ga_core::{
    ChangeOfBasisProcessor, DEFAULT_EPSILON, FloatProcessor, OrthonormalProcessor, Outermorphism,
    ProductStrategy, Signature, Storage,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub algebra: AlgebraConfig,
    pub frame: Option<FrameConfig>,
    pub outermorphism: Option<OutermorphismConfig>,
    /// Sections this version does not understand; reported, then ignored.
    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AlgebraConfig {
    pub positive: u32,
    pub negative: u32,
    pub zero: u32,
    /// Per-basis-vector squares (1, -1, 0); overrides the counts.
    pub squares: Option<Vec<i32>>,
    pub epsilon: f64,
    pub strategy: ProductStrategy,
}

impl Default for AlgebraConfig {
    fn default() -> Self {
        Self {
            positive: 3,
            negative: 0,
            zero: 0,
            squares: None,
            epsilon: DEFAULT_EPSILON,
            strategy: ProductStrategy::Auto,
        }
    }
}

/// Frame vectors in orthonormal coordinates, one per basis vector.
#[derive(Debug, Deserialize)]
pub struct FrameConfig {
    pub vectors: Vec<Vec<f64>>,
}

/// Images of the basis vectors, in orthonormal coordinates.
#[derive(Debug, Deserialize)]
pub struct OutermorphismConfig {
    pub images: Vec<Vec<f64>>,
}

impl Config {
    /// Config from `path`, or the 3D Euclidean default when there is none.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        for section in config.extra.keys() {
            tracing::warn!("ignoring unknown config section [{section}]");
        }
        Ok(config)
    }

    pub fn signature(&self) -> Result<Signature> {
        let algebra = &self.algebra;
        let signature = match &algebra.squares {
            Some(squares) => Signature::try_from(squares.clone()),
            None => Signature::new(algebra.positive, algebra.negative, algebra.zero),
        };
        signature.context("invalid [algebra] signature")
    }

    pub fn orthonormal(&self) -> Result<OrthonormalProcessor<FloatProcessor>> {
        let scalar =
            FloatProcessor::new(self.algebra.epsilon).context("invalid [algebra] epsilon")?;
        let ortho = OrthonormalProcessor::new(self.signature()?, scalar);
        Ok(ortho.with_strategy(self.algebra.strategy))
    }

    /// Change-of-basis processor for the configured frame, if any.
    pub fn change_of_basis(&self) -> Result<Option<ChangeOfBasisProcessor<FloatProcessor>>> {
        let Some(frame) = &self.frame else {
            return Ok(None);
        };
        let ortho = self.orthonormal()?;
        let n = ortho.dimension();
        let vectors = frame
            .vectors
            .iter()
            .map(|v| Storage::vector_checked(n, v.clone()))
            .collect::<ga_core::Result<Vec<_>>>()
            .context("invalid [frame] vectors")?;
        let processor =
            ChangeOfBasisProcessor::from_frame(ortho, vectors).context("invalid [frame]")?;
        Ok(Some(processor))
    }

    pub fn outermorphism(&self) -> Result<Option<Outermorphism<f64>>> {
        let Some(map) = &self.outermorphism else {
            return Ok(None);
        };
        let ortho = self.orthonormal()?;
        let map = Outermorphism::from_columns(
            ortho.scalar_processor(),
            ortho.dimension(),
            map.images.clone(),
        )
        .context("invalid [outermorphism] images")?;
        Ok(Some(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_euclidean_3d() {
        let config = Config::default();
        let signature = config.signature().unwrap();
        assert_eq!(signature.dimension(), 3);
        assert!(signature.is_euclidean());
        assert!(config.change_of_basis().unwrap().is_none());
    }

    #[test]
    fn test_counts_and_strategy() {
        let config = Config::from_toml(
            r#"
[algebra]
positive = 3
negative = 1
strategy = "gbt"
"#,
        )
        .unwrap();
        assert_eq!(config.signature().unwrap().to_string(), "Cl(3,1,0)");
        assert_eq!(config.orthonormal().unwrap().strategy(), ProductStrategy::Gbt);
    }

    #[test]
    fn test_squares_override_counts() {
        let config = Config::from_toml("[algebra]\nsquares = [0, 1, -1]\n").unwrap();
        let signature = config.signature().unwrap();
        assert_eq!(signature.to_string(), "Cl(1,1,1)");
        assert!(Config::from_toml("[algebra]\nsquares = [2]\n").unwrap().signature().is_err());
    }

    #[test]
    fn test_frame_and_outermorphism() {
        let config = Config::from_toml(
            r#"
[algebra]
positive = 2

[frame]
vectors = [[1.0, 0.0], [1.0, 1.0]]

[outermorphism]
images = [[0.0, 1.0], [-1.0, 0.0]]
"#,
        )
        .unwrap();
        assert!(config.change_of_basis().unwrap().is_some());
        let map = config.outermorphism().unwrap().unwrap();
        assert_eq!(map.domain_dimension(), 2);
    }

    #[test]
    fn test_bad_frame_is_rejected() {
        let config =
            Config::from_toml("[algebra]\npositive = 2\n[frame]\nvectors = [[1.0, 0.0]]\n")
                .unwrap();
        assert!(config.change_of_basis().is_err());
    }

    #[test]
    fn test_unknown_sections_are_kept_aside() {
        let config = Config::from_toml("[render]\nscale = 2\n").unwrap();
        assert!(config.extra.contains_key("render"));
        assert_eq!(config.signature().unwrap().dimension(), 3);
    }
}
