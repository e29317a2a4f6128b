//! Deformer configuration.

use serde::{Deserialize, Serialize};
use vdeform_detail::DetailMode;
use vdeform_operators::OperatorSettings;

use crate::{DeformError, Result};

/// Settings for a [`Deformer`](crate::Deformer).
///
/// ```
/// use vdeform::{DeformConfig, DetailMode, LaplacianKind};
///
/// let config = DeformConfig::from_toml_str(
///     r#"
///     detail = "deformation_transfer"
///
///     [operators]
///     laplacian = "uniform"
///     "#,
/// )
/// .unwrap();
/// assert_eq!(config.detail, DetailMode::DeformationTransfer);
/// assert_eq!(config.operators.laplacian, LaplacianKind::Uniform);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeformConfig {
    /// Detail model used by [`ViewMode::Deformed`](crate::ViewMode::Deformed).
    pub detail: DetailMode,
    /// Operator assembly.
    pub operators: OperatorSettings,
}

impl DeformConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| DeformError::InvalidConfig(e.to_string()))
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        self.operators
            .validate()
            .map_err(|e| DeformError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vdeform_operators::{LaplacianKind, MassKind};

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(DeformConfig::from_toml_str("").unwrap(), DeformConfig::default());
    }

    #[test]
    fn test_partial_operator_table() {
        let config = DeformConfig::from_toml_str(
            r#"
            [operators]
            mass = "barycentric"
            cot_clamp = 50.0
            "#,
        )
        .unwrap();
        assert_eq!(config.operators.mass, MassKind::Barycentric);
        assert_eq!(config.operators.laplacian, LaplacianKind::Cotangent);
        assert_eq!(config.operators.cot_clamp, 50.0);
        assert_eq!(config.detail, DetailMode::Displacement);
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = DeformConfig {
            detail: DetailMode::DeformationTransfer,
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(DeformConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_rejects_unknown_mode_and_bad_values() {
        assert!(matches!(
            DeformConfig::from_toml_str(r#"detail = "sculpt""#),
            Err(DeformError::Toml(_))
        ));
        assert!(matches!(
            DeformConfig::from_toml_str("[operators]\narea_epsilon = -1.0"),
            Err(DeformError::InvalidConfig(_))
        ));
    }
}
