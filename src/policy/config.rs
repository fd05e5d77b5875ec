//! Expansion configuration.
//!
//! ## Float Normalization for Deterministic Hashing
//!
//! Floats are quantized to integers before hashing to avoid
//! cross-platform serialization differences. The quantization factor is
//! 1e6 (multiply by 1,000,000 and round to i64).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::canonical::canonical_hash_hex;
use crate::engine::ExpansionError;
use crate::types::VertexId;
use crate::DEFAULT_CONFIG_VERSION;

/// Quantization factor for float normalization.
const FLOAT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// Quantize a float to an i64 for deterministic hashing.
fn quantize_float(value: f64) -> i64 {
    (value * FLOAT_QUANTIZATION_FACTOR).round() as i64
}

/// Per-vertex weights used to normalise degree priority.
///
/// Vertices without an explicit weight weigh 1.0. Weights are never
/// negative, including those loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<VertexId, f64>", into = "BTreeMap<VertexId, f64>")]
pub struct NodeWeights(BTreeMap<VertexId, f64>);

impl NodeWeights {
    /// Create an empty weight table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight of `vertex`.
    pub fn get(&self, vertex: &VertexId) -> f64 {
        self.0.get(vertex).copied().unwrap_or(1.0)
    }

    /// Set the weight of `vertex`. Negative weights are clamped to 0.
    pub fn set(&mut self, vertex: VertexId, weight: f64) {
        self.0.insert(vertex, weight.max(0.0));
    }

    /// Whether no explicit weights are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn to_quantized(&self) -> BTreeMap<String, i64> {
        self.0
            .iter()
            .map(|(v, w)| (v.as_str().to_string(), quantize_float(*w)))
            .collect()
    }
}

impl From<BTreeMap<VertexId, f64>> for NodeWeights {
    fn from(raw: BTreeMap<VertexId, f64>) -> Self {
        raw.into_iter().collect()
    }
}

impl From<NodeWeights> for BTreeMap<VertexId, f64> {
    fn from(weights: NodeWeights) -> Self {
        weights.0
    }
}

impl FromIterator<(VertexId, f64)> for NodeWeights {
    fn from_iter<I: IntoIterator<Item = (VertexId, f64)>>(iter: I) -> Self {
        let mut weights = Self::new();
        for (vertex, weight) in iter {
            weights.set(vertex, weight);
        }
        weights
    }
}

/// Quantized config parameters for deterministic hashing.
#[derive(Debug, Clone, Serialize)]
struct QuantizedConfigParams {
    version: String,
    max_vertices: Option<usize>,
    hub_degree_threshold: Option<usize>,
    node_weights: BTreeMap<String, i64>,
}

/// Engine-wide run configuration.
///
/// ## Parameters
///
/// - `max_vertices`: stop after this many expansions (checked after each pop)
/// - `hub_degree_threshold`: degree at or above which an expanded vertex is
///   tracked as a hub
/// - `node_weights`: divisor weights for degree priority
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionConfig {
    /// Config version identifier.
    pub version: String,
    /// Maximum number of vertices to expand.
    pub max_vertices: Option<usize>,
    /// Hub degree threshold for encounter tracking.
    pub hub_degree_threshold: Option<usize>,
    /// Node weights for degree priority.
    #[serde(default)]
    pub node_weights: NodeWeights,
}

impl ExpansionConfig {
    /// Create a config with explicit limits.
    pub fn new(max_vertices: Option<usize>, hub_degree_threshold: Option<usize>) -> Self {
        Self {
            version: DEFAULT_CONFIG_VERSION.to_string(),
            max_vertices,
            hub_degree_threshold,
            node_weights: NodeWeights::default(),
        }
    }

    /// Small budget suitable for tests.
    pub fn minimal() -> Self {
        Self::new(Some(64), Some(4))
    }

    /// Large budget with hub tracking, for sampling big graphs.
    pub fn exploratory() -> Self {
        Self::new(Some(100_000), Some(50))
    }

    /// Set the vertex budget.
    pub fn with_max_vertices(mut self, max_vertices: usize) -> Self {
        self.max_vertices = Some(max_vertices);
        self
    }

    /// Set the hub threshold.
    pub fn with_hub_degree_threshold(mut self, threshold: usize) -> Self {
        self.hub_degree_threshold = Some(threshold);
        self
    }

    /// Set node weights.
    pub fn with_node_weights(mut self, weights: NodeWeights) -> Self {
        self.node_weights = weights;
        self
    }

    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ExpansionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get the config ID.
    pub fn config_id(&self) -> &str {
        &self.version
    }

    /// Compute a hash of the config parameters.
    ///
    /// Uses quantized float representation so equal configs hash equally
    /// regardless of float formatting.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(&QuantizedConfigParams {
            version: self.version.clone(),
            max_vertices: self.max_vertices,
            hub_degree_threshold: self.hub_degree_threshold,
            node_weights: self.node_weights.to_quantized(),
        })
    }
}

impl Default for ExpansionConfig {
    /// Unbounded: run until the termination policy stops it.
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Quantized adaptive parameters for deterministic hashing.
#[derive(Debug, Clone, Serialize)]
struct QuantizedAdaptiveParams {
    min_paths: usize,
    diversity_threshold: i64,
    salience_feedback_weight: i64,
    plateau_window_size: usize,
    plateau_threshold: i64,
}

/// Parameters for three-phase adaptive expansion.
///
/// ## Parameters
///
/// - `min_paths`: paths needed to leave Discovery, and to stop in Stability
/// - `diversity_threshold`: path diversity (0.0-1.0) needed to stop
/// - `salience_feedback_weight`: lambda in `1 / (1 + lambda * feedback)`
/// - `plateau_window_size`: paths per rolling salience window
/// - `plateau_threshold`: relative improvement below which salience has
///   plateaued
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    /// Minimum discovered paths.
    pub min_paths: usize,
    /// Minimum path diversity to terminate.
    pub diversity_threshold: f64,
    /// Salience feedback weight.
    pub salience_feedback_weight: f64,
    /// Rolling window size, in paths.
    pub plateau_window_size: usize,
    /// Plateau improvement threshold.
    pub plateau_threshold: f64,
}

impl AdaptiveConfig {
    /// Create a config, clamping values into their valid ranges.
    pub fn new(
        min_paths: usize,
        diversity_threshold: f64,
        salience_feedback_weight: f64,
        plateau_window_size: usize,
        plateau_threshold: f64,
    ) -> Self {
        Self {
            min_paths,
            diversity_threshold: diversity_threshold.clamp(0.0, 1.0),
            salience_feedback_weight: salience_feedback_weight.max(0.0),
            plateau_window_size: plateau_window_size.max(1),
            plateau_threshold: plateau_threshold.max(0.0),
        }
    }

    /// Low thresholds: reaches Stability quickly on small graphs.
    pub fn lenient() -> Self {
        Self::new(1, 0.0, 1.0, 1, 0.05)
    }

    /// Parse a config from JSON, clamping out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ExpansionError> {
        let raw: Self = serde_json::from_str(json)?;
        Ok(Self::new(
            raw.min_paths,
            raw.diversity_threshold,
            raw.salience_feedback_weight,
            raw.plateau_window_size,
            raw.plateau_threshold,
        ))
    }

    /// Compute a hash of the adaptive parameters.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(&QuantizedAdaptiveParams {
            min_paths: self.min_paths,
            diversity_threshold: quantize_float(self.diversity_threshold),
            salience_feedback_weight: quantize_float(self.salience_feedback_weight),
            plateau_window_size: self.plateau_window_size,
            plateau_threshold: quantize_float(self.plateau_threshold),
        })
    }
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            min_paths: 5,
            diversity_threshold: 0.6,
            salience_feedback_weight: 1.0,
            plateau_window_size: 5,
            plateau_threshold: 0.05,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_hash_determinism() {
        assert_eq!(
            ExpansionConfig::default().params_hash(),
            ExpansionConfig::default().params_hash()
        );
    }

    #[test]
    fn test_params_hash_changes() {
        let base = ExpansionConfig::default();
        let bounded = ExpansionConfig::default().with_max_vertices(10);
        assert_ne!(base.params_hash(), bounded.params_hash());

        let mut weights = NodeWeights::new();
        weights.set(VertexId::from("a"), 2.0);
        let weighted = ExpansionConfig::default().with_node_weights(weights);
        assert_ne!(base.params_hash(), weighted.params_hash());
    }

    #[test]
    fn test_node_weights_default_one() {
        let mut weights = NodeWeights::new();
        assert_eq!(weights.get(&VertexId::from("x")), 1.0);
        weights.set(VertexId::from("x"), -3.0);
        assert_eq!(weights.get(&VertexId::from("x")), 0.0);
    }

    #[test]
    fn test_config_from_json() {
        let config = ExpansionConfig::from_json(
            r#"{"version":"expansion_config_v1","max_vertices":100,"hub_degree_threshold":null}"#,
        )
        .unwrap();
        assert_eq!(config.max_vertices, Some(100));
        assert!(config.node_weights.is_empty());

        assert!(ExpansionConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_config_from_json_clamps_weights() {
        let config = ExpansionConfig::from_json(
            r#"{"version":"expansion_config_v1","max_vertices":null,"hub_degree_threshold":null,"node_weights":{"H":-5.0,"L":2.5}}"#,
        )
        .unwrap();
        assert_eq!(config.node_weights.get(&VertexId::from("H")), 0.0);
        assert_eq!(config.node_weights.get(&VertexId::from("L")), 2.5);

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""node_weights":{"H":0.0,"L":2.5}"#));
    }

    #[test]
    fn test_presets() {
        let minimal = ExpansionConfig::minimal();
        assert_eq!(minimal.max_vertices, Some(64));
        assert_eq!(minimal.config_id(), crate::DEFAULT_CONFIG_VERSION);

        let exploratory = ExpansionConfig::exploratory();
        assert!(exploratory.max_vertices > minimal.max_vertices);
        assert_ne!(minimal.params_hash(), exploratory.params_hash());
        assert_eq!(ExpansionConfig::default().max_vertices, None);
    }

    #[test]
    fn test_adaptive_clamping() {
        let config = AdaptiveConfig::new(3, 1.7, -2.0, 0, -0.1);
        assert_eq!(config.diversity_threshold, 1.0);
        assert_eq!(config.salience_feedback_weight, 0.0);
        assert_eq!(config.plateau_window_size, 1);
        assert_eq!(config.plateau_threshold, 0.0);
    }

    #[test]
    fn test_adaptive_from_json_clamps() {
        let config = AdaptiveConfig::from_json(
            r#"{"min_paths":2,"diversity_threshold":5.0,"salience_feedback_weight":0.5,"plateau_window_size":0,"plateau_threshold":0.1}"#,
        )
        .unwrap();
        assert_eq!(config.diversity_threshold, 1.0);
        assert_eq!(config.plateau_window_size, 1);
        assert_ne!(config.params_hash(), AdaptiveConfig::default().params_hash());
    }
}
