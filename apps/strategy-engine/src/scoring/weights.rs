//! Named weight configurations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalogue::{MetricId, MetricSpec, default_metrics};
use crate::error::SearchError;

/// A named sparse metric -> weight map overriding the default configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSet {
    /// Configuration name, echoed in results.
    pub name: String,
    /// Weights by catalogue name; absent metrics keep weight 0.
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

impl WeightSet {
    /// Empty configuration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: BTreeMap::new(),
        }
    }

    /// Builder: set one weight.
    #[must_use]
    pub fn with_weight(mut self, metric: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(metric.into(), weight);
        self
    }

    /// Apply the overrides to the default configuration, validate, and
    /// renormalize the weights to sum to 1.
    ///
    /// # Errors
    ///
    /// [`SearchError::UnknownMetric`] for a name outside the catalogue and
    /// [`SearchError::InvalidWeight`] for a negative or non-finite weight.
    pub fn resolve(&self) -> Result<ResolvedWeights, SearchError> {
        let mut specs = default_metrics();
        for (name, &weight) in &self.weights {
            let id: MetricId = name.parse().map_err(|_| SearchError::UnknownMetric {
                weight_set: self.name.clone(),
                name: name.clone(),
            })?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(SearchError::InvalidWeight {
                    weight_set: self.name.clone(),
                    metric: name.clone(),
                    weight,
                });
            }
            if let Some(spec) = specs.iter_mut().find(|s| s.id == id) {
                spec.weight = weight;
            }
        }

        let total: f64 = specs.iter().map(|s| s.weight).sum();
        let terms = if total > 0.0 {
            specs
                .into_iter()
                .filter(|s| s.weight > 0.0)
                .map(|s| MetricSpec {
                    weight: s.weight / total,
                    ..s
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(ResolvedWeights {
            name: self.name.clone(),
            terms,
        })
    }
}

/// A validated configuration: only positively weighted metrics, summing to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWeights {
    /// Configuration name.
    pub name: String,
    /// Active metrics. Empty when every weight was zero.
    pub terms: Vec<MetricSpec>,
}

impl ResolvedWeights {
    /// Whether the configuration scores every candidate 0.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_renormalize() {
        let resolved = WeightSet::new("balanced")
            .with_weight("average_pnl", 3.0)
            .with_weight("max_loss", 1.0)
            .resolve()
            .unwrap();
        assert_eq!(resolved.terms.len(), 2);
        let total: f64 = resolved.terms.iter().map(|t| t.weight).sum();
        assert!((total - 1.0).abs() < 1e-12);
        let pnl = resolved.terms.iter().find(|t| t.id == MetricId::AveragePnl).unwrap();
        assert!((pnl.weight - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_all_zero_is_zero_config() {
        let resolved = WeightSet::new("empty").with_weight("roll", 0.0).resolve().unwrap();
        assert!(resolved.is_zero());
    }

    #[test]
    fn test_unknown_metric_rejected() {
        let err = WeightSet::new("bad").with_weight("sharpe", 1.0).resolve().unwrap_err();
        assert!(matches!(err, SearchError::UnknownMetric { ref name, .. } if name == "sharpe"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = WeightSet::new("bad").with_weight("roll", -0.5).resolve().unwrap_err();
        assert!(matches!(err, SearchError::InvalidWeight { .. }));
    }
}
