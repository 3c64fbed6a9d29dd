//! Multi-criteria scoring.
//!
//! Every configuration is a sparse override of the default catalogue
//! weights. Ranges and sub-scores are shared by all configurations; each
//! configuration then combines them as a weighted geometric mean
//! `exp(Σ w · ln(1e-6 + x))`.

mod catalogue;
mod scorer;
mod top_n;
mod weights;

pub use catalogue::{Direction, MetricId, MetricSpec, Normalizer, UnknownMetricName, default_metrics};
pub use scorer::{MultiScore, RankedIndex, Ranking, SCORE_EPSILON, score_pool};
pub use top_n::TopN;
pub use weights::{ResolvedWeights, WeightSet};
