use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::store::ModelRegistry;
use super::types::Model;

/// Length of every ranking in the statistics.
pub const TOP_N: usize = 5;

/// Aggregates over a snapshot of the registry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_models: usize,
    pub total_interactions: u64,
    /// Mean rating, 0 for an empty registry
    pub average_rating: f64,
    pub category_counts: BTreeMap<String, usize>,
    /// Newest first
    pub recent_models: Vec<Model>,
    pub top_rated_models: Vec<Model>,
    /// Most interactions first
    pub most_popular_models: Vec<Model>,
}

impl RegistryStats {
    pub fn from_models(models: &[Model]) -> Self {
        let total_interactions = models
            .iter()
            .fold(0u64, |sum, model| sum.saturating_add(model.interactions));

        let average_rating = if models.is_empty() {
            0.0
        } else {
            models.iter().map(|model| model.rating).sum::<f64>() / models.len() as f64
        };

        let mut category_counts = BTreeMap::new();
        for model in models {
            *category_counts.entry(model.category.clone()).or_insert(0) += 1;
        }

        Self {
            total_models: models.len(),
            total_interactions,
            average_rating,
            category_counts,
            recent_models: top_by(models, |a, b| b.created_at.cmp(&a.created_at)),
            top_rated_models: top_by(models, |a, b| b.rating.total_cmp(&a.rating)),
            most_popular_models: top_by(models, |a, b| b.interactions.cmp(&a.interactions)),
        }
    }

    /// Applies `f` to every model listed in the rankings.
    pub fn map_models(mut self, f: impl Fn(&Model) -> Model) -> Self {
        for list in [
            &mut self.recent_models,
            &mut self.top_rated_models,
            &mut self.most_popular_models,
        ] {
            *list = list.iter().map(&f).collect();
        }
        self
    }
}

// `sort_by` is stable, so ties keep collection order.
fn top_by<F>(models: &[Model], compare: F) -> Vec<Model>
where
    F: FnMut(&Model, &Model) -> Ordering,
{
    let mut ranked = models.to_vec();
    ranked.sort_by(compare);
    ranked.truncate(TOP_N);
    ranked
}

impl ModelRegistry {
    pub fn stats(&self) -> RegistryStats {
        RegistryStats::from_models(&self.read())
    }
}
