use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::error::{RegistryError, Result};
use super::store::ModelRegistry;
use super::types::Model;

/// Category value meaning "do not filter by category".
pub const ALL_CATEGORIES: &str = "All Models";

/// Categories offered by the marketplace out of the box.
pub const CATEGORY_CATALOG: &[&str] = &[
    "Text Generation",
    "Image Generation",
    "Code Assistant",
    "Translation",
    "Summarization",
    "Question Answering",
    "Audio Processing",
    "Document Analysis",
    "Multi-Modal",
];

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Filters accepted by the listing endpoint. Every active filter must match;
/// inactive ones (absent, blank, the "All Models" sentinel, or a developer id
/// that is not an integer) are ignored.
///
/// `ordering`, `page` and `page_size` shape the result rather than select it.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ModelFilter {
    /// Free-text query matched against name, description and tags
    #[serde(default, rename = "q", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    /// Comma-separated; every term must appear in one of the listing's tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// `created_at`, `rating`, `interactions` or `name`, `-` prefix for descending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

/// Field a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    Rating,
    Interactions,
    Name,
}

impl SortKey {
    fn parse(field: &str) -> Option<Self> {
        match field {
            "created_at" | "createdAt" => Some(SortKey::CreatedAt),
            "rating" => Some(SortKey::Rating),
            "interactions" => Some(SortKey::Interactions),
            "name" => Some(SortKey::Name),
            _ => None,
        }
    }

    fn compare(self, a: &Model, b: &Model) -> Ordering {
        match self {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Rating => a.rating.total_cmp(&b.rating),
            SortKey::Interactions => a.interactions.cmp(&b.interactions),
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        }
    }
}

/// Position of a page within a paginated listing.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    /// Total number of pages, at least one
    pub pages: usize,
}

/// Result of a listing query.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelListing {
    pub models: Vec<Model>,
    /// Number of listings matching the filters, across all pages
    pub count: usize,
    /// Present only when the caller asked for a page
    pub page: Option<PageInfo>,
}

impl ModelFilter {
    fn query_term(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .map(str::to_lowercase)
    }

    fn category_term(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty() && *category != ALL_CATEGORIES)
    }

    fn developer_id(&self) -> Option<i64> {
        self.developer
            .as_deref()
            .and_then(|developer| developer.trim().parse::<i64>().ok())
    }

    fn tag_terms(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(|tag| tag.trim().to_lowercase())
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Requested order, `true` meaning descending. Unknown fields are ignored.
    pub fn sort_order(&self) -> Option<(SortKey, bool)> {
        let ordering = self.ordering.as_deref()?.trim();
        match ordering.strip_prefix('-') {
            Some(field) => SortKey::parse(field).map(|key| (key, true)),
            None => SortKey::parse(ordering).map(|key| (key, false)),
        }
    }

    /// Page requested by the caller, `None` when neither `page` nor
    /// `page_size` was given. Page sizes above the maximum are clamped.
    ///
    /// # Errors
    ///
    /// `RegistryError::Validation` for a zero page or page size.
    pub fn page_request(&self) -> Result<Option<(usize, usize)>> {
        if self.page.is_none() && self.page_size.is_none() {
            return Ok(None);
        }
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 {
            return Err(RegistryError::Validation("page must be at least 1".to_string()));
        }
        if page_size == 0 {
            return Err(RegistryError::Validation("page_size must be at least 1".to_string()));
        }
        Ok(Some((page, page_size.min(MAX_PAGE_SIZE))))
    }

    /// True when no filter is active.
    pub fn is_empty(&self) -> bool {
        self.query_term().is_none()
            && self.category_term().is_none()
            && self.developer_id().is_none()
            && self.min_rating.is_none()
            && self.tag_terms().is_empty()
    }

    pub fn matches(&self, model: &Model) -> bool {
        let query_ok = self
            .query_term()
            .map_or(true, |needle| matches_text(model, &needle));
        let category_ok = self
            .category_term()
            .map_or(true, |category| model.category == category);
        let developer_ok = self
            .developer_id()
            .map_or(true, |developer_id| model.developer_id == developer_id);
        let rating_ok = self.min_rating.map_or(true, |min| model.rating >= min);
        let tags_ok = self.tag_terms().iter().all(|term| {
            model
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(term.as_str()))
        });
        query_ok && category_ok && developer_ok && rating_ok && tags_ok
    }
}

// `needle` must already be lowercase.
fn matches_text(model: &Model, needle: &str) -> bool {
    model.name.to_lowercase().contains(needle)
        || model.description.to_lowercase().contains(needle)
        || model.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}

impl ModelRegistry {
    pub fn find_by_category(&self, category: &str) -> Vec<Model> {
        self.read()
            .iter()
            .filter(|model| model.category == category)
            .cloned()
            .collect()
    }

    pub fn find_by_developer(&self, developer_id: i64) -> Vec<Model> {
        self.read()
            .iter()
            .filter(|model| model.developer_id == developer_id)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search over name, description and tags.
    /// A blank query matches every listing.
    pub fn search(&self, query: &str) -> Vec<Model> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.find_all();
        }
        self.read()
            .iter()
            .filter(|model| matches_text(model, &needle))
            .cloned()
            .collect()
    }

    /// Listings matching every active filter, in the requested order or
    /// insertion order. Ties keep insertion order.
    pub fn filter(&self, filter: &ModelFilter) -> Vec<Model> {
        let mut models: Vec<Model> = self
            .read()
            .iter()
            .filter(|model| filter.matches(model))
            .cloned()
            .collect();
        if let Some((key, descending)) = filter.sort_order() {
            models.sort_by(|a, b| {
                let order = key.compare(a, b);
                if descending {
                    order.reverse()
                } else {
                    order
                }
            });
        }
        models
    }

    /// Filtered listing, cut to the requested page when one was asked for.
    /// A page past the end is empty.
    pub fn list(&self, filter: &ModelFilter) -> Result<ModelListing> {
        let page_request = filter.page_request()?;
        let models = self.filter(filter);
        let count = models.len();

        let Some((page, page_size)) = page_request else {
            return Ok(ModelListing { models, count, page: None });
        };
        let pages = count.div_ceil(page_size).max(1);
        let models = models
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();
        Ok(ModelListing {
            models,
            count,
            page: Some(PageInfo { page, page_size, pages }),
        })
    }

    /// The category catalogue followed by any other category in use.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = CATEGORY_CATALOG.iter().map(|c| c.to_string()).collect();
        for model in self.read().iter() {
            if !categories.contains(&model.category) {
                categories.push(model.category.clone());
            }
        }
        categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::store::RegistryDefaults;
    use crate::registry::types::{NewModel, TagsInput};

    fn listing(name: &str, description: &str, category: &str, tags: &str) -> NewModel {
        NewModel {
            name: Some(name.to_string()),
            description: Some(description.to_string()),
            category: Some(category.to_string()),
            api_endpoint: Some("https://api.example.com/infer".to_string()),
            token_key: Some("token-abcdef".to_string()),
            tags: Some(TagsInput::Joined(tags.to_string())),
            ..Default::default()
        }
    }

    fn populated() -> ModelRegistry {
        let registry = ModelRegistry::default();
        registry
            .create(listing("Whiskers", "Classifies pet photos", "Image Generation", "Cat, Vision"))
            .unwrap();
        registry
            .create(listing("CodeWizard", "Writes Python code", "Code Assistant", "Python"))
            .unwrap();
        registry
            .create(listing("Scribe", "Summarises long concatenated reports", "Summarization", "Docs"))
            .unwrap();
        registry
    }

    fn names(models: &[Model]) -> Vec<&str> {
        models.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_over_tags() {
        let registry = populated();
        assert_eq!(names(&registry.search("cat")), vec!["Whiskers", "Scribe"]);
        assert_eq!(names(&registry.search("PYTHON")), vec!["CodeWizard"]);
        assert!(registry.search("nothing-matches").is_empty());
    }

    #[test]
    fn test_blank_search_returns_everything() {
        let registry = populated();
        assert_eq!(registry.search(""), registry.find_all());
        assert_eq!(registry.search("   \t"), registry.find_all());
    }

    #[test]
    fn test_find_by_category_and_developer() {
        let registry = populated();
        assert_eq!(names(&registry.find_by_category("Code Assistant")), vec!["CodeWizard"]);
        assert!(registry.find_by_category("code assistant").is_empty());
        assert_eq!(registry.find_by_developer(1001).len(), 3);
        assert!(registry.find_by_developer(42).is_empty());
    }

    #[test]
    fn test_filter_intersects_active_filters() {
        let registry = populated();
        let filter = ModelFilter {
            query: Some("cat".into()),
            category: Some("Summarization".into()),
            developer: Some("1001".into()),
            ..Default::default()
        };
        assert_eq!(names(&registry.filter(&filter)), vec!["Scribe"]);

        let filter = ModelFilter {
            query: Some("cat".into()),
            category: None,
            developer: Some("42".into()),
            ..Default::default()
        };
        assert!(registry.filter(&filter).is_empty());
    }

    #[test]
    fn test_filter_ignores_inactive_filters() {
        let registry = populated();
        let filter = ModelFilter {
            query: Some("  ".into()),
            category: Some(ALL_CATEGORIES.into()),
            developer: Some("not-a-number".into()),
            ..Default::default()
        };
        assert!(filter.is_empty());
        assert_eq!(registry.filter(&filter), registry.find_all());
    }

    #[test]
    fn test_categories_appends_unknown_categories_once() {
        let registry = ModelRegistry::new(RegistryDefaults::default());
        registry.create(listing("A", "a", "Robotics", "")).unwrap();
        registry.create(listing("B", "b", "Robotics", "")).unwrap();
        registry.create(listing("C", "c", "Translation", "")).unwrap();

        let categories = registry.categories();
        assert_eq!(categories.len(), CATEGORY_CATALOG.len() + 1);
        assert_eq!(categories.last().map(String::as_str), Some("Robotics"));
    }

    fn rated(registry: &ModelRegistry, name: &str, rating: f64, tags: &str) -> Model {
        let mut input = listing(name, "rated listing", "Translation", tags);
        input.rating = Some(rating);
        registry.create(input).unwrap()
    }

    #[test]
    fn test_min_rating_and_tags_intersect() {
        let registry = ModelRegistry::default();
        rated(&registry, "Low", 3.0, "Translation, Fast");
        rated(&registry, "High", 4.8, "translation, Accurate");
        rated(&registry, "Edge", 4.0, "Fast");

        let filter = ModelFilter { min_rating: Some(4.0), ..Default::default() };
        assert_eq!(names(&registry.filter(&filter)), vec!["High", "Edge"]);

        let filter = ModelFilter { tags: Some(" TRANS , ".into()), ..Default::default() };
        assert_eq!(names(&registry.filter(&filter)), vec!["Low", "High"]);

        let filter = ModelFilter {
            tags: Some("fast,translation".into()),
            min_rating: Some(2.0),
            ..Default::default()
        };
        assert_eq!(names(&registry.filter(&filter)), vec!["Low"]);
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_ordering_is_stable_and_ignores_unknown_fields() {
        let registry = ModelRegistry::default();
        rated(&registry, "bravo", 4.0, "");
        rated(&registry, "Alpha", 5.0, "");
        rated(&registry, "charlie", 4.0, "");

        let order = |ordering: &str| {
            let filter = ModelFilter { ordering: Some(ordering.into()), ..Default::default() };
            registry.filter(&filter).into_iter().map(|m| m.name).collect::<Vec<_>>()
        };
        assert_eq!(order("name"), vec!["Alpha", "bravo", "charlie"]);
        assert_eq!(order("-rating"), vec!["Alpha", "bravo", "charlie"]);
        assert_eq!(order("rating"), vec!["bravo", "charlie", "Alpha"]);
        assert_eq!(order("token_key"), vec!["bravo", "Alpha", "charlie"]);
    }

    #[test]
    fn test_list_paginates_with_total_count() {
        let registry = ModelRegistry::default();
        for i in 0..5 {
            rated(&registry, &format!("m{}", i), 4.0, "");
        }

        let unpaged = registry.list(&ModelFilter::default()).unwrap();
        assert_eq!(unpaged.count, 5);
        assert_eq!(unpaged.models.len(), 5);
        assert!(unpaged.page.is_none());

        let filter = ModelFilter { page: Some(2), page_size: Some(2), ..Default::default() };
        let listing = registry.list(&filter).unwrap();
        assert_eq!(names(&listing.models), vec!["m2", "m3"]);
        assert_eq!(listing.count, 5);
        assert_eq!(listing.page, Some(PageInfo { page: 2, page_size: 2, pages: 3 }));

        let filter = ModelFilter { page: Some(9), page_size: Some(2), ..Default::default() };
        assert!(registry.list(&filter).unwrap().models.is_empty());

        let filter = ModelFilter { page_size: Some(1000), ..Default::default() };
        let page = registry.list(&filter).unwrap().page.unwrap();
        assert_eq!((page.page, page.page_size, page.pages), (1, MAX_PAGE_SIZE, 1));
    }

    #[test]
    fn test_zero_page_is_rejected() {
        let registry = ModelRegistry::default();
        let filter = ModelFilter { page: Some(0), ..Default::default() };
        assert!(matches!(registry.list(&filter), Err(RegistryError::Validation(_))));
        let filter = ModelFilter { page_size: Some(0), ..Default::default() };
        assert!(matches!(registry.list(&filter), Err(RegistryError::Validation(_))));
    }
}
