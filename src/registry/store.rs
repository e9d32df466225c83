use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info};
use url::Url;

use super::error::{RegistryError, Result};
use super::types::{Model, ModelUpdate, NewModel};

/// Rating given to a listing when the creator does not supply one.
pub const DEFAULT_RATING: f64 = 4.5;
pub const DEFAULT_THUMBNAIL: &str = "/placeholder.svg?height=400&width=600";
pub const DEFAULT_PRICING: &str = "Free tier";
pub const DEFAULT_DEVELOPER_ID: i64 = 1001;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Source of the current time. Swappable so tests can control timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Values stamped onto new listings.
#[derive(Debug, Clone)]
pub struct RegistryDefaults {
    /// Owner assigned to every listing
    pub developer_id: i64,
    pub thumbnail_url: String,
    pub pricing: String,
}

impl Default for RegistryDefaults {
    fn default() -> Self {
        Self {
            developer_id: DEFAULT_DEVELOPER_ID,
            thumbnail_url: DEFAULT_THUMBNAIL.to_string(),
            pricing: DEFAULT_PRICING.to_string(),
        }
    }
}

/// In-memory registry of listed models.
///
/// The collection lives only as long as the process; nothing is written to
/// disk, so a restart starts from an empty registry.
pub struct ModelRegistry {
    models: RwLock<Vec<Model>>,
    defaults: RegistryDefaults,
    clock: Clock,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(RegistryDefaults::default())
    }
}

impl ModelRegistry {
    /// Creates an empty registry using the system clock.
    pub fn new(defaults: RegistryDefaults) -> Self {
        Self::with_clock(defaults, Arc::new(Utc::now))
    }

    /// Creates an empty registry with a custom time source.
    pub fn with_clock(defaults: RegistryDefaults, clock: Clock) -> Self {
        Self {
            models: RwLock::new(Vec::new()),
            defaults,
            clock,
        }
    }

    pub fn defaults(&self) -> &RegistryDefaults {
        &self.defaults
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    // Operations never panic while holding the lock, so a poisoned guard
    // still protects a consistent collection.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Vec<Model>> {
        self.models.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Model>> {
        self.models.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Validates the input, fills in defaults and appends a new listing.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Validation` if `name`, `description`,
    /// `category`, `apiEndpoint` or `tokenKey` is missing or blank, if the
    /// endpoint is not an http(s) URL, or if the rating is out of range.
    /// The registry is left untouched on error.
    pub fn create(&self, input: NewModel) -> Result<Model> {
        let name = required("name", input.name)?;
        let description = required("description", input.description)?;
        let category = required("category", input.category)?;
        let api_endpoint = required("apiEndpoint", input.api_endpoint)?;
        let token_key = required("tokenKey", input.token_key)?;
        validate_endpoint(&api_endpoint)?;

        let rating = input.rating.unwrap_or(DEFAULT_RATING);
        validate_rating(rating)?;

        let now = self.now();
        let mut models = self.write();

        let id = loop {
            let candidate = generate_id(now);
            if !models.iter().any(|model| model.id == candidate) {
                break candidate;
            }
        };

        let model = Model {
            id,
            name,
            description,
            category,
            api_endpoint,
            token_key,
            tags: input.tags.map(|tags| tags.into_tags()).unwrap_or_default(),
            thumbnail_url: non_blank(input.thumbnail_url)
                .unwrap_or_else(|| self.defaults.thumbnail_url.clone()),
            pricing: non_blank(input.pricing).unwrap_or_else(|| self.defaults.pricing.clone()),
            developer_id: self.defaults.developer_id,
            rating,
            interactions: 0,
            supported_inputs: input.supported_inputs.unwrap_or_default(),
            last_updated: now.date_naive(),
            created_at: now,
            status: input.status.unwrap_or_default(),
        };

        models.push(model.clone());
        info!(id = %model.id, name = %model.name, category = %model.category, "Model created");
        Ok(model)
    }

    /// Inserts an already assembled listing, keeping its id and counters.
    pub fn import(&self, model: Model) -> Result<Model> {
        for (field, value) in [
            ("id", &model.id),
            ("name", &model.name),
            ("description", &model.description),
            ("category", &model.category),
            ("apiEndpoint", &model.api_endpoint),
            ("tokenKey", &model.token_key),
        ] {
            if value.trim().is_empty() {
                return Err(RegistryError::Validation(format!("{} is required", field)));
            }
        }
        validate_endpoint(&model.api_endpoint)?;
        validate_rating(model.rating)?;

        let mut models = self.write();
        if models.iter().any(|existing| existing.id == model.id) {
            return Err(RegistryError::Validation(format!(
                "a model with id {} already exists",
                model.id
            )));
        }
        models.push(model.clone());
        debug!(id = %model.id, "Model imported");
        Ok(model)
    }

    pub fn find_by_id(&self, id: &str) -> Option<Model> {
        self.read().iter().find(|model| model.id == id).cloned()
    }

    /// Snapshot of every listing in insertion order.
    pub fn find_all(&self) -> Vec<Model> {
        self.read().clone()
    }

    /// Merges the supplied fields over the stored listing and refreshes
    /// `last_updated`.
    ///
    /// # Errors
    ///
    /// `RegistryError::NotFound` when no listing has this id,
    /// `RegistryError::Validation` when a supplied value is blank or out of
    /// range. Nothing is modified in either case.
    pub fn update(&self, id: &str, changes: ModelUpdate) -> Result<Model> {
        let now = self.now();
        let mut models = self.write();
        let model = models
            .iter_mut()
            .find(|model| model.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        let name = optional_required("name", changes.name)?;
        let description = optional_required("description", changes.description)?;
        let category = optional_required("category", changes.category)?;
        let api_endpoint = optional_required("apiEndpoint", changes.api_endpoint)?;
        let token_key = optional_required("tokenKey", changes.token_key)?;
        if let Some(endpoint) = &api_endpoint {
            validate_endpoint(endpoint)?;
        }
        if let Some(rating) = changes.rating {
            validate_rating(rating)?;
        }

        if let Some(name) = name {
            model.name = name;
        }
        if let Some(description) = description {
            model.description = description;
        }
        if let Some(category) = category {
            model.category = category;
        }
        if let Some(api_endpoint) = api_endpoint {
            model.api_endpoint = api_endpoint;
        }
        if let Some(token_key) = token_key {
            model.token_key = token_key;
        }
        if let Some(tags) = changes.tags {
            model.tags = tags.into_tags();
        }
        // a blank value resets to the default, as on creation
        if let Some(thumbnail_url) = changes.thumbnail_url {
            model.thumbnail_url = non_blank(Some(thumbnail_url))
                .unwrap_or_else(|| self.defaults.thumbnail_url.clone());
        }
        if let Some(pricing) = changes.pricing {
            model.pricing =
                non_blank(Some(pricing)).unwrap_or_else(|| self.defaults.pricing.clone());
        }
        if let Some(rating) = changes.rating {
            model.rating = rating;
        }
        if let Some(supported_inputs) = changes.supported_inputs {
            model.supported_inputs = supported_inputs;
        }
        if let Some(status) = changes.status {
            model.status = status;
        }
        touch(model, now);

        info!(id = %model.id, "Model updated");
        Ok(model.clone())
    }

    /// Removes a listing. Returns `false` if the id was unknown.
    pub fn delete(&self, id: &str) -> bool {
        let mut models = self.write();
        match models.iter().position(|model| model.id == id) {
            Some(index) => {
                models.remove(index);
                info!(id, "Model deleted");
                true
            }
            None => {
                debug!(id, "Delete requested for unknown model");
                false
            }
        }
    }

    /// Records one interaction with a listing.
    ///
    /// Unknown ids are ignored and yield `None`.
    pub fn increment_interactions(&self, id: &str) -> Option<Model> {
        let now = self.now();
        let mut models = self.write();
        let model = models.iter_mut().find(|model| model.id == id)?;
        model.interactions = model.interactions.saturating_add(1);
        touch(model, now);
        debug!(id, interactions = model.interactions, "Interaction recorded");
        Some(model.clone())
    }
}

// Never lets last_updated fall behind the creation day, even with a skewed clock.
fn touch(model: &mut Model, now: DateTime<Utc>) {
    model.last_updated = now.date_naive().max(model.created_at.date_naive());
}

fn generate_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("model_{}_{}", now.timestamp_millis(), suffix)
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    match non_blank(value) {
        Some(value) => Ok(value),
        None => Err(RegistryError::Validation(format!("{} is required", field))),
    }
}

fn optional_required(field: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        Some(value) => required(field, Some(value)).map(Some),
        None => Ok(None),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn validate_endpoint(endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint).map_err(|e| {
        RegistryError::Validation(format!("apiEndpoint is not a valid URL: {}", e))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(RegistryError::Validation(format!(
            "apiEndpoint must use http or https, got: {}",
            scheme
        ))),
    }
}

fn validate_rating(rating: f64) -> Result<()> {
    if rating.is_finite() && (0.0..=5.0).contains(&rating) {
        Ok(())
    } else {
        Err(RegistryError::Validation(format!(
            "rating must be between 0.0 and 5.0, got: {}",
            rating
        )))
    }
}
