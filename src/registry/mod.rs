mod error;
mod query;
pub mod seed;
mod stats;
mod store;
mod types;

pub use error::{RegistryError, Result};
pub use query::{
    ModelFilter, ModelListing, PageInfo, SortKey, ALL_CATEGORIES, CATEGORY_CATALOG, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
pub use stats::{RegistryStats, TOP_N};
pub use store::{
    Clock, ModelRegistry, RegistryDefaults, DEFAULT_DEVELOPER_ID, DEFAULT_PRICING, DEFAULT_RATING,
    DEFAULT_THUMBNAIL,
};
pub use types::{
    mask_token, normalize_tags, Model, ModelStatus, ModelUpdate, NewModel, SupportedInputs,
    TagsInput,
};
