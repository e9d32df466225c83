use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a listing.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    #[default]
    Active,
    Inactive,
    Pending,
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelStatus::Active => write!(f, "active"),
            ModelStatus::Inactive => write!(f, "inactive"),
            ModelStatus::Pending => write!(f, "pending"),
        }
    }
}

/// Input modalities accepted by the proxied inference endpoint.
///
/// Flags missing from a submitted object are read as `false`: the object
/// always replaces the stored one as a whole.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SupportedInputs {
    #[serde(default)]
    pub text: bool,
    #[serde(default)]
    pub image: bool,
    #[serde(default)]
    pub document: bool,
    #[serde(default)]
    pub audio: bool,
}

impl Default for SupportedInputs {
    fn default() -> Self {
        Self {
            text: true,
            image: false,
            document: false,
            audio: false,
        }
    }
}

impl fmt::Display for SupportedInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let enabled: Vec<&str> = [
            (self.text, "text"),
            (self.image, "image"),
            (self.document, "document"),
            (self.audio, "audio"),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| *name)
        .collect();

        if enabled.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", enabled.join(", "))
        }
    }
}

/// A listed model: the configuration of a third-party inference endpoint
/// together with the metadata shown in the marketplace.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Generated at creation, never changes
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// URL of the external inference service
    pub api_endpoint: String,
    /// Credential for the external inference service
    pub token_key: String,
    /// Display tags, insertion order preserved, no duplicates
    pub tags: Vec<String>,
    pub thumbnail_url: String,
    pub pricing: String,
    pub developer_id: i64,
    pub rating: f64,
    /// Number of recorded interactions, only ever grows
    pub interactions: u64,
    pub supported_inputs: SupportedInputs,
    /// Day of the last mutation (UTC)
    pub last_updated: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub status: ModelStatus,
}

impl Model {
    /// Returns a copy of the model with the token key masked.
    pub fn redacted(&self) -> Model {
        Model {
            token_key: mask_token(&self.token_key),
            ..self.clone()
        }
    }
}

/// Masks a credential, keeping only its last four characters visible.
/// Tokens of four characters or fewer are hidden entirely.
pub fn mask_token(token: &str) -> String {
    let len = token.chars().count();
    if len <= 4 {
        return "****".to_string();
    }
    let tail: String = token.chars().skip(len - 4).collect();
    format!("****{}", tail)
}

/// Tags as submitted by a client: either the comma-separated string produced
/// by the upload form or an explicit list.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum TagsInput {
    Joined(String),
    List(Vec<String>),
}

impl TagsInput {
    pub fn into_tags(self) -> Vec<String> {
        match self {
            TagsInput::Joined(joined) => normalize_tags(joined.split(',')),
            TagsInput::List(list) => normalize_tags(list),
        }
    }
}

/// Trims each tag, drops empties and drops repeats keeping the first one.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();
    for tag in raw {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || tags.iter().any(|existing| existing == tag) {
            continue;
        }
        tags.push(tag.to_string());
    }
    tags
}

/// Fields accepted when creating a listing. Required fields are optional here
/// so that a missing field is reported as a validation error rather than a
/// deserialization failure.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagsInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_inputs: Option<SupportedInputs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ModelStatus>,
}

/// Partial update of a listing. Absent fields keep their stored value;
/// `supported_inputs` replaces the whole record when present.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagsInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_inputs: Option<SupportedInputs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ModelStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_separated_tags_are_trimmed_and_deduplicated() {
        let tags = TagsInput::Joined(" Python, ,JavaScript ,Python,  ".to_string()).into_tags();
        assert_eq!(tags, vec!["Python", "JavaScript"]);
    }

    #[test]
    fn test_tag_list_keeps_insertion_order() {
        let tags = TagsInput::List(vec!["b".into(), "a".into(), " b ".into(), "".into()]).into_tags();
        assert_eq!(tags, vec!["b", "a"]);
    }

    #[test]
    fn test_tags_accept_string_or_array() {
        let joined: NewModel = serde_json::from_str(r#"{"tags": "Art, Digital"}"#).unwrap();
        let list: NewModel = serde_json::from_str(r#"{"tags": ["Art", "Digital"]}"#).unwrap();
        assert_eq!(joined.tags.unwrap().into_tags(), list.tags.unwrap().into_tags());
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("sk-1234567890"), "****7890");
        assert_eq!(mask_token("abcd"), "****");
        assert_eq!(mask_token(""), "****");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ModelStatus::Pending).unwrap(), "\"pending\"");
        let status: ModelStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(status, ModelStatus::Inactive);
    }

    #[test]
    fn test_supported_inputs_display() {
        let inputs = SupportedInputs { text: true, image: true, document: false, audio: false };
        assert_eq!(inputs.to_string(), "text, image");
        let none = SupportedInputs { text: false, image: false, document: false, audio: false };
        assert_eq!(none.to_string(), "none");
    }
}
