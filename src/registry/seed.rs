use chrono::{DateTime, Utc};
use tracing::info;

use super::error::Result;
use super::store::ModelRegistry;
use super::types::{normalize_tags, Model, ModelStatus, SupportedInputs};

struct Sample {
    slug: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    tags: &'static [&'static str],
    rating: f64,
    interactions: u64,
    inputs: SupportedInputs,
}

const fn inputs(text: bool, image: bool, document: bool, audio: bool) -> SupportedInputs {
    SupportedInputs { text, image, document, audio }
}

const SAMPLES: &[Sample] = &[
    Sample {
        slug: "codewizard-pro",
        name: "CodeWizard Pro",
        description: "Advanced code generation and debugging assistant",
        category: "Code Assistant",
        tags: &["Python", "JavaScript", "Debugging"],
        rating: 4.8,
        interactions: 15420,
        inputs: inputs(true, false, false, false),
    },
    Sample {
        slug: "artisticvision",
        name: "ArtisticVision",
        description: "Generate stunning artwork and illustrations from text",
        category: "Image Generation",
        tags: &["Art", "Digital", "Creative"],
        rating: 4.9,
        interactions: 28350,
        inputs: inputs(true, false, false, false),
    },
    Sample {
        slug: "documentanalyzer",
        name: "DocumentAnalyzer",
        description: "Analyze and extract insights from documents and images",
        category: "Document Analysis",
        tags: &["Analysis", "Documents", "OCR"],
        rating: 4.7,
        interactions: 12800,
        inputs: inputs(true, true, true, false),
    },
    Sample {
        slug: "voicetranscriber",
        name: "VoiceTranscriber",
        description: "Advanced speech-to-text and audio analysis",
        category: "Audio Processing",
        tags: &["Speech", "Transcription", "Audio"],
        rating: 4.6,
        interactions: 18900,
        inputs: inputs(false, false, false, true),
    },
    Sample {
        slug: "multimodal-assistant",
        name: "MultiModal Assistant",
        description: "Universal AI assistant for all file types",
        category: "Multi-Modal",
        tags: &["Multi-Modal", "Universal", "Assistant"],
        rating: 4.9,
        interactions: 52100,
        inputs: inputs(true, true, true, true),
    },
    Sample {
        slug: "mathsolver-pro",
        name: "MathSolver Pro",
        description: "Solve complex mathematical problems step by step",
        category: "Question Answering",
        tags: &["Math", "Education", "Problem Solving"],
        rating: 4.9,
        interactions: 23400,
        inputs: inputs(true, true, false, false),
    },
];

/// Builds the sample listings shown by a fresh marketplace.
///
/// Endpoints and tokens are placeholders; the listings exist to populate the
/// catalogue, not to be called.
pub fn sample_models(registry: &ModelRegistry, now: DateTime<Utc>) -> Vec<Model> {
    let defaults = registry.defaults();
    SAMPLES
        .iter()
        .map(|sample| Model {
            id: format!("model_sample_{}", sample.slug),
            name: sample.name.to_string(),
            description: sample.description.to_string(),
            category: sample.category.to_string(),
            api_endpoint: format!("https://inference.example.com/v1/{}", sample.slug),
            token_key: format!("sample-token-{}", sample.slug),
            tags: normalize_tags(sample.tags),
            thumbnail_url: defaults.thumbnail_url.clone(),
            pricing: defaults.pricing.clone(),
            developer_id: defaults.developer_id,
            rating: sample.rating,
            interactions: sample.interactions,
            supported_inputs: sample.inputs,
            last_updated: now.date_naive(),
            created_at: now,
            status: ModelStatus::Active,
        })
        .collect()
}

/// Imports the sample listings into the registry and returns how many were added.
pub fn load_samples(registry: &ModelRegistry) -> Result<usize> {
    let models = sample_models(registry, registry.now());
    let count = models.len();
    for model in models {
        registry.import(model)?;
    }
    info!("Loaded {} sample models", count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::error::RegistryError;

    #[test]
    fn test_load_samples() {
        let registry = ModelRegistry::default();
        let count = load_samples(&registry).unwrap();
        assert_eq!(count, 6);
        assert_eq!(registry.len(), 6);

        let stats = registry.stats();
        assert_eq!(stats.total_interactions, 15420 + 28350 + 12800 + 18900 + 52100 + 23400);
        assert_eq!(stats.most_popular_models[0].name, "MultiModal Assistant");
        // three listings share 4.9, collection order decides
        let top: Vec<&str> = stats.top_rated_models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(top[..3], ["ArtisticVision", "MultiModal Assistant", "MathSolver Pro"]);
    }

    #[test]
    fn test_loading_twice_is_rejected() {
        let registry = ModelRegistry::default();
        load_samples(&registry).unwrap();
        let err = load_samples(&registry).unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn test_samples_use_registry_defaults() {
        let registry = ModelRegistry::default();
        let models = sample_models(&registry, Utc::now());
        assert!(models.iter().all(|m| m.developer_id == registry.defaults().developer_id));
        assert!(models.iter().all(|m| !m.tags.is_empty()));
    }
}
