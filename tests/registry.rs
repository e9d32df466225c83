use std::collections::HashSet;

use modelmart::registry::{
    ModelFilter, ModelRegistry, ModelUpdate, NewModel, RegistryError, SupportedInputs, TagsInput,
};

fn new_model(name: &str, rating: f64) -> NewModel {
    NewModel {
        name: Some(name.to_string()),
        description: Some(format!("{} answers questions", name)),
        category: Some("Question Answering".to_string()),
        api_endpoint: Some("https://inference.example.com/v1/chat/completions".to_string()),
        token_key: Some("hf_abcdefghijkl".to_string()),
        rating: Some(rating),
        ..Default::default()
    }
}

#[test]
fn test_ids_are_non_empty_and_unique() {
    let registry = ModelRegistry::default();
    let mut seen = HashSet::new();
    for i in 0..50 {
        let model = registry.create(new_model(&format!("model-{}", i), 4.0)).unwrap();
        assert!(!model.id.is_empty());
        assert!(seen.insert(model.id));
    }
}

#[test]
fn test_missing_required_field_does_not_mutate() {
    let registry = ModelRegistry::default();
    registry.create(new_model("kept", 4.0)).unwrap();
    let before = registry.find_all();

    for field in ["name", "description", "category", "apiEndpoint", "tokenKey"] {
        let mut input = new_model("broken", 4.0);
        match field {
            "name" => input.name = None,
            "description" => input.description = None,
            "category" => input.category = None,
            "apiEndpoint" => input.api_endpoint = None,
            _ => input.token_key = None,
        }
        match registry.create(input) {
            Err(RegistryError::Validation(message)) => assert!(message.contains(field)),
            other => panic!("expected validation error for {}, got {:?}", field, other),
        }
    }
    assert_eq!(registry.find_all(), before);
}

#[test]
fn test_update_and_delete_unknown_ids() {
    let registry = ModelRegistry::default();
    registry.create(new_model("only", 4.0)).unwrap();
    let before = registry.find_all();

    let err = registry.update("model_nope", ModelUpdate::default()).unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(_)));
    assert!(!registry.delete("model_nope"));
    assert_eq!(registry.find_all(), before);
}

#[test]
fn test_update_replaces_supported_inputs_wholesale() {
    let registry = ModelRegistry::default();
    let mut input = new_model("vision", 4.0);
    input.supported_inputs = Some(SupportedInputs { text: true, image: true, document: true, audio: false });
    let model = registry.create(input).unwrap();

    // no deep merge: flags left out of the submitted object end up false
    let mut changes: ModelUpdate =
        serde_json::from_str(r#"{"supportedInputs": {"audio": true}}"#).unwrap();
    changes.tags = Some(TagsInput::Joined("speech, audio".to_string()));

    let updated = registry.update(&model.id, changes).unwrap();
    assert_eq!(updated.supported_inputs, SupportedInputs { text: false, image: false, document: false, audio: true });
    assert_eq!(updated.tags, vec!["speech", "audio"]);
    assert_eq!(updated.name, "vision");
}

#[test]
fn test_increment_twice_adds_two() {
    let registry = ModelRegistry::default();
    let model = registry.create(new_model("popular", 4.0)).unwrap();
    let before = registry.find_by_id(&model.id).unwrap().interactions;
    registry.increment_interactions(&model.id);
    registry.increment_interactions(&model.id);
    assert_eq!(registry.find_by_id(&model.id).unwrap().interactions, before + 2);
}

#[test]
fn test_search_matches_tags_case_insensitively() {
    let registry = ModelRegistry::default();
    let mut input = new_model("Feline Finder", 4.0);
    input.description = Some("Spots animals in photos".to_string());
    input.tags = Some(TagsInput::List(vec!["Cat".to_string()]));
    let cat = registry.create(input).unwrap();
    registry.create(new_model("Other", 4.0)).unwrap();

    assert_eq!(registry.search("cat"), vec![cat]);
    assert_eq!(registry.search(" "), registry.find_all());
}

#[test]
fn test_filter_developer_does_not_discard_query() {
    let registry = ModelRegistry::default();
    let wanted = registry.create(new_model("Translator", 4.0)).unwrap();
    registry.create(new_model("Summarizer", 4.0)).unwrap();

    let filter = ModelFilter {
        query: Some("translator".to_string()),
        category: Some("All Models".to_string()),
        developer: Some("1001".to_string()),
        ..Default::default()
    };
    assert_eq!(registry.filter(&filter), vec![wanted]);
}

#[test]
fn test_top_rated_returns_five_highest() {
    let registry = ModelRegistry::default();
    for (name, rating) in [("r1", 1.0), ("r2", 2.0), ("r3", 3.0), ("r4", 4.0), ("r5", 4.5), ("r6", 5.0)] {
        registry.create(new_model(name, rating)).unwrap();
    }
    let names: Vec<String> = registry
        .stats()
        .top_rated_models
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec!["r6", "r5", "r4", "r3", "r2"]);
}

#[test]
fn test_end_to_end_rating_and_delete() {
    let registry = ModelRegistry::default();
    let a = registry.create(new_model("A", 4.5)).unwrap();
    let b = registry.create(new_model("B", 4.9)).unwrap();

    let top: Vec<String> = registry.stats().top_rated_models.into_iter().map(|m| m.id).collect();
    assert_eq!(top, vec![b.id.clone(), a.id.clone()]);

    assert!(registry.delete(&a.id));
    assert_eq!(registry.find_all(), vec![b]);
}
