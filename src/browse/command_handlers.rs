use colored::*;
use rustyline::DefaultEditor;

use crate::browse::client::MarketClient;
use crate::browse::display::{
    display_categories, display_model_details, display_models_table, display_stats,
};
use crate::registry::{ModelFilter, NewModel, SupportedInputs, TagsInput};

/// Shared resources for the command handlers
pub(super) struct BrowseContext<'a> {
    pub client: &'a MarketClient,
    pub editor: &'a mut DefaultEditor,
}

fn print_error(e: anyhow::Error) {
    println!("{} {:#}", "Error:".red().bold(), e);
}

pub(super) async fn handle_list_models(context: &BrowseContext<'_>, filter: ModelFilter) {
    match context.client.list_models(&filter).await {
        Ok(listing) => display_models_table(&listing.models),
        Err(e) => print_error(e),
    }
}

pub(super) async fn handle_show_model(context: &BrowseContext<'_>, id: &str) {
    match context.client.get_model(id).await {
        Ok(model) => display_model_details(&model),
        Err(e) => print_error(e),
    }
}

pub(super) async fn handle_stats(context: &BrowseContext<'_>) {
    match context.client.stats().await {
        Ok(stats) => display_stats(&stats),
        Err(e) => print_error(e),
    }
}

pub(super) async fn handle_categories(context: &BrowseContext<'_>) {
    match context.client.categories().await {
        Ok(categories) => display_categories(&categories),
        Err(e) => print_error(e),
    }
}

pub(super) async fn handle_record_interaction(context: &BrowseContext<'_>, id: &str) {
    match context.client.record_interaction(id).await {
        Ok(model) => println!(
            "Recorded interaction with {} ({} total)",
            model.name.yellow(),
            model.interactions.to_string().bright_green()
        ),
        Err(e) => print_error(e),
    }
}

pub(super) async fn handle_delete_model(context: &mut BrowseContext<'_>, id: &str) {
    let confirm = match context.editor.readline(&format!("Delete model {}? [y/N] ", id)) {
        Ok(answer) => answer.trim().eq_ignore_ascii_case("y"),
        Err(_) => false,
    };
    if !confirm {
        println!("Cancelled");
        return;
    }

    match context.client.delete_model(id).await {
        Ok(result) => println!("Model {} deleted", result.id.yellow()),
        Err(e) => print_error(e),
    }
}

/// Prompts for a single field. Returns `None` for a blank answer or when
/// input is interrupted.
fn ask(editor: &mut DefaultEditor, label: &str) -> Option<String> {
    editor
        .readline(&format!("{}: ", label))
        .ok()
        .map(|answer| answer.trim().to_string())
        .filter(|answer| !answer.is_empty())
}

/// Parses a comma-separated list of input kinds such as "text, image".
pub(super) fn parse_supported_inputs(raw: &str) -> Result<SupportedInputs, String> {
    let mut inputs = SupportedInputs { text: false, image: false, document: false, audio: false };
    for kind in raw.split(',').map(str::trim).filter(|kind| !kind.is_empty()) {
        match kind.to_lowercase().as_str() {
            "text" => inputs.text = true,
            "image" => inputs.image = true,
            "document" => inputs.document = true,
            "audio" => inputs.audio = true,
            other => return Err(format!("Unknown input type: {}", other)),
        }
    }
    Ok(inputs)
}

pub(super) async fn handle_add_model(context: &mut BrowseContext<'_>) {
    println!("{}", "New model listing (leave optional fields blank)".bright_cyan());

    let editor = &mut *context.editor;
    let mut model = NewModel {
        name: ask(editor, "Name"),
        description: ask(editor, "Description"),
        category: ask(editor, "Category"),
        api_endpoint: ask(editor, "API endpoint"),
        token_key: ask(editor, "Token key"),
        tags: ask(editor, "Tags (comma separated, optional)").map(TagsInput::Joined),
        pricing: ask(editor, "Pricing (optional)"),
        thumbnail_url: ask(editor, "Thumbnail URL (optional)"),
        ..Default::default()
    };

    if let Some(raw) = ask(editor, "Supported inputs [text, image, document, audio] (optional)") {
        match parse_supported_inputs(&raw) {
            Ok(inputs) => model.supported_inputs = Some(inputs),
            Err(e) => {
                println!("{} {}", "Error:".red().bold(), e);
                return;
            }
        }
    }

    match context.client.create_model(&model).await {
        Ok(created) => {
            println!("Model {} created with id {}", created.name.green(), created.id.yellow());
        }
        Err(e) => print_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_inputs() {
        let inputs = parse_supported_inputs("Text, image ,").unwrap();
        assert_eq!(inputs, SupportedInputs { text: true, image: true, document: false, audio: false });
        assert!(parse_supported_inputs("video").is_err());
    }
}
