use std::io::Write;

use anyhow::Result;
use colored::*;
use rustyline::DefaultEditor;

use super::client::MarketClient;
use super::command_handlers::{
    handle_add_model, handle_categories, handle_delete_model, handle_list_models,
    handle_record_interaction, handle_show_model, handle_stats, BrowseContext,
};
use crate::registry::ModelFilter;

fn print_help() {
    println!("\n{}", "modelmart Browser Commands".cyan());
    println!("{}", "=".repeat(60).bright_cyan());
    println!("{}      - Exit the browser", "exit, bye, quit".green());
    println!("{}                 - Show this help message", "help".green());
    println!("{}                - Clear the screen", "clear".green());
    println!("{}               - List all models", "models".green());
    println!("{}        - Search name, description and tags", "search <text>".green());
    println!("{}      - List models in a category", "category <name>".green());
    println!("{}       - List models by developer id", "developer <id>".green());
    println!("{}            - Show every field of a model", "show <id>".green());
    println!("{}             - Record an interaction with a model", "use <id>".green());
    println!("{}                  - Create a new model listing", "add".green());
    println!("{}          - Delete a model listing", "delete <id>".green());
    println!("{}                - Marketplace statistics", "stats".green());
    println!("{}           - List known categories", "categories".green());
    println!();
}

/// Splits input into a lowercase command word and the untouched remainder.
fn split_command(input: &str) -> (String, &str) {
    match input.split_once(char::is_whitespace) {
        Some((command, rest)) => (command.to_lowercase(), rest.trim()),
        None => (input.to_lowercase(), ""),
    }
}

// --- Main Browse Loop ---

pub async fn browse_loop(client: MarketClient) -> Result<()> {
    println!("Connected to {}", client.base_url().yellow());
    print_help();

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline("modelmart> ");

        match readline {
            Ok(input) => {
                let input_trimmed = input.trim();
                if input_trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(input_trimmed);

                let (command, argument) = split_command(input_trimmed);
                if ["exit", "bye", "quit"].contains(&command.as_str()) {
                    println!("Goodbye!");
                    break;
                }

                let mut context = BrowseContext {
                    client: &client,
                    editor: &mut rl,
                };

                match (command.as_str(), argument) {
                    ("help", _) => print_help(),
                    ("clear", _) => {
                        print!("\x1B[2J\x1B[1;1H");
                        let _ = std::io::stdout().flush();
                    }
                    ("models", _) => handle_list_models(&context, ModelFilter::default()).await,
                    ("search", query) if !query.is_empty() => {
                        let filter = ModelFilter { query: Some(query.to_string()), ..Default::default() };
                        handle_list_models(&context, filter).await
                    }
                    ("category", category) if !category.is_empty() => {
                        let filter = ModelFilter { category: Some(category.to_string()), ..Default::default() };
                        handle_list_models(&context, filter).await
                    }
                    ("developer", developer) if developer.parse::<i64>().is_ok() => {
                        let filter = ModelFilter { developer: Some(developer.to_string()), ..Default::default() };
                        handle_list_models(&context, filter).await
                    }
                    ("show", id) if !id.is_empty() => handle_show_model(&context, id).await,
                    ("use", id) if !id.is_empty() => handle_record_interaction(&context, id).await,
                    ("delete", id) if !id.is_empty() => handle_delete_model(&mut context, id).await,
                    ("add", _) => handle_add_model(&mut context).await,
                    ("stats", _) => handle_stats(&context).await,
                    ("categories", _) => handle_categories(&context).await,
                    ("search", _) => println!("Usage: search <text>"),
                    ("category", _) => println!("Usage: category <name>"),
                    ("developer", _) => println!("Usage: developer <numeric id>"),
                    ("show", _) | ("use", _) | ("delete", _) => println!("Usage: {} <id>", command),
                    _ => println!("Unknown command '{}'. Type 'help' for a list of commands.", command),
                }
            }
            Err(_) => {
                println!("Goodbye!");
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("SEARCH  Image Gen"), ("search".to_string(), "Image Gen"));
        assert_eq!(split_command("stats"), ("stats".to_string(), ""));
    }
}
