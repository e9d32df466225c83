use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use colored::*;

use crate::registry::{Model, ModelStatus, RegistryStats};

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(label).fg(Color::Cyan).add_attribute(Attribute::Bold))
        .collect()
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn status_cell(status: ModelStatus) -> Cell {
    let color = match status {
        ModelStatus::Active => Color::Green,
        ModelStatus::Inactive => Color::DarkGrey,
        ModelStatus::Pending => Color::Yellow,
    };
    Cell::new(status).fg(color).set_alignment(CellAlignment::Center)
}

/// Displays a table of models with colorful formatting.
pub fn display_models_table(models: &[Model]) {
    if models.is_empty() {
        println!("{}", "No models found".yellow());
        return;
    }

    let mut table = new_table();
    table.set_header(header(&[
        "#", "ID", "Name", "Category", "Rating", "Interactions", "Tags", "Status",
    ]));

    for (i, model) in models.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1).fg(Color::White).set_alignment(CellAlignment::Center),
            Cell::new(&model.id).fg(Color::DarkGrey),
            Cell::new(&model.name).fg(Color::Green),
            Cell::new(&model.category).fg(Color::Magenta),
            Cell::new(format!("{:.1}", model.rating)).fg(Color::Yellow).set_alignment(CellAlignment::Right),
            Cell::new(model.interactions).fg(Color::White).set_alignment(CellAlignment::Right),
            Cell::new(model.tags.join(", ")).fg(Color::Blue),
            status_cell(model.status),
        ]);
    }

    println!("\n{}", table);
    println!("{}", format!("Total models: {}", models.len()).bright_green());
}

/// Displays every field of a single model.
pub fn display_model_details(model: &Model) {
    let mut table = new_table();
    table.set_header(header(&["Field", "Value"]));

    let rows: Vec<(&str, String)> = vec![
        ("ID", model.id.clone()),
        ("Name", model.name.clone()),
        ("Description", model.description.clone()),
        ("Category", model.category.clone()),
        ("API endpoint", model.api_endpoint.clone()),
        ("Token key", model.token_key.clone()),
        ("Tags", model.tags.join(", ")),
        ("Supported inputs", model.supported_inputs.to_string()),
        ("Pricing", model.pricing.clone()),
        ("Thumbnail", model.thumbnail_url.clone()),
        ("Developer", model.developer_id.to_string()),
        ("Rating", format!("{:.1}", model.rating)),
        ("Interactions", model.interactions.to_string()),
        ("Status", model.status.to_string()),
        ("Created", model.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ("Last updated", model.last_updated.to_string()),
    ];

    for (field, value) in rows {
        table.add_row(vec![
            Cell::new(field).fg(Color::Yellow),
            Cell::new(value).fg(Color::White),
        ]);
    }

    println!("\n{}", table);
}

fn ranking_table(title: &str, models: &[Model]) {
    println!("\n{}", title.bright_cyan().bold());
    if models.is_empty() {
        println!("{}", "  (none)".bright_black());
        return;
    }
    let mut table = new_table();
    table.set_header(header(&["#", "Name", "Category", "Rating", "Interactions", "Created"]));
    for (i, model) in models.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1).set_alignment(CellAlignment::Center),
            Cell::new(&model.name).fg(Color::Green),
            Cell::new(&model.category).fg(Color::Magenta),
            Cell::new(format!("{:.1}", model.rating)).set_alignment(CellAlignment::Right),
            Cell::new(model.interactions).set_alignment(CellAlignment::Right),
            Cell::new(model.created_at.format("%Y-%m-%d").to_string()).fg(Color::DarkGrey),
        ]);
    }
    println!("{}", table);
}

/// Displays registry statistics: totals, category breakdown and rankings.
pub fn display_stats(stats: &RegistryStats) {
    println!("\n{}", "Marketplace statistics".bright_cyan().bold());
    println!("{}", "=".repeat(60).bright_black());
    println!("Total models:       {}", stats.total_models.to_string().bright_green());
    println!("Total interactions: {}", stats.total_interactions.to_string().bright_green());
    println!("Average rating:     {}", format!("{:.2}", stats.average_rating).bright_green());

    if !stats.category_counts.is_empty() {
        let mut table = new_table();
        table.set_header(header(&["Category", "Models"]));
        for (category, count) in &stats.category_counts {
            table.add_row(vec![
                Cell::new(category).fg(Color::Magenta),
                Cell::new(count).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("\n{}", table);
    }

    ranking_table("Recently added", &stats.recent_models);
    ranking_table("Top rated", &stats.top_rated_models);
    ranking_table("Most popular", &stats.most_popular_models);
}

pub fn display_categories(categories: &[String]) {
    println!("\n{}", "Categories".bright_cyan().bold());
    for category in categories {
        println!("  {} {}", "•".bright_black(), category.green());
    }
}
