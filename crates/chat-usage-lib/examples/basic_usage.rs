use chat_usage_report::prelude::*;
use chat_usage_report::report::{format_cost, format_number};
use chat_usage_report::DEFAULT_EXPORT_PATH;
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let path = args
        .get(1)
        .map(|p| shellexpand::tilde(p).into_owned())
        .unwrap_or_else(|| DEFAULT_EXPORT_PATH.to_string());

    if !Path::new(&path).is_file() {
        eprintln!("Export file not found: {}", path);
        eprintln!();
        eprintln!("Usage: {} [path_to_conversations.json]", args[0]);
        std::process::exit(1);
    }

    println!("Loading conversation export from: {}", path);
    let mut monitor = UsageMonitor::new(PricingConfig::default());
    monitor.load_data(&path)?;

    if monitor.is_empty() {
        println!("No dated user or assistant messages found.");
        return Ok(());
    }

    let report = monitor.report()?;

    println!("\n--- Overall Statistics ---");
    println!(
        "Input tokens: {}",
        format_number(monitor.input_usage().total())
    );
    println!(
        "Output tokens: {}",
        format_number(monitor.output_usage().total())
    );
    println!("Total cost: ${}", format_cost(report.total_cost()));

    if let Some(busiest) = report
        .monthly()
        .iter()
        .max_by_key(|row| row.total_tokens())
    {
        println!(
            "Busiest month: {} ({} tokens, ${})",
            busiest.month(),
            format_number(busiest.total_tokens()),
            format_cost(busiest.cost_usd())
        );
    }

    let pricing = monitor.pricing();
    println!("\n--- Pricing ---");
    println!("Model: {}", pricing.model());
    println!("Input: ${}/1M tokens", pricing.input_cost_per_million());
    println!("Output: ${}/1M tokens", pricing.output_cost_per_million());
    println!(
        "Images: {} tokens + {} per 512x512 tile",
        pricing.base_image_tokens(),
        pricing.image_tile_tokens()
    );

    println!("\n--- Monthly Usage ---");
    print!("{}", report.render());

    Ok(())
}
