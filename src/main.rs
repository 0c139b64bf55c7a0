use clap::Parser;
use step_extract::Extraction;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    ::log::info!("Starting extraction from: {}", args.url);

    let mut extraction = Extraction::new(&args.url);
    if let Some(path) = &args.config {
        extraction = match extraction.with_config_file(path) {
            Ok(extraction) => extraction,
            Err(e) => {
                ::log::error!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        };
    }
    if let Some(seconds) = args.page_delay {
        extraction = extraction.with_page_delay(seconds);
    }
    if let Some(max_pages) = args.max_pages {
        extraction = extraction.with_max_pages(max_pages);
    }
    if let Some(concurrency) = args.concurrency {
        extraction = extraction.with_detail_concurrency(concurrency);
    }
    if args.throttle_details {
        extraction = extraction.with_throttled_details(true);
    }
    if let Some(seconds) = args.total_timeout {
        extraction = extraction.with_total_timeout(seconds);
    }

    let start_time = std::time::Instant::now();

    let dataset = match extraction.run().await {
        Ok(dataset) => dataset,
        Err(e) => {
            ::log::error!("Extraction failed: {}", e);
            std::process::exit(1);
        }
    };

    ::log::info!(
        "Extracted {} rows in {:.2} seconds",
        dataset.len(),
        start_time.elapsed().as_secs_f64()
    );

    let json = match serde_json::to_string_pretty(&dataset.rows) {
        Ok(json) => json,
        Err(e) => {
            ::log::error!("Failed to serialize dataset: {}", e);
            std::process::exit(1);
        }
    };

    match args.output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, json) {
                ::log::error!("Failed to write {}: {}", path.display(), e);
                std::process::exit(1);
            }
            ::log::info!("Dataset written to {}", path.display());
        }
        None => println!("{}", json),
    }
}
