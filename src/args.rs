use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "step-extract")]
#[command(about = "Extracts the STEP programme directory into a flat, sorted dataset")]
#[command(version)]
pub struct Args {
    /// Seed listing URL to start the crawl from
    #[arg(default_value = "https://manage.stepmarket.org/step_directory_2.php")]
    pub url: String,

    /// Load crawl settings from a JSON config file; explicit flags override it
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// Delay in seconds between pagination fetches (default 1)
    #[arg(long)]
    pub page_delay: Option<u64>,

    /// Maximum number of listing pages to traverse before aborting (default 200)
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Number of concurrent detail-page fetches per listing page (default 4)
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Apply the pagination delay to detail fetches as well
    #[arg(long)]
    pub throttle_details: bool,

    /// Total timeout in seconds (unbounded if omitted)
    #[arg(long)]
    pub total_timeout: Option<u64>,

    /// Write the dataset as JSON to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<std::path::PathBuf>,
}
