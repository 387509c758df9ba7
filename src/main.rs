use anyhow::Result;
use clap::Parser;

use lead_form_submit::orchestrator::{App, RunOptions};
use lead_form_submit::{logger, Config};

/// Paced lead submission into the target web form.
#[derive(Debug, Parser)]
#[command(name = "lead_form_submit", version)]
struct Cli {
    /// 0-based record offset to start from.
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Maximum number of records to process (default: all remaining).
    #[arg(long)]
    max: Option<usize>,

    /// Single-record trial mode; overrides --max.
    #[arg(long)]
    trial: bool,

    /// Configuration file.
    #[arg(long, default_value = "config.toml")]
    config: String,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            start_offset: self.start,
            max_records: if self.trial { Some(1) } else { self.max },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let app = App::initialize(config).await?;
    let result = app.run(cli.run_options()).await;
    app.shutdown().await;

    result?;
    Ok(())
}
