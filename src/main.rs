//! CLI entry point for batch neural style transfer

use clap::Parser;
use renaissance::io::cli::{Cli, wait_for_enter};
use renaissance::io::progress::ProgressManager;
use renaissance::pipeline::batch::run_batch;
use renaissance::pipeline::transfer::StyleTransfer;

fn main() -> renaissance::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = cli.transfer_config();
    tracing::info!(device = ?config.device, "starting style transfer");

    let transfer = StyleTransfer::new(config)?;
    let mut progress = cli.should_show_progress().then(ProgressManager::new);
    let outcomes = run_batch(&transfer, &cli.styles, progress.as_mut())?;

    for outcome in &outcomes {
        tracing::info!(
            style = %outcome.style.display(),
            output = %outcome.output.display(),
            final_loss = outcome.report.final_loss,
            "style done"
        );
    }

    if cli.should_wait() {
        tracing::info!("press Enter to exit");
        wait_for_enter(&mut std::io::stdin().lock())?;
    }

    Ok(())
}
