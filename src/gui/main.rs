//! Dialog-driven converter: pick images, pick a folder, convert.

use anyhow::Result;

use exif_carry::config::Config;
use exif_carry::pickers::{self, DialogPicker};
use exif_carry::pipeline::BatchSummary;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let config = Config::load(None)?;
    let picker = DialogPicker;
    let results = pickers::run_batch(&picker, &picker, &config)?;

    let summary = BatchSummary::from_results(&results);
    log::info!(
        "Done: {} succeeded, {} failed out of {} images",
        summary.succeeded,
        summary.failed,
        summary.total
    );
    for result in results.iter().filter(|r| !r.is_ok()) {
        if let Some(ref err) = result.error {
            log::error!("  {}: {err}", result.input.display());
        }
    }

    Ok(())
}
