//! Sequential processing of every file in the style directory
//!
//! The first failure aborts the whole batch; styles after it are never
//! touched.

use crate::io::error::{Result, WithPath};
use crate::io::progress::ProgressManager;
use crate::pipeline::transfer::{StyleOutcome, StyleTransfer};
use std::path::{Path, PathBuf};

/// All regular files in `dir`, sorted by path
///
/// No extension filtering takes place; anything that is not a decodable image
/// fails later when it is loaded.
///
/// # Errors
///
/// Returns an error if the directory or one of its entries cannot be read
pub fn collect_style_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_path(dir, "read style directory")? {
        let path = entry.with_path(dir, "read style directory entry")?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Stylise the content image with every file in `style_dir`
///
/// # Errors
///
/// Returns the first error encountered; outputs written before it remain on
/// disk
pub fn run_batch(
    transfer: &StyleTransfer,
    style_dir: &Path,
    progress: Option<&mut ProgressManager>,
) -> Result<Vec<StyleOutcome>> {
    let files = collect_style_images(style_dir)?;
    tracing::info!(count = files.len(), dir = %style_dir.display(), "found style images");
    run_files(transfer, &files, progress)
}

/// Stylise the content image with each of `files` in order
///
/// # Errors
///
/// Returns the first error encountered; progress bars are removed before it
/// is returned
pub fn run_files(
    transfer: &StyleTransfer,
    files: &[PathBuf],
    mut progress: Option<&mut ProgressManager>,
) -> Result<Vec<StyleOutcome>> {
    if let Some(pm) = progress.as_deref_mut() {
        pm.initialize(files.len());
    }

    let result = stylize_each(transfer, files, progress.as_deref_mut());

    if let Some(pm) = progress {
        if result.is_ok() {
            pm.finish();
        } else {
            pm.abandon();
        }
    }
    result
}

fn stylize_each(
    transfer: &StyleTransfer,
    files: &[PathBuf],
    mut progress: Option<&mut ProgressManager>,
) -> Result<Vec<StyleOutcome>> {
    let iterations = transfer.config().trainer.iterations;
    let mut outcomes = Vec::with_capacity(files.len());

    for (index, file) in files.iter().enumerate() {
        tracing::info!(
            style = %file.display(),
            index = index + 1,
            total = files.len(),
            "processing style"
        );

        let outcome = match progress.as_deref_mut() {
            Some(pm) => {
                pm.start_style(file, iterations);
                let outcome = transfer.stylize(file, &mut *pm)?;
                pm.complete_style();
                outcome
            }
            None => transfer.stylize(file, &mut ())?,
        };
        outcomes.push(outcome);
    }

    Ok(outcomes)
}
