//! Progress display for a batch of style images

use crate::training::trainer::{LossSample, TrainingObserver};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;

static STEP_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{prefix} [{bar:30.cyan/blue}] {pos}/{len} [{elapsed}<{eta}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Styles: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// Batch bar over style files plus an iteration bar for the current style
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    style_bar: Option<ProgressBar>,
    last_loss: Option<f64>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Draw to the terminal
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Track progress without drawing anything
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi_progress: MultiProgress::with_draw_target(target),
            batch_bar: None,
            style_bar: None,
            last_loss: None,
        }
    }

    /// Create the batch bar for `file_count` styles
    pub fn initialize(&mut self, file_count: usize) {
        let batch_bar = ProgressBar::new(file_count as u64);
        batch_bar.set_style(BATCH_STYLE.clone());
        self.batch_bar = Some(self.multi_progress.add(batch_bar));
    }

    /// Show an iteration bar for a new style image
    pub fn start_style(&mut self, path: &Path, iterations: usize) {
        let display_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let bar = ProgressBar::new(iterations as u64);
        bar.set_style(STEP_STYLE.clone());
        bar.set_prefix(display_name);
        self.style_bar = Some(self.multi_progress.add(bar));
        self.last_loss = None;
    }

    /// Remove the iteration bar and advance the batch bar
    pub fn complete_style(&mut self) {
        if let Some(bar) = self.style_bar.take() {
            bar.finish_and_clear();
            self.multi_progress.remove(&bar);
        }
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }
    }

    /// Styles completed so far
    pub fn completed_styles(&self) -> u64 {
        self.batch_bar.as_ref().map_or(0, ProgressBar::position)
    }

    /// Steps completed for the current style
    pub fn current_step(&self) -> u64 {
        self.style_bar.as_ref().map_or(0, ProgressBar::position)
    }

    /// Most recent logged loss of the current style
    pub const fn last_loss(&self) -> Option<f64> {
        self.last_loss
    }

    /// Whether any bar is still attached to the display
    pub const fn is_active(&self) -> bool {
        self.batch_bar.is_some() || self.style_bar.is_some()
    }

    /// Drop every bar after a fatal error so the error prints on a clean line
    pub fn abandon(&mut self) {
        for bar in [self.style_bar.take(), self.batch_bar.take()]
            .into_iter()
            .flatten()
        {
            bar.abandon();
            self.multi_progress.remove(&bar);
        }
        let _ = self.multi_progress.clear();
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All styles processed");
        }
        let _ = self.multi_progress.clear();
    }
}

impl TrainingObserver for ProgressManager {
    fn on_step(&mut self, completed: usize, _total: usize) {
        if let Some(ref bar) = self.style_bar {
            bar.set_position(completed as u64);
        }
    }

    fn on_log(&mut self, sample: &LossSample) {
        self.last_loss = Some(sample.total);
        if let Some(ref bar) = self.style_bar {
            bar.set_message(format!("loss {:.4e}", sample.total));
        }
    }
}
