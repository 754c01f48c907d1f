//! Progress bar utilities using indicatif
//!
//! Thin wrapper so every command draws the same bar while reading logs.
//! indicatif hides the bar on its own when stderr is not a terminal.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

/// Progress bar wrapper for displaying processing status
pub struct ProgressBar {
    bar: IndicatifBar,
}

impl ProgressBar {
    /// Create a byte-based progress bar for a file of known size
    pub fn new(total_bytes: u64, label: &str) -> Self {
        let bar = IndicatifBar::new(total_bytes);
        // Templates are constants; fall back to the default style if one is rejected.
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {percent:>3}% ({bytes}/{total_bytes}) {eta}")
        {
            bar.set_style(style.progress_chars("█░"));
        }
        bar.set_message(label.to_string());

        Self { bar }
    }

    /// Create a spinner for input of unknown size (stdin)
    pub fn new_spinner(label: &str) -> Self {
        let bar = IndicatifBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg} {spinner} {pos} lines") {
            bar.set_style(style);
        }
        bar.set_message(label.to_string());

        Self { bar }
    }

    /// Update progress
    pub fn update(&self, current: u64) {
        self.bar.set_position(current);
    }

    /// Finish the progress bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
