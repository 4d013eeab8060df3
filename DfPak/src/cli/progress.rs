//! CLI progress display utilities
//!
//! Step indicators plus a percentage bar fed from
//! [`PackageProgress`](crate::dfpf::PackageProgress) updates.

use std::time::Duration;

use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

use crate::dfpf::PackageProgress;

/// Magnifying glass - for reading/scanning operations
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Package - for extraction operations
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");
/// Floppy disk - for writing/saving operations
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

/// Print a step indicator: `[1/2] 📦 Message...`
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    println!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print completion message: `✨ Done in 2s`
pub fn print_done(elapsed: Duration) {
    println!("{} Done in {}", SPARKLE, HumanDuration(elapsed));
}

/// Progress bar style led by the percentage
///
/// Format: `[ 50%] Extracting data/foo... [████████░░░░░░░░]`
///
/// # Panics
/// Panics if the template string is invalid (this is a compile-time constant).
#[must_use]
pub fn percent_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("[{percent:>3}%] {wide_msg} [{bar:30.cyan/blue}]")
        .expect("valid template")
}

/// Create a progress bar for `total` package entries
#[must_use]
pub fn package_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(percent_style());
    pb
}

/// Move `pb` to the position and message of a package update
pub fn apply_progress(pb: &ProgressBar, progress: &PackageProgress) {
    pb.set_length(progress.total as u64);
    pb.set_position(progress.current as u64);
    pb.set_message(progress.message());
}
