//! Terminal progress for the distance stage.

use std::io::{self, IsTerminal};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use seqprof_core::DistanceProgress;

pub struct DistanceBar {
    bar: ProgressBar,
}

impl DistanceBar {
    /// Drawn on stderr only when it is a terminal and `enabled` is set.
    pub fn new(enabled: bool) -> Self {
        let bar = ProgressBar::hidden();
        if enabled && io::stderr().is_terminal() {
            bar.set_draw_target(ProgressDrawTarget::stderr());
        }
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner} distances {bar:40} {pos}/{len} sequences ({eta})",
        ) {
            bar.set_style(style);
        }
        Self { bar }
    }
}

impl DistanceProgress for DistanceBar {
    fn start(&self, rows: usize) {
        self.bar.set_length(rows as u64);
    }

    fn advance(&self, rows: usize) {
        self.bar.inc(rows as u64);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
