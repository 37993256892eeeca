use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Phase-by-phase progress on stderr. Scan and aggregation phases show a
/// spinner; the per-sample descriptor phase shows a counting bar.
pub struct PhaseReporter {
    bar: Option<ProgressBar>,
    start: Instant,
    phase: u8,
    total_phases: u8,
    phase_start: Instant,
}

impl PhaseReporter {
    pub fn new(total_phases: u8) -> Self {
        let now = Instant::now();
        Self {
            bar: None,
            start: now,
            phase: 0,
            total_phases,
            phase_start: now,
        }
    }

    fn begin(&mut self, bar: ProgressBar, description: &str) {
        if let Some(old) = self.bar.take() {
            old.finish_and_clear();
        }

        self.phase += 1;
        self.phase_start = Instant::now();

        bar.set_message(format!(
            "[{}/{}] {}...",
            self.phase, self.total_phases, description
        ));
        self.bar = Some(bar);
    }

    pub fn phase(&mut self, description: &str) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {msg}")
                .expect("invalid template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        self.begin(bar, description);
    }

    pub fn counted_phase(&mut self, description: &str, total: u64) {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.cyan} {msg} {pos}/{len}")
                .expect("invalid template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        self.begin(bar, description);
    }

    pub fn tick(&mut self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    pub fn complete_phase(&mut self, description: &str, notes: &[&str]) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }

        let elapsed = self.phase_start.elapsed();
        let mut stderr = io::stderr().lock();

        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m {:<44} {:>5.1}s",
            description,
            elapsed.as_secs_f64()
        );

        for note in notes {
            let _ = writeln!(stderr, "      \x1b[2m·\x1b[0m {}", note);
        }
    }

    pub fn finish(mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }

        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr);
        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m Preparation complete {:>29}",
            format!("Total: {:.2}s", self.start.elapsed().as_secs_f64())
        );
        let _ = writeln!(stderr);
    }
}

pub enum Progress {
    Interactive(PhaseReporter),
    Silent,
}

impl Progress {
    pub fn new(interactive: bool, total_phases: u8) -> Self {
        if interactive {
            Self::Interactive(PhaseReporter::new(total_phases))
        } else {
            Self::Silent
        }
    }

    pub fn phase(&mut self, description: &str) {
        if let Self::Interactive(r) = self {
            r.phase(description);
        }
    }

    pub fn counted_phase(&mut self, description: &str, total: u64) {
        if let Self::Interactive(r) = self {
            r.counted_phase(description, total);
        }
    }

    pub fn tick(&mut self) {
        if let Self::Interactive(r) = self {
            r.tick();
        }
    }

    pub fn complete_phase(&mut self, description: &str, notes: &[&str]) {
        if let Self::Interactive(r) = self {
            r.complete_phase(description, notes);
        }
    }

    pub fn finish(self) {
        if let Self::Interactive(r) = self {
            r.finish();
        }
    }
}
