use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

/// Percentage with one decimal, `0.0 %` when nothing was attempted.
pub fn score_to_str(correct: u32, total: u32) -> String {
    let score = if total == 0 {
        0.0
    } else {
        f64::from(correct) * 100.0 / f64::from(total)
    };
    format!("{score:.1} %")
}

/// Running score of a practice or test session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub correct: u32,
    pub attempted: u32,
}

impl Tally {
    pub fn record(&mut self, correct: bool) {
        self.attempted += 1;
        if correct {
            self.correct += 1;
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} of {} = {}",
            self.correct,
            self.attempted,
            score_to_str(self.correct, self.attempted)
        )
    }
}

#[derive(Clone, Debug)]
pub struct TestResult {
    pub timestamp: DateTime<Local>,
    pub topic: String,
    pub actor: String,
    pub tally: Tally,
}

impl TestResult {
    pub fn new(topic: &str, actor: &str, tally: Tally) -> Self {
        Self {
            timestamp: Local::now(),
            topic: topic.to_string(),
            actor: actor.to_string(),
            tally,
        }
    }

    pub fn to_log_line(&self) -> String {
        format!(
            "{} {:<30} {:<10}{:>6}{:>6}{:>7}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.topic,
            self.actor,
            format!(" {}", self.tally.correct),
            format!(" {}", self.tally.attempted),
            format!(" {}", score_to_str(self.tally.correct, self.tally.attempted)),
        )
    }
}

/// Append-only log of finished tests, one line each.
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, result: &TestResult) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", result.to_log_line())?;
        info!(
            topic = %result.topic,
            actor = %result.actor,
            correct = result.tally.correct,
            attempted = result.tally.attempted,
            "test result logged"
        );
        Ok(())
    }
}
