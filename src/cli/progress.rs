//! Progress Rendering
//!
//! Turns `PipelineEvent`s from the facade's broadcast channel into one
//! console line per event on stderr, leaving stdout for content.

use std::time::Instant;

use console::style;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::pipeline::PipelineEvent;

/// Console renderer for pipeline events
pub struct ProgressRenderer {
    started: Instant,
    show_agents: bool,
}

impl ProgressRenderer {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            show_agents: true,
        }
    }

    pub fn with_agents(mut self, show: bool) -> Self {
        self.show_agents = show;
        self
    }

    /// Line for one event; `None` for events this renderer hides
    pub fn render(&self, event: &PipelineEvent) -> Option<String> {
        let elapsed = style(format_duration(self.started.elapsed().as_secs())).dim();

        let line = match event {
            PipelineEvent::StageStarted { stage, .. } => {
                format!("{} {} {}", elapsed, style("▶").cyan(), stage)
            }
            PipelineEvent::SectionCompleted {
                index,
                total,
                title,
                words,
                ..
            } => format!(
                "{} {} {} {} {}",
                elapsed,
                render_progress_bar(index + 1, *total, 20),
                style(format!("{}/{}", index + 1, total)).bold(),
                title,
                style(format!("({} words)", words)).dim()
            ),
            PipelineEvent::AgentReviewed {
                iteration,
                agent,
                score,
                passed,
                ..
            } => {
                if !self.show_agents {
                    return None;
                }
                let mark = if *passed {
                    style("✓").green()
                } else {
                    style("✗").red()
                };
                format!(
                    "{}   {} round {} {:<28} {:.1}",
                    elapsed, mark, iteration, agent, score
                )
            }
            PipelineEvent::RevisionApplied {
                iteration,
                score,
                words,
                ..
            } => format!(
                "{} {} revised after round {} (score {:.1}, {} words)",
                elapsed,
                style("↻").yellow(),
                iteration,
                score,
                words
            ),
            PipelineEvent::StageCompleted {
                stage, elapsed_ms, ..
            } => format!(
                "{} {} {} {}",
                elapsed,
                style("✓").green(),
                stage,
                style(format!("{:.1}s", *elapsed_ms as f64 / 1000.0)).dim()
            ),
        };
        Some(line)
    }

    /// Print events until the channel closes or the task is aborted
    pub fn spawn(self, mut events: broadcast::Receiver<PipelineEvent>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if let Some(line) = self.render(&event) {
                            eprintln!("{}", line);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Progress renderer lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for ProgressRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a simple progress bar
fn render_progress_bar(completed: usize, total: usize, width: usize) -> String {
    if total == 0 {
        return format!("[{}]", " ".repeat(width));
    }

    let progress = (completed as f32 / total as f32).min(1.0);
    let filled = (progress * width as f32) as usize;
    let empty = width.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Format duration as human-readable string
fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
