use console::style;

use crate::ai::usage::UsageSummary;
use crate::types::{AgentReview, PublishResult, ReviewResult, SectionPlan};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        eprintln!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        eprintln!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        eprintln!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        eprintln!("\n{}", style(message).bold());
        eprintln!("{}", "─".repeat(40));
    }

    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        eprintln!("  {:<14} {}", style(label).dim(), value);
    }

    // =========================================================================
    // Pipeline Results
    // =========================================================================

    pub fn plan(&self, content_type: &str, plan: &SectionPlan) {
        self.section(&format!("Section plan: {}", content_type));
        for (i, section) in plan.iter().enumerate() {
            eprintln!(
                "  {}. {} {}",
                i + 1,
                style(&section.title).bold(),
                style(format!("({}-{} words)", section.min_words, section.max_words)).dim()
            );
            eprintln!("     {}", section.instruction);
        }
        let bounds = plan.aggregate_bounds();
        self.field("Total", bounds);
    }

    pub fn agent_reviews<'a>(&self, reviews: impl IntoIterator<Item = &'a AgentReview>) {
        for review in reviews {
            let mark = if review.passed {
                style("✓").green()
            } else {
                style("✗").red()
            };
            eprintln!(
                "  {} [{}] {:<28} {:.1}",
                mark, review.iteration, review.agent, review.score
            );
            for weakness in &review.weaknesses {
                eprintln!("      {} {}", style("-").dim(), weakness);
            }
        }
    }

    pub fn review(&self, review: &ReviewResult) {
        self.section("Review");
        self.agent_reviews(&review.reviews);
        eprintln!();
        let history: Vec<String> = review.score_history.iter().map(|s| format!("{:.1}", s)).collect();
        self.field("Scores", history.join(" → "));
        self.field("Iterations", review.iterations);
        self.field("Verdict", review.verdict);
        if review.approved {
            self.success(&format!("Approved at {:.1}", review.final_score));
        } else {
            self.warning(&format!("Not approved ({:.1})", review.final_score));
        }
    }

    pub fn publish(&self, result: &PublishResult) {
        if !result.reviews.is_empty() {
            self.section("Review");
            self.agent_reviews(&result.reviews);
        }

        self.section("Publish");
        self.field("Title", &result.seo.title);
        self.field("Slug", &result.seo.slug);
        self.field("Description", &result.seo.description);
        if !result.seo.keywords.is_empty() {
            self.field("Keywords", result.seo.keywords.join(", "));
        }
        self.field("Words", format!("{} ({})", result.word_count, result.word_bounds));
        self.field("Readability", format!("{:.1}", result.readability_score));
        if let Some(score) = result.final_score {
            self.field("Score", format!("{:.1} after {} round(s)", score, result.iterations));
        }
        if let Some(slop) = &result.slop {
            self.field("Slop quality", format!("{:.0}", slop.quality_score));
            if !slop.matched_phrases.is_empty() {
                self.field("Filler", slop.matched_phrases.join(", "));
            }
        }

        eprintln!();
        if result.publish_ready {
            self.success("Ready to publish");
        } else {
            for blocker in &result.blockers {
                self.error(&blocker.to_string());
            }
        }
    }

    pub fn usage(&self, usage: &UsageSummary) {
        self.section("Usage");
        for line in usage.display().lines() {
            eprintln!("  {}", line);
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
