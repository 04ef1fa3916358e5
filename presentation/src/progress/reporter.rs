//! Progress reporting for batch discussion runs

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use mods_application::ports::progress::DiscussionProgress;
use mods_domain::{DiscussionPoint, VariantKey};
use std::sync::Mutex;

/// Progress bars: one per dataset, plus one for the topics of the current
/// item across all variants.
pub struct BatchProgressReporter {
    multi: MultiProgress,
    variant_count: usize,
    dataset_bar: Mutex<Option<ProgressBar>>,
    topic_bar: Mutex<Option<ProgressBar>>,
}

impl BatchProgressReporter {
    pub fn new(variant_count: usize) -> Self {
        Self {
            multi: MultiProgress::new(),
            variant_count: variant_count.max(1),
            dataset_bar: Mutex::new(None),
            topic_bar: Mutex::new(None),
        }
    }

    fn dataset_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn topic_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("  {prefix:.bold} [{bar:30.yellow/blue}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(slot: &Mutex<Option<ProgressBar>>, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = slot.lock()
            && let Some(bar) = guard.as_ref()
        {
            f(bar);
        }
    }

    fn clear_topics(&self) {
        if let Ok(mut guard) = self.topic_bar.lock()
            && let Some(bar) = guard.take()
        {
            bar.finish_and_clear();
        }
    }
}

impl DiscussionProgress for BatchProgressReporter {
    fn on_dataset_start(&self, dataset: &str, total: usize, skipped: usize) {
        let bar = self.multi.add(ProgressBar::new(total as u64));
        bar.set_style(Self::dataset_style());
        bar.set_prefix(dataset.to_string());
        bar.set_position(skipped as u64);
        if skipped > 0 {
            bar.set_message(format!("resumed after {} items", skipped));
        }
        if let Ok(mut guard) = self.dataset_bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_item_start(&self, _dataset: &str, index: usize) {
        Self::with_bar(&self.dataset_bar, |bar| {
            bar.set_message(format!("item {}", index + 1));
        });
    }

    fn on_item_complete(&self, _dataset: &str, index: usize, failed: bool) {
        self.clear_topics();
        Self::with_bar(&self.dataset_bar, |bar| {
            let status = if failed {
                format!("{} item {}", "x".red(), index + 1)
            } else {
                format!("{} item {}", "v".green(), index + 1)
            };
            bar.set_message(status);
            bar.inc(1);
        });
    }

    fn on_dataset_complete(&self, dataset: &str) {
        if let Ok(mut guard) = self.dataset_bar.lock()
            && let Some(bar) = guard.take()
        {
            bar.finish_with_message(format!("{} complete", dataset.green()));
        }
    }

    fn on_checkpoint(&self, location: &str, items: usize) {
        let _ = self.multi.println(format!(
            "{} checkpoint after {} items: {}",
            "->".cyan(),
            items,
            location
        ));
    }

    fn on_topics_planned(&self, topics: &[DiscussionPoint]) {
        self.clear_topics();
        let bar = self
            .multi
            .add(ProgressBar::new((topics.len() * self.variant_count) as u64));
        bar.set_style(Self::topic_style());
        bar.set_prefix("topics");
        if let Ok(mut guard) = self.topic_bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_topic_start(&self, variant: VariantKey, index: usize, topic: &DiscussionPoint) {
        Self::with_bar(&self.topic_bar, |bar| {
            bar.set_message(format!("[{}] {}. {}", variant, index + 1, topic));
        });
    }

    fn on_speakers_selected(&self, _index: usize, _speakers: usize) {
        Self::with_bar(&self.topic_bar, |bar| bar.inc(1));
    }

    fn on_session_retry(&self, attempt: usize, max_attempts: usize, error: &str) {
        let _ = self.multi.println(format!(
            "  {} session attempt {}/{} failed: {}",
            "!".yellow(),
            attempt,
            max_attempts,
            error
        ));
    }
}

/// Plain line-per-event progress (no terminal control codes)
pub struct SimpleProgress;

impl DiscussionProgress for SimpleProgress {
    fn on_dataset_start(&self, dataset: &str, total: usize, skipped: usize) {
        println!(
            "{} {} ({} items, {} already done)",
            "->".cyan(),
            dataset.bold(),
            total,
            skipped
        );
    }

    fn on_item_complete(&self, dataset: &str, index: usize, failed: bool) {
        if failed {
            println!("  {} {} #{} (failed)", "x".red(), dataset, index + 1);
        } else {
            println!("  {} {} #{}", "v".green(), dataset, index + 1);
        }
    }

    fn on_checkpoint(&self, location: &str, items: usize) {
        println!("  {} checkpoint after {} items: {}", "->".cyan(), items, location);
    }

    fn on_session_retry(&self, attempt: usize, max_attempts: usize, error: &str) {
        println!(
            "  {} session attempt {}/{} failed: {}",
            "!".yellow(),
            attempt,
            max_attempts,
            error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;

    fn hidden_reporter() -> BatchProgressReporter {
        let reporter = BatchProgressReporter::new(2);
        reporter.multi.set_draw_target(ProgressDrawTarget::hidden());
        reporter
    }

    #[test]
    fn test_dataset_bar_tracks_items() {
        let reporter = hidden_reporter();
        reporter.on_dataset_start("news", 5, 2);
        reporter.on_item_start("news", 2);
        reporter.on_item_complete("news", 2, false);

        let guard = reporter.dataset_bar.lock().unwrap();
        let bar = guard.as_ref().unwrap();
        assert_eq!(bar.position(), 3);
        assert_eq!(bar.length(), Some(5));
    }

    #[test]
    fn test_topic_bar_spans_variants() {
        let reporter = hidden_reporter();
        let topics = vec![DiscussionPoint::new("Air"), DiscussionPoint::new("Cost")];
        reporter.on_topics_planned(&topics);
        reporter.on_topic_start(VariantKey::default(), 0, &topics[0]);
        reporter.on_speakers_selected(0, 2);
        {
            let guard = reporter.topic_bar.lock().unwrap();
            let bar = guard.as_ref().unwrap();
            assert_eq!(bar.length(), Some(4));
            assert_eq!(bar.position(), 1);
        }

        reporter.on_item_complete("news", 0, false);
        assert!(reporter.topic_bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_dataset_complete_releases_bar() {
        let reporter = hidden_reporter();
        reporter.on_dataset_start("news", 1, 0);
        reporter.on_dataset_complete("news");
        assert!(reporter.dataset_bar.lock().unwrap().is_none());
    }
}
