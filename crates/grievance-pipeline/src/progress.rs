//! Batch progress reporting

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

/// Progress after one completed row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub message: String,
}

impl BatchProgress {
    pub fn new(completed: usize, total: usize) -> Self {
        Self {
            completed,
            total,
            message: format!("Processing Ticket {completed}/{total}..."),
        }
    }

    /// Completed share in [0, 1]; an empty batch counts as done
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f32 / self.total as f32
        }
    }
}

/// Receives progress updates while a batch runs
pub trait ProgressReporter {
    fn report(&mut self, progress: &BatchProgress);
}

impl<F> ProgressReporter for F
where
    F: FnMut(&BatchProgress),
{
    fn report(&mut self, progress: &BatchProgress) {
        self(progress)
    }
}

/// Discards progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&mut self, _progress: &BatchProgress) {}
}

/// Logs progress at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&mut self, progress: &BatchProgress) {
        info!(
            completed = progress.completed,
            total = progress.total,
            "{}",
            progress.message
        );
    }
}

/// Forwards progress to a channel, e.g. for a UI task
#[derive(Debug, Clone)]
pub struct ChannelProgress(pub UnboundedSender<BatchProgress>);

impl ProgressReporter for ChannelProgress {
    fn report(&mut self, progress: &BatchProgress) {
        // A dropped receiver only means nobody is watching any more
        let _ = self.0.send(progress.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_and_message() {
        let progress = BatchProgress::new(3, 4);
        assert_eq!(progress.fraction(), 0.75);
        assert_eq!(progress.message, "Processing Ticket 3/4...");
        assert_eq!(BatchProgress::new(0, 0).fraction(), 1.0);
    }

    #[test]
    fn test_closure_reporter() {
        let mut seen = Vec::new();
        {
            let mut reporter = |p: &BatchProgress| seen.push(p.completed);
            reporter.report(&BatchProgress::new(1, 2));
            reporter.report(&BatchProgress::new(2, 2));
        }
        assert_eq!(seen, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_channel_reporter() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut reporter = ChannelProgress(tx);
        reporter.report(&BatchProgress::new(1, 1));
        drop(reporter);

        assert_eq!(rx.recv().await.unwrap().fraction(), 1.0);
        assert!(rx.recv().await.is_none());
    }
}
