use std::time::Duration;

use tokio::time::Instant;

/// A single re-armable deadline.
///
/// `schedule()` replaces any pending deadline, so a burst of triggers inside
/// the delay collapses into one firing. The owner awaits [`Debouncer::due`]
/// on its event loop and calls [`Debouncer::take_due`] when it resolves.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn schedule(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Resolves once the pending deadline has passed. Never resolves while
    /// nothing is scheduled.
    pub async fn due(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }

    /// Clears the deadline if it has passed.
    pub fn take_due(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
