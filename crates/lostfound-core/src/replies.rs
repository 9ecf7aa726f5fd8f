//! Cosmetic reply latency for chat front ends.
//!
//! Bot replies are produced synchronously by `IntakeSession`; this module only
//! delays when they are shown. A single worker task delivers messages in the
//! order they were scheduled, each no earlier than its own deadline. Pending
//! deliveries are never cancelled.

use crate::session::ReplyKind;
use crate::types::ChatMessage;
use log::debug;
use lostfound_config::ChatConfig;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// Display delays per reply kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTiming {
    pub prompt: Duration,
    pub summary: Duration,
}

impl ReplyTiming {
    /// Deliver everything without delay.
    pub fn immediate() -> Self {
        Self {
            prompt: Duration::ZERO,
            summary: Duration::ZERO,
        }
    }

    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            prompt: Duration::from_millis(config.reply_delay_ms),
            summary: Duration::from_millis(config.summary_delay_ms),
        }
    }

    pub fn delay_for(&self, kind: ReplyKind) -> Duration {
        match kind {
            ReplyKind::Prompt => self.prompt,
            ReplyKind::Summary => self.summary,
        }
    }
}

impl Default for ReplyTiming {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

/// Schedules transcript appends after a delay.
///
/// Dropping the scheduler lets the worker finish what is queued and then
/// close the delivery channel.
#[derive(Debug)]
pub struct ReplyScheduler {
    queue: mpsc::UnboundedSender<(Instant, ChatMessage)>,
    timing: ReplyTiming,
}

impl ReplyScheduler {
    /// Spawn the delivery worker on the current tokio runtime.
    ///
    /// Returns the scheduler, the receiver front ends read delivered messages
    /// from, and the worker handle.
    pub fn spawn(
        timing: ReplyTiming,
    ) -> (Self, mpsc::UnboundedReceiver<ChatMessage>, JoinHandle<()>) {
        let (queue, mut pending) = mpsc::unbounded_channel::<(Instant, ChatMessage)>();
        let (delivered, output) = mpsc::unbounded_channel();
        let worker = tokio::spawn(async move {
            while let Some((deadline, message)) = pending.recv().await {
                sleep_until(deadline).await;
                debug!(
                    "delivering reply (sender={}, content_len={})",
                    message.sender.as_str(),
                    message.content.len()
                );
                if delivered.send(message).is_err() {
                    debug!("reply receiver dropped; discarding delivery");
                }
            }
        });
        (Self { queue, timing }, output, worker)
    }

    pub fn timing(&self) -> ReplyTiming {
        self.timing
    }

    /// Queue a bot reply using the delay configured for its kind.
    pub fn schedule_reply(&self, kind: ReplyKind, message: ChatMessage) {
        self.schedule(message, self.timing.delay_for(kind));
    }

    /// Queue a message for delivery after `delay`.
    pub fn schedule(&self, message: ChatMessage, delay: Duration) {
        let deadline = Instant::now() + delay;
        if self.queue.send((deadline, message)).is_err() {
            debug!("reply worker stopped; dropping scheduled message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ReplyScheduler, ReplyTiming};
    use crate::session::ReplyKind;
    use crate::types::ChatMessage;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test]
    async fn deliveries_keep_scheduling_order() {
        let (scheduler, mut output, worker) = ReplyScheduler::spawn(ReplyTiming::immediate());
        scheduler.schedule(ChatMessage::bot("slow"), Duration::from_millis(40));
        scheduler.schedule(ChatMessage::bot("fast"), Duration::from_millis(1));
        drop(scheduler);

        let first = output.recv().await.expect("first");
        let second = output.recv().await.expect("second");
        assert_eq!(first.content, "slow");
        assert_eq!(second.content, "fast");
        assert!(output.recv().await.is_none());
        worker.await.expect("worker");
    }

    #[tokio::test]
    async fn replies_wait_for_their_kind_delay() {
        let timing = ReplyTiming {
            prompt: Duration::from_millis(20),
            summary: Duration::from_millis(60),
        };
        let (scheduler, mut output, _worker) = ReplyScheduler::spawn(timing);
        let started = Instant::now();
        scheduler.schedule_reply(ReplyKind::Summary, ChatMessage::bot("summary"));
        let delivered = output.recv().await.expect("delivered");
        assert_eq!(delivered.content, "summary");
        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn timing_follows_chat_config() {
        let timing = ReplyTiming::default();
        assert_eq!(timing.delay_for(ReplyKind::Prompt), Duration::from_millis(1000));
        assert_eq!(timing.delay_for(ReplyKind::Summary), Duration::from_millis(1500));
    }
}
