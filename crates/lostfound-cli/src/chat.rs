//! Interactive intake chat over stdin/stdout.

use anyhow::Context;
use log::{info, warn};
use lostfound_core::{
    ChatMessage, CompletedReport, IntakeFlow, IntakeSession, ReplyScheduler, ReplyTiming,
    ReportSink, short_id,
};
use lostfound_store::CollectionStore;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Logs every finished report.
struct LogReportSink;

impl ReportSink for LogReportSink {
    fn report_completed(&self, report: &CompletedReport) {
        info!(
            "intake completed (kind={}, id={}, reference={})",
            report.kind(),
            report.id(),
            short_id(report.id())
        );
    }
}

/// Render one transcript line.
fn format_message(message: &ChatMessage) -> String {
    format!(
        "[{}] {}: {}",
        message.timestamp,
        message.sender.as_str(),
        message.content
    )
}

/// Run one intake conversation until stdin closes.
///
/// Bot replies are shown through the reply scheduler; on end of input every
/// reply still queued is delivered before returning.
pub async fn run(
    flow: IntakeFlow,
    store: Arc<CollectionStore>,
    timing: ReplyTiming,
) -> anyhow::Result<()> {
    let mut session = IntakeSession::new(flow, store, Arc::new(LogReportSink));
    for message in session.transcript() {
        println!("{}", format_message(message));
    }

    let (scheduler, mut replies, worker) = ReplyScheduler::spawn(timing);
    let mut scheduler = Some(scheduler);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line(), if scheduler.is_some() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    info!("stdin closed; flushing pending replies");
                    scheduler = None;
                    continue;
                };
                match session.handle_message(&line) {
                    Ok(Some(reply)) => {
                        if let Some(scheduler) = scheduler.as_ref() {
                            scheduler.schedule_reply(reply.kind, reply.message);
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        warn!("intake message failed (err={})", err);
                        eprintln!("could not save the report: {err}");
                    }
                }
            }
            delivered = replies.recv() => {
                let Some(message) = delivered else {
                    break;
                };
                println!("{}", format_message(&message));
            }
        }
    }
    worker.await.context("reply worker failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::format_message;
    use lostfound_core::{ChatMessage, Sender};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    #[test]
    fn messages_render_with_time_and_sender() {
        let message = ChatMessage {
            id: Uuid::nil(),
            content: "مرحبا".to_string(),
            sender: Sender::Bot,
            timestamp: "09:30".to_string(),
        };
        assert_eq!(format_message(&message), "[09:30] bot: مرحبا");
    }
}
