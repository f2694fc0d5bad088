use anyhow::Result;
use futures::{Stream, StreamExt};
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::llm::types::{StreamChunk, ToolCall};
use crate::render::ResponseSink;

// interval() rejects a zero period.
const MIN_REFRESH_PERIOD: Duration = Duration::from_millis(1);

/// What one streamed turn produced.
#[derive(Debug, Default)]
pub struct TurnOutput {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

/// Drain one turn's fragments into a [`TurnOutput`], forwarding content
/// deltas to `sink` and refreshing it at the sink's cadence.
///
/// The turn ends at the first `done` fragment (its content is ignored) or when
/// the stream runs out. The sink is finished on every exit path.
pub async fn consume_turn_stream<S>(
    mut stream: S,
    sink: &mut dyn ResponseSink,
) -> Result<TurnOutput>
where
    S: Stream<Item = Result<StreamChunk>> + Unpin,
{
    let mut out = TurnOutput::default();
    let res = drain(&mut stream, sink, &mut out).await;
    let finished = sink.finish(&out.content);
    res?;
    finished?;
    Ok(out)
}

async fn drain<S>(stream: &mut S, sink: &mut dyn ResponseSink, out: &mut TurnOutput) -> Result<()>
where
    S: Stream<Item = Result<StreamChunk>> + Unpin,
{
    let live = sink.refresh_interval();
    let period = live
        .unwrap_or(Duration::from_secs(3600))
        .max(MIN_REFRESH_PERIOD);
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let next = tokio::select! {
            biased;
            _ = ticker.tick(), if live.is_some() => {
                sink.refresh(&out.content)?;
                continue;
            }
            next = stream.next() => next,
        };

        let Some(chunk) = next else {
            debug!("stream ended without done");
            return Ok(());
        };
        let chunk = chunk?;

        if chunk.done {
            debug!("received done");
            return Ok(());
        }
        if let Some(err) = chunk.error {
            warn!(error = %err, "error fragment in chat stream");
            continue;
        }
        let Some(message) = chunk.message else {
            continue;
        };
        if !message.content.is_empty() {
            out.content.push_str(&message.content);
            sink.on_delta(&message.content, &out.content)?;
        }
        if !message.tool_calls.is_empty() {
            debug!(count = message.tool_calls.len(), "tool calls in fragment");
            out.tool_calls.extend(message.tool_calls);
        }
    }
}
