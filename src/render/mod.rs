//! Terminal output for streamed responses.
//!
//! Two strategies exist: incremental plain text, and a live region that
//! re-renders the accumulated markdown at a fixed cadence. Which one runs is
//! decided once at startup and carried as an [`OutputMode`].

mod live;
pub mod markdown;
mod plain;
pub mod theme;

use anyhow::Result;
use std::time::Duration;

use crate::llm::ToolArguments;

pub use live::LiveRenderer;
pub use plain::PlainRenderer;
pub use theme::Theme;

/// Receives one turn's streamed content and tool notices.
pub trait ResponseSink {
    /// A content delta arrived; `accumulated` already includes it.
    fn on_delta(&mut self, delta: &str, accumulated: &str) -> Result<()>;

    /// Periodic redraw. Only called when [`Self::refresh_interval`] is set.
    fn refresh(&mut self, accumulated: &str) -> Result<()>;

    /// The turn's stream ended.
    fn finish(&mut self, accumulated: &str) -> Result<()>;

    fn tool_notice(&mut self, name: &str, args: &ToolArguments) -> Result<()>;

    fn refresh_interval(&self) -> Option<Duration> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Plain,
    Live,
}

impl OutputMode {
    /// Formatted output needs an interactive stdout and must not be disabled.
    pub fn detect(markdown_enabled: bool) -> Self {
        Self::select(markdown_enabled, atty::is(atty::Stream::Stdout))
    }

    pub fn select(markdown_enabled: bool, is_tty: bool) -> Self {
        if markdown_enabled && is_tty {
            OutputMode::Live
        } else {
            OutputMode::Plain
        }
    }
}

pub const MAX_REFRESH_PER_SECOND: u32 = 1000;

/// Redraw period for a rate; the rate is clamped to `1..=1000`.
pub fn refresh_period(refresh_per_second: u32) -> Duration {
    let rate = refresh_per_second.clamp(1, MAX_REFRESH_PER_SECOND);
    Duration::from_millis(1000 / u64::from(rate))
}

pub fn make_sink(mode: OutputMode, theme: Theme, refresh_per_second: u32) -> Box<dyn ResponseSink> {
    match mode {
        OutputMode::Plain => Box::new(PlainRenderer::new(std::io::stdout())),
        OutputMode::Live => {
            let every = refresh_period(refresh_per_second);
            Box::new(LiveRenderer::new(std::io::stdout(), theme, every))
        }
    }
}
