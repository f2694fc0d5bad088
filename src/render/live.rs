use anyhow::Result;
use crossterm::{
    cursor::MoveToPreviousLine,
    queue,
    style::{Print, PrintStyledContent},
    terminal::{self, Clear, ClearType},
};
use std::io::Write;
use std::time::Duration;

use crate::llm::ToolArguments;
use crate::render::markdown::{StyledLine, render_markdown};
use crate::render::{ResponseSink, Theme};

const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Redraws the accumulated response as markdown in place.
///
/// While streaming only the tail that fits on screen is drawn, so the region
/// can always be erased by moving the cursor back up. The final draw prints
/// every line and leaves it in the scrollback.
pub struct LiveRenderer<W: Write> {
    out: W,
    theme: Theme,
    every: Duration,
    drawn_rows: u16,
    dirty: bool,
    size: Option<(u16, u16)>,
}

impl<W: Write> LiveRenderer<W> {
    pub fn new(out: W, theme: Theme, every: Duration) -> Self {
        Self {
            out,
            theme,
            every,
            drawn_rows: 0,
            dirty: false,
            size: None,
        }
    }

    #[cfg(test)]
    fn with_size(mut self, cols: u16, rows: u16) -> Self {
        self.size = Some((cols, rows));
        self
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn terminal_size(&self) -> (u16, u16) {
        self.size
            .unwrap_or_else(|| terminal::size().unwrap_or(FALLBACK_SIZE))
    }

    fn erase(&mut self) -> Result<()> {
        if self.drawn_rows > 0 {
            queue!(self.out, MoveToPreviousLine(self.drawn_rows))?;
        }
        queue!(self.out, Clear(ClearType::FromCursorDown))?;
        self.drawn_rows = 0;
        Ok(())
    }

    fn draw(&mut self, accumulated: &str, crop: bool) -> Result<()> {
        let (cols, rows) = self.terminal_size();
        let width = usize::from(cols.saturating_sub(1)).max(1);
        let mut lines = render_markdown(accumulated, width, &self.theme);
        if crop {
            let max_rows = usize::from(rows.saturating_sub(1)).max(1);
            if lines.len() > max_rows {
                lines.drain(..lines.len() - max_rows);
            }
        }

        self.erase()?;
        self.print_lines(&lines)?;
        self.drawn_rows = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        self.out.flush()?;
        self.dirty = false;
        Ok(())
    }

    fn print_lines(&mut self, lines: &[StyledLine]) -> Result<()> {
        for line in lines {
            for span in &line.spans {
                queue!(
                    self.out,
                    PrintStyledContent(span.style.apply(span.content.as_str()))
                )?;
            }
            queue!(self.out, Print("\r\n"))?;
        }
        Ok(())
    }
}

impl<W: Write> ResponseSink for LiveRenderer<W> {
    fn on_delta(&mut self, _delta: &str, _accumulated: &str) -> Result<()> {
        self.dirty = true;
        Ok(())
    }

    fn refresh(&mut self, accumulated: &str) -> Result<()> {
        if self.dirty {
            self.draw(accumulated, true)?;
        }
        Ok(())
    }

    fn finish(&mut self, accumulated: &str) -> Result<()> {
        if accumulated.is_empty() && self.drawn_rows == 0 {
            self.dirty = false;
            return Ok(());
        }
        self.draw(accumulated, false)?;
        // Committed to scrollback; the next turn starts a fresh region.
        self.drawn_rows = 0;
        Ok(())
    }

    fn tool_notice(&mut self, name: &str, args: &ToolArguments) -> Result<()> {
        let text = format!("Running tool: {name} args={args}");
        queue!(
            self.out,
            PrintStyledContent(self.theme.tool_notice_style.apply(text)),
            Print("\r\n")
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn refresh_interval(&self) -> Option<Duration> {
        Some(self.every)
    }
}
