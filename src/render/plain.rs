use anyhow::Result;
use std::io::Write;

use crate::llm::ToolArguments;
use crate::render::ResponseSink;

/// Writes deltas as they arrive. Used when stdout is not a terminal.
pub struct PlainRenderer<W: Write> {
    out: W,
}

impl<W: Write> PlainRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResponseSink for PlainRenderer<W> {
    fn on_delta(&mut self, delta: &str, _accumulated: &str) -> Result<()> {
        write!(self.out, "{delta}")?;
        self.out.flush()?;
        Ok(())
    }

    fn refresh(&mut self, _accumulated: &str) -> Result<()> {
        Ok(())
    }

    fn finish(&mut self, _accumulated: &str) -> Result<()> {
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    fn tool_notice(&mut self, name: &str, args: &ToolArguments) -> Result<()> {
        writeln!(self.out, "Running tool: {name} args={args}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_deltas_then_newline() {
        let mut r = PlainRenderer::new(Vec::new());
        r.on_delta("Hel", "Hel").unwrap();
        r.on_delta("lo", "Hello").unwrap();
        r.refresh("Hello").unwrap();
        r.finish("Hello").unwrap();
        r.tool_notice("get_current_date", &ToolArguments::default())
            .unwrap();
        let out = String::from_utf8(r.into_inner()).unwrap();
        assert_eq!(out, "Hello\nRunning tool: get_current_date args={}\n");
    }
}
