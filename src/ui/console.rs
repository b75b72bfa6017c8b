use std::fmt::Display;
use std::io::{stdin, stdout, BufRead, Stdout, Write};

use anyhow::{bail, Result};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};

/// Blocking line-oriented console. One prompt at a time; reads never time
/// out. Screen clearing goes through crossterm so redraws start from a
/// clean viewport.
pub struct Console {
    out: Stdout,
}

impl Console {
    pub fn new() -> Self {
        Self { out: stdout() }
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        Ok(())
    }

    pub fn write(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    /// Print the prompt and block for one line of input. A closed input
    /// stream is an error rather than an infinite re-prompt loop.
    pub fn read(&mut self, prompt: &str) -> Result<String> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;

        let mut line = String::new();
        let read = stdin().lock().read_line(&mut line)?;
        if read == 0 {
            bail!("input stream closed");
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    /// Wait for the user to acknowledge before redrawing.
    pub fn pause(&mut self) -> Result<()> {
        self.read("Press ENTER to continue ")?;
        Ok(())
    }
}
