use std::io::{self, BufRead, Write};

/// Titles typed at a prompt are cut to this many characters.
pub const TITLE_LIMIT: usize = 30;
/// Each line of note text is cut to this many characters.
pub const LINE_LIMIT: usize = 100;
/// A line holding only this ends multiline text entry.
pub const END_OF_TEXT: &str = ".";
pub const PROMPT: &str = ">>> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
    Invalid,
}

/// Line-oriented terminal I/O over any reader and writer.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Next line without its line ending, or `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    pub fn prompt(&mut self) -> io::Result<Option<String>> {
        write!(self.output, "{}", PROMPT)?;
        self.output.flush()?;
        self.read_line()
    }

    /// Asks a yes/no question. End of input counts as no.
    pub fn confirm(&mut self, question: &str) -> io::Result<Confirmation> {
        writeln!(self.output, "{}", question)?;
        let answer = match self.prompt()? {
            Some(answer) => answer,
            None => return Ok(Confirmation::No),
        };
        Ok(match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => Confirmation::Yes,
            "n" | "no" => Confirmation::No,
            _ => Confirmation::Invalid,
        })
    }

    /// A single-line title, cut to [`TITLE_LIMIT`] characters.
    pub fn read_title(&mut self) -> io::Result<String> {
        let line = self.prompt()?.unwrap_or_default();
        Ok(line.trim().chars().take(TITLE_LIMIT).collect())
    }

    /// Multiline text up to a lone `.` line or end of input.
    pub fn read_text(&mut self) -> io::Result<String> {
        let mut lines = Vec::new();
        while let Some(line) = self.prompt()? {
            if line.trim() == END_OF_TEXT {
                break;
            }
            lines.push(line.chars().take(LINE_LIMIT).collect::<String>());
        }
        Ok(lines.join("\n"))
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        write!(self.output, "\x1B[2J\x1B[1;1H")?;
        self.output.flush()
    }
}
