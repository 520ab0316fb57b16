//! Blocking user interaction: notifications, prompts, and confirmations.
//!
//! Cart and admin operations never talk to the terminal directly. They go
//! through [`Interaction`], which the binary implements with [`Terminal`] and
//! tests implement with scripted answers.

use std::io::{self, BufRead, Write};

/// Blocking dialogs shown to the user.
pub trait Interaction {
    /// Show a message and wait until it has been delivered.
    fn notify(&mut self, message: &str);

    /// Ask a question and return the answer.
    ///
    /// Returns `None` if the user dismissed the prompt.
    fn prompt(&mut self, question: &str) -> Option<String>;

    /// Ask a yes/no question. Anything other than an explicit yes is a no.
    fn confirm(&mut self, question: &str) -> bool;
}

/// Line-oriented terminal over any reader/writer pair.
#[derive(Debug)]
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl Terminal<io::StdinLock<'static>, io::Stdout> {
    /// Terminal bound to the process's stdin/stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read one line with the trailing newline removed.
    ///
    /// Returns `Ok(None)` at end of input. Bytes that are not valid UTF-8
    /// are replaced with U+FFFD rather than failing the read.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the input fails.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        let mut line = match String::from_utf8(buf) {
            Ok(line) => line,
            Err(e) => {
                tracing::debug!(error = %e, "Replacing invalid UTF-8 in input");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    /// Writer for rendered views.
    pub const fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Consume the terminal and return the writer.
    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question} ")?;
        self.output.flush()?;
        self.read_line()
    }
}

impl<R: BufRead, W: Write> Interaction for Terminal<R, W> {
    fn notify(&mut self, message: &str) {
        if let Err(e) = writeln!(self.output, "{message}").and_then(|()| self.output.flush()) {
            tracing::debug!(error = %e, "Failed to write notification");
        }
    }

    fn prompt(&mut self, question: &str) -> Option<String> {
        match self.ask(question) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read prompt answer");
                None
            }
        }
    }

    fn confirm(&mut self, question: &str) -> bool {
        self.prompt(&format!("{question} [y/N]"))
            .is_some_and(|answer| matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn terminal(input: &str) -> Terminal<Cursor<Vec<u8>>, Vec<u8>> {
        Terminal::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_read_line_strips_newlines() {
        let mut term = terminal("add p-1\r\ncart\n");
        assert_eq!(term.read_line().unwrap().as_deref(), Some("add p-1"));
        assert_eq!(term.read_line().unwrap().as_deref(), Some("cart"));
        assert_eq!(term.read_line().unwrap(), None);
    }

    #[test]
    fn test_read_line_replaces_invalid_utf8() {
        let mut term = Terminal::new(Cursor::new(b"caf\xe9\nhelp\n".to_vec()), Vec::new());
        assert_eq!(term.read_line().unwrap().as_deref(), Some("caf\u{FFFD}"));
        assert_eq!(term.read_line().unwrap().as_deref(), Some("help"));
        assert_eq!(term.read_line().unwrap(), None);
    }

    #[test]
    fn test_prompt_writes_question_and_reads_answer() {
        let mut term = terminal("buyer@example.com\n");
        let answer = term.prompt("Email:");
        assert_eq!(answer.as_deref(), Some("buyer@example.com"));
        assert_eq!(String::from_utf8(term.into_output()).unwrap(), "Email: ");
    }

    #[test]
    fn test_prompt_at_eof_is_dismissed() {
        let mut term = terminal("");
        assert_eq!(term.prompt("Email:"), None);
    }

    #[test]
    fn test_confirm() {
        assert!(terminal("y\n").confirm("Delete?"));
        assert!(terminal(" YES \n").confirm("Delete?"));
        assert!(!terminal("n\n").confirm("Delete?"));
        assert!(!terminal("\n").confirm("Delete?"));
        assert!(!terminal("").confirm("Delete?"));
    }

    #[test]
    fn test_notify_writes_line() {
        let mut term = terminal("");
        term.notify("Cart is empty!");
        assert_eq!(
            String::from_utf8(term.into_output()).unwrap(),
            "Cart is empty!\n"
        );
    }
}
