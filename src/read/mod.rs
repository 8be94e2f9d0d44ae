use crate::error::Result;

use std::io::BufRead;

mod amc;
mod asf;
mod utilities;

/// Line lexer shared by the ASF and AMC readers.
///
/// Lines come back trimmed; blank lines and `#` comments never do. A line
/// handed back through [`LineReader::push_back`] is offered again by the next
/// call to [`LineReader::next_line`].
pub struct LineReader<R> {
    inner: R,
    buffer: String,
    pending: Option<String>,
    line: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: String::new(),
            pending: None,
            line: 0,
        }
    }

    pub fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }
        loop {
            self.buffer.clear();
            if self.inner.read_line(&mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let line = self.buffer.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Ok(Some(line.to_owned()));
        }
    }

    /// Offers `line` again on the next read.
    pub fn push_back(&mut self, line: String) {
        self.pending = Some(line);
    }

    /// 1-based number of the last line taken from the stream.
    pub fn line_number(&self) -> usize {
        self.line
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn skips_blank_and_comment_lines() {
        let input = "# header\r\n\r\n   first  \r\n\t# indented comment\n\nsecond\n";
        let mut lines = LineReader::new(input.as_bytes());
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("first"));
        assert_eq!(lines.line_number(), 3);
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("second"));
        assert_eq!(lines.line_number(), 6);
        assert_eq!(lines.next_line().unwrap(), None);
    }

    #[test]
    fn pushed_back_line_is_offered_again() {
        let mut lines = LineReader::new(":units\nmass 1\n".as_bytes());
        let line = lines.next_line().unwrap().unwrap();
        lines.push_back(line);
        assert_eq!(lines.next_line().unwrap().as_deref(), Some(":units"));
        assert_eq!(lines.line_number(), 1);
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("mass 1"));
    }
}
