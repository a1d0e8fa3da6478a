// Keyhid Log Tokenizer
// Lazy token stream over a key log, optionally following a growing file

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Bracket tokens that carry no key and are dropped
pub const IGNORED_TOKENS: &[&str] = &[
    "SHIFT_PRESS",
    "SHIFT_RELEASE",
    "CTRL_PRESS",
    "CTRL_RELEASE",
    "ALT_PRESS",
    "ALT_RELEASE",
    "ALTGR_PRESS",
    "ALTGR_RELEASE",
    "NUMLOCK_ON",
    "NUMLOCK_OFF",
    "NUMLOCK_RELEASE",
];

/// Default wait between reads when a followed file has no new data
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One unit of a key log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `[NAME]`, stored without the brackets
    Control(String),
    /// Any other character
    Char(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Control(name) => write!(f, "[{}]", name),
            Token::Char(c) => write!(f, "{}", c),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenizeError {
    #[error("Cannot open log {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Log read error: {0}")]
    Io(#[from] io::Error),

    /// A `[` with no closing `]` before the end of a finite log
    #[error("Unterminated token '[{partial}' at byte {offset}")]
    Unterminated { partial: String, offset: u64 },
}

/// How end of data is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// End of data ends the token stream
    Finite,
    /// End of data means "not yet": wait and read again until stopped
    Follow,
}

/// Where [`LogTokenizer::open`] starts reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAt {
    Beginning,
    /// Only data appended after opening
    End,
    /// A byte offset, typically a previous [`LogTokenizer::boundary_offset`]
    Offset(u64),
}

/// Splits a character stream into [`Token`]s.
///
/// A `[` extends to the next `]` with no nesting or escaping; every other
/// character is a token of its own. Input is decoded as UTF-8 and invalid
/// bytes become U+FFFD.
pub struct LogTokenizer<R: Read> {
    reader: R,
    mode: ReadMode,
    poll_interval: Duration,
    stop: Option<Arc<AtomicBool>>,
    pushed_back: Option<u8>,
    offset: u64,
    boundary: u64,
    finished: bool,
}

impl LogTokenizer<BufReader<File>> {
    /// Open a log file at a fresh byte offset
    pub fn open(
        path: impl AsRef<Path>,
        start: StartAt,
        mode: ReadMode,
    ) -> Result<Self, TokenizeError> {
        let path = path.as_ref();
        let open_err = |source| TokenizeError::Open {
            path: path.display().to_string(),
            source,
        };
        let mut file = File::open(path).map_err(open_err)?;
        let offset = match start {
            StartAt::Beginning => 0,
            StartAt::End => file.seek(SeekFrom::End(0))?,
            StartAt::Offset(n) => file.seek(SeekFrom::Start(n))?,
        };
        log::debug!("Reading {} from byte {} ({:?})", path.display(), offset, mode);

        let mut tokenizer = Self::new(BufReader::new(file), mode);
        tokenizer.offset = offset;
        tokenizer.boundary = offset;
        Ok(tokenizer)
    }
}

impl<R: Read> LogTokenizer<R> {
    pub fn new(reader: R, mode: ReadMode) -> Self {
        Self {
            reader,
            mode,
            poll_interval: DEFAULT_POLL_INTERVAL,
            stop: None,
            pushed_back: None,
            offset: 0,
            boundary: 0,
            finished: false,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Flag that ends a followed stream once raised
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn mode(&self) -> ReadMode {
        self.mode
    }

    /// Byte offset just past the last complete token; reopen here to resume
    pub fn boundary_offset(&self) -> u64 {
        self.boundary
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(b) = self.pushed_back.take() {
            self.offset += 1;
            return Ok(Some(b));
        }
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(buf[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Next byte, waiting for more data in follow mode
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            if let Some(b) = self.read_byte()? {
                return Ok(Some(b));
            }
            if self.mode == ReadMode::Finite || self.stop_requested() {
                return Ok(None);
            }
            thread::sleep(self.poll_interval);
        }
    }

    fn push_back(&mut self, b: u8) {
        self.offset -= 1;
        self.pushed_back = Some(b);
    }

    fn next_char(&mut self) -> io::Result<Option<char>> {
        let Some(first) = self.next_byte()? else {
            return Ok(None);
        };
        let width = utf8_width(first);
        if width == 1 {
            return Ok(Some(first as char));
        }
        if width == 0 {
            return Ok(Some(char::REPLACEMENT_CHARACTER));
        }

        let mut buf = [first, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            match self.next_byte()? {
                Some(b) if b & 0xC0 == 0x80 => *slot = b,
                Some(b) => {
                    self.push_back(b);
                    return Ok(Some(char::REPLACEMENT_CHARACTER));
                }
                None => return Ok(Some(char::REPLACEMENT_CHARACTER)),
            }
        }
        Ok(Some(
            std::str::from_utf8(&buf[..width])
                .ok()
                .and_then(|s| s.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER),
        ))
    }

    fn next_token(&mut self) -> Result<Option<Token>, TokenizeError> {
        loop {
            let Some(c) = self.next_char()? else {
                return Ok(None);
            };
            if c != '[' {
                self.boundary = self.offset;
                return Ok(Some(Token::Char(c)));
            }

            let mut name = String::new();
            loop {
                match self.next_char()? {
                    Some(']') => break,
                    Some(ch) => name.push(ch),
                    None if self.mode == ReadMode::Finite => {
                        return Err(TokenizeError::Unterminated {
                            partial: name,
                            offset: self.boundary,
                        });
                    }
                    // Stopped while waiting for the rest of the token
                    None => return Ok(None),
                }
            }
            self.boundary = self.offset;

            if IGNORED_TOKENS.contains(&name.as_str()) {
                log::trace!("ignoring [{}]", name);
                continue;
            }
            return Ok(Some(Token::Control(name)));
        }
    }
}

impl<R: Read> Iterator for LogTokenizer<R> {
    type Item = Result<Token, TokenizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Length of a UTF-8 sequence from its lead byte; 0 for invalid leads
const fn utf8_width(b: u8) -> usize {
    match b {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &[u8]) -> Vec<Result<Token, String>> {
        LogTokenizer::new(input, ReadMode::Finite)
            .map(|r| r.map_err(|e| e.to_string()))
            .collect()
    }

    fn ok_tokens(input: &str) -> Vec<Token> {
        LogTokenizer::new(input.as_bytes(), ReadMode::Finite)
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_ignore_set_is_filtered() {
        assert_eq!(
            ok_tokens("ab[ENTER]c[SHIFT_PRESS]d"),
            vec![
                Token::Char('a'),
                Token::Char('b'),
                Token::Control("ENTER".into()),
                Token::Char('c'),
                Token::Char('d'),
            ]
        );
    }

    #[test]
    fn test_every_ignored_token_is_dropped() {
        let input: String = IGNORED_TOKENS.iter().map(|t| format!("[{}]", t)).collect();
        assert!(ok_tokens(&input).is_empty());
    }

    #[test]
    fn test_brackets_around_single_characters() {
        assert_eq!(
            ok_tokens("[[][<]"),
            vec![Token::Control("[".into()), Token::Control("<".into())]
        );
    }

    #[test]
    fn test_utf8_and_invalid_bytes() {
        let toks = tokens("é€".as_bytes());
        assert_eq!(toks, vec![Ok(Token::Char('é')), Ok(Token::Char('€'))]);

        let toks = tokens(&[b'a', 0xFF, 0xC3, b'b']);
        assert_eq!(
            toks,
            vec![
                Ok(Token::Char('a')),
                Ok(Token::Char('\u{FFFD}')),
                Ok(Token::Char('\u{FFFD}')),
                Ok(Token::Char('b')),
            ]
        );
    }

    #[test]
    fn test_unterminated_reported_once() {
        let toks = tokens(b"ab[ENT");
        assert_eq!(toks.len(), 3);
        assert_eq!(toks[1], Ok(Token::Char('b')));
        let err = toks[2].as_ref().unwrap_err();
        assert!(err.contains("[ENT"));
        assert!(err.contains("byte 2"));
    }

    #[test]
    fn test_boundary_offset() {
        let mut t = LogTokenizer::new("é[TAB]x".as_bytes(), ReadMode::Finite);
        assert_eq!(t.next().unwrap().unwrap(), Token::Char('é'));
        assert_eq!(t.boundary_offset(), 2);
        assert_eq!(t.next().unwrap().unwrap(), Token::Control("TAB".into()));
        assert_eq!(t.boundary_offset(), 7);
    }

    #[test]
    fn test_follow_mode_stops_on_flag() {
        let stop = Arc::new(AtomicBool::new(true));
        let mut t = LogTokenizer::new("a".as_bytes(), ReadMode::Follow)
            .with_poll_interval(Duration::from_millis(1))
            .with_stop_flag(stop);
        assert_eq!(t.next().unwrap().unwrap(), Token::Char('a'));
        assert!(t.next().is_none());
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::Control("F1".into()).to_string(), "[F1]");
        assert_eq!(Token::Char('x').to_string(), "x");
    }
}
