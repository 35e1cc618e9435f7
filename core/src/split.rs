//! Splitting of script text into executable statements.
//!
//! Scripts use a mutable statement terminator: it starts as `;` and is
//! replaced by a `SET TERM <token> ;` directive so procedure bodies can
//! contain semicolons. Splitting is line-based:
//!
//! 1. Carriage returns are dropped and the text is split on `\n`.
//! 2. A line matching the directive (case-insensitive, the literal `;` is
//!    required at its end whatever the current terminator) switches the
//!    terminator for the following lines and discards the pending buffer.
//! 3. Any other line starting with `SET TERM` is skipped without touching
//!    the state. This covers the restoring `SET TERM ; ^` form.
//! 4. Every remaining line is buffered; when its trimmed form ends with the
//!    current terminator the buffer is closed into a statement.
//! 5. Trailing content without a final terminator becomes the last
//!    statement.
//!
//! Terminator detection is a suffix test on the trimmed line, not a SQL
//! tokenizer. A line that ends with the terminator inside a string literal
//! or comment closes the statement early.

use regex::Regex;
use std::sync::LazyLock;

use crate::StatementBatch;

/// Terminator in effect at the start of every script.
pub const DEFAULT_TERMINATOR: &str = ";";

static SET_TERM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)SET\s+TERM\s+(.+)\s+;").expect("static regex must compile")
});
static SET_TERM_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^SET\s+TERM\b").expect("static regex must compile"));

/// How a single trimmed line is treated by the splitter.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line<'a> {
    /// `SET TERM <token> ;` with the new terminator.
    SetTerm(&'a str),
    /// A `SET TERM` line that does not carry a usable terminator.
    IgnoredDirective,
    Body,
}

fn classify(trimmed: &str) -> Line<'_> {
    if let Some(caps) = SET_TERM_RE.captures(trimmed) {
        let token = caps.get(1).map_or("", |m| m.as_str().trim());
        if token.is_empty() {
            return Line::IgnoredDirective;
        }
        return Line::SetTerm(token);
    }
    if SET_TERM_PREFIX_RE.is_match(trimmed) {
        return Line::IgnoredDirective;
    }
    Line::Body
}

/// Splitter state for one script; never outlives a [`split_script`] call.
#[derive(Debug)]
struct SplitState {
    terminator: String,
    buffer: String,
}

impl SplitState {
    fn new() -> Self {
        Self {
            terminator: DEFAULT_TERMINATOR.to_string(),
            buffer: String::new(),
        }
    }

    /// Consumes one line and returns the statement it closes, if any.
    fn feed(&mut self, line: &str) -> Option<String> {
        let trimmed = line.trim();
        match classify(trimmed) {
            Line::SetTerm(token) => {
                self.terminator = token.to_string();
                self.buffer.clear();
                None
            }
            Line::IgnoredDirective => None,
            Line::Body => {
                self.buffer.push_str(line);
                self.buffer.push('\n');
                if trimmed.ends_with(self.terminator.as_str()) {
                    self.close()
                } else {
                    None
                }
            }
        }
    }

    fn close(&mut self) -> Option<String> {
        let buffered = std::mem::take(&mut self.buffer);
        let command = buffered.trim();
        let body = command
            .strip_suffix(self.terminator.as_str())
            .unwrap_or(command)
            .trim();
        if body.is_empty() {
            None
        } else {
            Some(body.to_string())
        }
    }

    /// Returns trailing content that was never terminated.
    fn finish(self) -> Option<String> {
        let rest = self.buffer.trim();
        if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    }
}

/// Splits script text into its executable statements, in source order.
///
/// Returned statements are trimmed and have their terminator removed;
/// blank statements are dropped.
///
/// # Examples
///
/// ```
/// use dbmeta_core::split_script;
///
/// let batch = split_script("SET TERM ^ ;\nCREATE PROCEDURE P AS BEGIN END^\nSET TERM ; ^\n");
/// assert_eq!(batch.into_vec(), vec!["CREATE PROCEDURE P AS BEGIN END".to_string()]);
///
/// let batch = split_script("CREATE DOMAIN D AS INTEGER;\nCREATE TABLE T (ID D);\n");
/// assert_eq!(batch.len(), 2);
/// ```
pub fn split_script(script: &str) -> StatementBatch {
    let normalized = script.replace('\r', "");
    let mut state = SplitState::new();
    let mut batch = StatementBatch::new();

    for line in normalized.split('\n') {
        if let Some(statement) = state.feed(line) {
            batch.push(statement);
        }
    }
    if let Some(rest) = state.finish() {
        batch.push(rest);
    }
    batch
}
