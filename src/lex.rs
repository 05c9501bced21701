//! Tokenization of raw command lines.
//!
//! Two passes share the same quoting state machine: `split_pipeline` cuts the
//! line at unquoted `|` bytes, and `tokenize` turns one segment into argument
//! tokens with POSIX-style quote and escape handling.

use crate::ShellError;

/// Split a line into argument tokens.
///
/// Single quotes are fully literal. Double quotes allow `\` to escape
/// `"`, `\`, `$` and a backtick; before any other character the backslash is
/// kept as-is. Outside quotes a backslash takes the next character verbatim,
/// and unquoted whitespace separates tokens. Adjacent quoted and unquoted
/// runs join into one token.
pub fn tokenize(input: &str) -> Result<Vec<String>, ShellError> {
	let mut tokens = vec![];
	let mut current = String::new();
	let mut in_single = false;
	let mut in_double = false;
	let mut chars = input.chars().peekable();

	while let Some(c) = chars.next() {
		match c {
			'\\' if !in_single && !in_double => {
				// Verbatim escape. A trailing backslash escapes nothing and
				// is dropped.
				if let Some(next) = chars.next() {
					current.push(next);
				}
			}
			'\\' if in_double => {
				match chars.peek() {
					Some(&next @ ('"' | '\\' | '$' | '`')) => {
						chars.next();
						current.push(next);
					}
					Some(_) => {
						// Not an escapable character; the backslash stays
						current.push('\\');
						if let Some(next) = chars.next() {
							current.push(next);
						}
					}
					None => {}
				}
			}
			'\'' if !in_double => in_single = !in_single,
			'"' if !in_single => in_double = !in_double,
			c if c.is_whitespace() && !in_single && !in_double => {
				if !current.is_empty() {
					tokens.push(std::mem::take(&mut current));
				}
			}
			c => current.push(c),
		}
	}

	if in_single || in_double {
		return Err(ShellError::UnterminatedQuote);
	}

	if !current.is_empty() {
		tokens.push(current);
	}
	Ok(tokens)
}

/// Split a line at every `|` that sits outside quotes and is not escaped.
///
/// Segments keep their surrounding whitespace; `tokenize` deals with it.
/// An empty line yields no segments.
pub fn split_pipeline(input: &str) -> Vec<&str> {
	let mut segments = vec![];
	let mut in_single = false;
	let mut in_double = false;
	let mut escaped = false;
	let mut start = 0;

	for (i, c) in input.char_indices() {
		if escaped {
			escaped = false;
			continue;
		}
		match c {
			'\\' if !in_single => escaped = true,
			'\'' if !in_double => in_single = !in_single,
			'"' if !in_single => in_double = !in_double,
			'|' if !in_single && !in_double => {
				segments.push(&input[start..i]);
				start = i + 1;
			}
			_ => {}
		}
	}

	if start < input.len() || !segments.is_empty() {
		segments.push(&input[start..]);
	}
	segments
}
