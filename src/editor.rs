//! The raw-mode line editor.
//!
//! One `read_line` call renders the prompt, consumes key events until the
//! line is submitted or abandoned, and leaves the finished line in its return
//! value. The editor owns the completion trie and borrows the history
//! read-only while navigating it.

use std::io::Write;

use itertools::Itertools;
use log::trace;
use nix::sys::termios::{self, SetArg, Termios};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::ShellError;
use crate::keys::{KeyCode as K, KeyEvent as E, ModKeys as M};
use crate::reader::KeyReader;
use crate::trie::{Trie, longest_common_prefix};

/// How one `read_line` call ended.
#[derive(Clone,PartialEq,Eq,Debug)]
pub enum LineRead {
	/// The user submitted a line with Enter.
	Line(String),
	/// Ctrl-C; the caller discards the buffer and prompts again.
	Interrupt,
	/// Ctrl-D on an empty buffer, or the input stream ended.
	Eof,
}

/// Scoped raw-mode acquisition for the controlling terminal.
///
/// The saved termios state is restored on drop, which covers the normal
/// return, the interrupt path, the end-of-input path, and unwinding.
pub struct RawModeGuard {
	saved: Termios,
}

impl RawModeGuard {
	pub fn acquire() -> Result<Self, ShellError> {
		let stdin = std::io::stdin();
		let saved = termios::tcgetattr(&stdin)?;
		let mut raw = saved.clone();
		termios::cfmakeraw(&mut raw);
		termios::tcsetattr(&stdin, SetArg::TCSAFLUSH, &raw)?;
		Ok(Self { saved })
	}
}

impl Drop for RawModeGuard {
	fn drop(&mut self) {
		let stdin = std::io::stdin();
		termios::tcsetattr(&stdin, SetArg::TCSAFLUSH, &self.saved).ok();
	}
}

pub struct LineEditor {
	prompt: String,
	buf: String,
	/// Index into the history while navigating; `history.len()` means "the
	/// fresh line being typed".
	hist_pos: usize,
	/// Display width of the buffer as last drawn, for shrink-aware redraws.
	drawn_width: usize,
	/// Tab presses on the current prefix, and the buffer contents at the
	/// previous press.
	tab_presses: u8,
	tab_buf: String,
	completions: Trie,
}

impl LineEditor {
	pub fn new(prompt: impl Into<String>, completions: Trie) -> Self {
		Self {
			prompt: prompt.into(),
			buf: String::new(),
			hist_pos: 0,
			drawn_width: 0,
			tab_presses: 0,
			tab_buf: String::new(),
			completions,
		}
	}

	/// Read one line. The caller is responsible for holding a
	/// [`RawModeGuard`] when `keys` is backed by a real terminal.
	pub fn read_line(
		&mut self,
		keys: &mut impl KeyReader,
		history: &[String],
		out: &mut impl Write,
	) -> Result<LineRead, ShellError> {
		self.buf.clear();
		self.hist_pos = history.len();
		self.drawn_width = 0;
		self.reset_tab_state();

		write!(out, "{}", self.prompt)?;
		out.flush()?;

		while let Some(key) = keys.read_key() {
			match key {
				E(K::Enter, _) => {
					write!(out, "\r\n")?;
					out.flush()?;
					self.reset_tab_state();
					let line = std::mem::take(&mut self.buf);
					trace!("accepted line: {line:?}");
					return Ok(LineRead::Line(line));
				}
				E(K::Tab, _) => self.complete(out)?,
				E(K::Backspace, _) => {
					if self.buf.pop().is_some() {
						write!(out, "\x08 \x08")?;
						out.flush()?;
						self.drawn_width = self.buf.width();
					}
				}
				E(K::Char('C'), mods) if mods.contains(M::CTRL) => {
					write!(out, "^C\r\n")?;
					out.flush()?;
					self.reset_tab_state();
					self.buf.clear();
					return Ok(LineRead::Interrupt);
				}
				E(K::Char('D'), mods) if mods.contains(M::CTRL) => {
					if self.buf.is_empty() {
						write!(out, "\r\n")?;
						out.flush()?;
						return Ok(LineRead::Eof);
					}
					// Ignored on a non-empty buffer
				}
				E(K::Up, _) => self.history_prev(history, out)?,
				E(K::Down, _) => self.history_next(history, out)?,
				E(K::Char(c), mods) if !mods.contains(M::CTRL) && !c.is_control() => {
					self.buf.push(c);
					write!(out, "{c}")?;
					out.flush()?;
					self.drawn_width += c.width().unwrap_or(0);
				}
				E(K::Grapheme(g), _) => {
					self.buf.push_str(&g);
					write!(out, "{g}")?;
					out.flush()?;
					self.drawn_width += g.width();
				}
				// Everything else (stray escape sequences, unbound control
				// keys) is consumed silently
				_ => {}
			}
		}

		// The byte source ran dry without a submitted line
		write!(out, "\r\n")?;
		out.flush()?;
		Ok(LineRead::Eof)
	}

	fn history_prev(&mut self, history: &[String], out: &mut impl Write) -> Result<(), ShellError> {
		if history.is_empty() {
			return Ok(())
		}
		if self.hist_pos > 0 {
			self.hist_pos -= 1;
		}
		self.buf = history[self.hist_pos].clone();
		self.redraw(out)
	}

	fn history_next(&mut self, history: &[String], out: &mut impl Write) -> Result<(), ShellError> {
		if self.hist_pos < history.len() {
			self.hist_pos += 1;
		}
		self.buf = if self.hist_pos == history.len() {
			String::new()
		} else {
			history[self.hist_pos].clone()
		};
		self.redraw(out)
	}

	/// Redraw the prompt line in place. If the buffer got shorter, the
	/// leftover cells are blanked with spaces and the line is drawn once
	/// more so the cursor lands at the right column.
	fn redraw(&mut self, out: &mut impl Write) -> Result<(), ShellError> {
		let width = self.buf.width();
		write!(out, "\r{}{}", self.prompt, self.buf)?;
		if width < self.drawn_width {
			let pad = " ".repeat(self.drawn_width - width);
			write!(out, "{pad}\r{}{}", self.prompt, self.buf)?;
		}
		out.flush()?;
		self.drawn_width = width;
		Ok(())
	}

	fn reset_tab_state(&mut self) {
		self.tab_presses = 0;
		self.tab_buf.clear();
	}

	fn complete(&mut self, out: &mut impl Write) -> Result<(), ShellError> {
		// A press on a different prefix starts the count over
		if self.buf != self.tab_buf {
			self.tab_presses = 0;
		}

		let matches = self.completions.complete(&self.buf);
		if matches.is_empty() {
			write!(out, "\x07")?;
			out.flush()?;
			self.reset_tab_state();
			return Ok(());
		}

		let lcp = longest_common_prefix(&matches);
		if lcp.len() > self.buf.len() {
			// Unambiguous extension; take it. A unique match is a finished
			// word, so it gets its separating space in the same press.
			let mut extension = lcp[self.buf.len()..].to_string();
			if matches.len() == 1 {
				extension.push(' ');
			}
			self.buf.push_str(&extension);
			write!(out, "{extension}")?;
			out.flush()?;
			self.drawn_width += extension.width();
			self.reset_tab_state();
		} else if matches.len() == 1 && matches[0] == self.buf {
			// Exactly one candidate and we're sitting on it
			self.buf.push(' ');
			write!(out, " ")?;
			out.flush()?;
			self.drawn_width += 1;
			self.reset_tab_state();
		} else {
			// Buffer already equals the common prefix with several ways
			// forward: ring the bell first, list the candidates on the
			// second press.
			self.tab_presses += 1;
			self.tab_buf = self.buf.clone();
			if self.tab_presses < 2 {
				write!(out, "\x07")?;
			} else {
				let listing = matches.iter().join("  ");
				write!(out, "\r\n{listing}\r\n{}{}", self.prompt, self.buf)?;
				self.drawn_width = self.buf.width();
				self.tab_presses = 0;
			}
			out.flush()?;
		}
		Ok(())
	}
}
