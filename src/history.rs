//! The in-memory command history and its file persistence.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use log::trace;

/// An append-only log of accepted lines.
///
/// `append_cursor` marks how much of the log has already been flushed by
/// `append_to_file`, so repeated `history -a` calls never duplicate entries.
#[derive(Default,Debug)]
pub struct History {
	entries: Vec<String>,
	append_cursor: usize,
}

impl History {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn append(&mut self, line: impl Into<String>) {
		self.entries.push(line.into());
	}

	pub fn entries(&self) -> &[String] {
		&self.entries
	}

	/// Read a history file, appending each non-empty line.
	pub fn load(&mut self, path: &Path) -> io::Result<()> {
		let contents = fs::read_to_string(path)?;
		for line in contents.lines() {
			if !line.is_empty() {
				self.entries.push(line.to_string());
			}
		}
		trace!("loaded history from {}", path.display());
		Ok(())
	}

	/// Truncate the file and write every entry.
	pub fn write(&self, path: &Path) -> io::Result<()> {
		let mut file = File::create(path)?;
		for entry in &self.entries {
			writeln!(file, "{entry}")?;
		}
		Ok(())
	}

	/// Append the entries not yet flushed, then advance the cursor.
	pub fn append_to_file(&mut self, path: &Path) -> io::Result<()> {
		let mut file = OpenOptions::new()
			.create(true)
			.append(true)
			.open(path)?;

		for entry in &self.entries[self.append_cursor..] {
			writeln!(file, "{entry}")?;
		}
		self.append_cursor = self.entries.len();
		Ok(())
	}

	/// Append every entry, regardless of the cursor. This is the shutdown
	/// flush.
	pub fn append_all(&self, path: &Path) -> io::Result<()> {
		let mut file = OpenOptions::new()
			.create(true)
			.append(true)
			.open(path)?;

		for entry in &self.entries {
			writeln!(file, "{entry}")?;
		}
		Ok(())
	}

	/// Emit the last `last` entries (all of them if `None`), each prefixed
	/// with its 1-based position in the full history.
	pub fn render(&self, w: &mut dyn Write, last: Option<usize>) -> io::Result<()> {
		let start = match last {
			Some(n) => self.entries.len().saturating_sub(n),
			None => 0,
		};
		for (i, entry) in self.entries.iter().enumerate().skip(start) {
			writeln!(w, "{}  {entry}", i + 1)?;
		}
		Ok(())
	}
}
