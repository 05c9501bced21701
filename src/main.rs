//! `skiff` is an interactive POSIX-style shell: a raw-mode line editor with
//! trie-backed tab completion and history navigation, feeding a pipeline
//! executor for builtins and external commands.
//!
//! ### High-level structure:
//! 1. Startup seeds the completion universe (builtins plus everything
//!    executable on `PATH`) and loads the history file, if configured
//! 2. The REPL reads one line at a time through the raw-mode editor
//! 3. Each accepted line is split into pipeline segments, tokenized, and
//!    executed; the line is appended to the history
//! 4. Shutdown appends the session history to the history file
use std::env;
use std::io;
use std::path::PathBuf;

use itertools::Itertools;
use log::error;
use thiserror::Error;

use editor::{LineEditor, LineRead, RawModeGuard};
use exec::Shell;
use reader::TtyReader;
use trie::Trie;

pub mod builtin;
pub mod editor;
pub mod exec;
pub mod history;
pub mod keys;
pub mod lex;
pub mod path;
pub mod reader;
pub mod trie;
#[cfg(test)]
pub mod tests;

pub const PROMPT: &str = "$ ";

/// The user-facing failure modes. Interrupt and end-of-input are not errors;
/// they are [`LineRead`] outcomes.
#[derive(Debug,Error)]
pub enum ShellError {
	#[error("unterminated quote in input")]
	UnterminatedQuote,
	#[error("{0}: not found")]
	CommandNotFound(String),
	#[error("cd: {0}: No such file or directory")]
	NoSuchDirectory(String),
	#[error("cd: could not determine home directory")]
	NoHomeDirectory,
	#[error("terminal setup failed: {0}")]
	Terminal(#[from] nix::Error),
	#[error(transparent)]
	Io(#[from] io::Error),
}

fn main() {
	init_logger();

	let mut shell = Shell::new();
	if let Some(file) = histfile() {
		shell.history.load(&file).ok();
	}

	let mut editor = LineEditor::new(PROMPT, completion_universe());

	let code = repl(&mut shell, &mut editor);

	// The whole session's history is appended on the way out; failures here
	// are not worth reporting
	if let Some(file) = histfile() {
		shell.history.append_all(&file).ok();
	}

	std::process::exit(code);
}

fn repl(shell: &mut Shell, editor: &mut LineEditor) -> i32 {
	let mut stdout = io::stdout();
	loop {
		let outcome = {
			// Raw mode is held only while the editor reads; the guard
			// restores the terminal on every path out of this block
			let _raw = match RawModeGuard::acquire() {
				Ok(guard) => guard,
				Err(e) => {
					error!("cannot enter raw mode: {e}");
					eprintln!("skiff: {e}");
					return 0;
				}
			};
			let mut keys = TtyReader::new();
			editor.read_line(&mut keys, shell.history.entries(), &mut stdout)
		};

		match outcome {
			Ok(LineRead::Line(line)) => {
				if line.is_empty() {
					continue;
				}
				if let Err(e) = exec::run_line(shell, &line) {
					eprintln!("{e}");
				}
				// The line joins the history only after the pipeline has been
				// waited on, so `history` never lists the line that ran it
				shell.history.append(line);
				if let Some(code) = shell.exit {
					return code;
				}
			}
			Ok(LineRead::Interrupt) => continue,
			Ok(LineRead::Eof) => return 0,
			Err(e) => {
				eprintln!("skiff: {e}");
				return 0;
			}
		}
	}
}

fn histfile() -> Option<PathBuf> {
	env::var_os("HISTFILE").map(PathBuf::from)
}

/// Build the completion universe: registered builtin names plus the basename
/// of every executable on the search path, deduplicated and inserted in
/// sorted order.
fn completion_universe() -> Trie {
	let mut trie = Trie::new();
	let names = builtin::BUILTINS.iter()
		.map(|builtin| builtin.name.to_string())
		.chain(path::enumerate());
	for name in names.sorted().dedup() {
		trie.insert(&name);
	}
	trie
}

/// Initialize the logger
///
/// Filtering comes from the standard `RUST_LOG` environment variable; by
/// default nothing is emitted.
fn init_logger() {
	let mut builder = env_logger::builder();

	builder.format(|buf, record| {
		use std::io::Write;
		let color = match record.level() {
			log::Level::Error => "\x1b[1;31m",
			log::Level::Warn => "\x1b[33m",
			log::Level::Info => "\x1b[32m",
			log::Level::Debug => "\x1b[34m",
			log::Level::Trace => "\x1b[36m"
		};
		writeln!(buf, "[{color}{}\x1b[0m] {}", record.level(), record.args())
	});

	builder.init();
}
