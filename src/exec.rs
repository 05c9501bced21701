//! This module contains the `Shell` struct, the central container for state,
//! and the execution engine that turns a parsed pipeline into builtin
//! invocations and child processes wired together with OS pipes.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::OwnedFd;
use std::process::{Child, Command, Stdio};

use log::trace;
use nix::unistd;

use crate::ShellError;
use crate::builtin::{self, Builtin};
use crate::history::History;
use crate::lex::{split_pipeline, tokenize};
use crate::path;

/// Long-lived shell state: the argument list of the builtin currently being
/// invoked, the command history, and the exit request set by `exit`.
pub struct Shell {
	pub args: Vec<String>,
	pub history: History,
	pub exit: Option<i32>,
}

impl Shell {
	pub fn new() -> Self {
		Self {
			args: vec![],
			history: History::new(),
			exit: None,
		}
	}
}

impl Default for Shell {
	fn default() -> Self {
		Self::new()
	}
}

#[derive(Clone,Copy,PartialEq,Eq,Debug)]
enum RedirMode {
	Truncate,
	Append,
}

/// Per-stage stream rewiring. Files are opened during extraction, before the
/// stage runs, and closed by drop during pipeline teardown.
#[derive(Default,Debug)]
pub struct Redirs {
	pub stdout: Option<File>,
	pub stderr: Option<File>,
}

/// Scan an argument list for redirection operators, removing each operator
/// and its path operand. Later redirections to the same stream supersede
/// earlier ones (the superseded file closes on overwrite). A failed open
/// still consumes both tokens but leaves the default stream in place, and an
/// operator with nothing after it performs no redirection at all.
pub fn extract_redirections(args: &mut Vec<String>) -> Redirs {
	let mut redirs = Redirs::default();
	let mut i = 0;
	while i < args.len() {
		let target = match args[i].as_str() {
			">" | "1>" => Some((false, RedirMode::Truncate)),
			">>" | "1>>" => Some((false, RedirMode::Append)),
			"2>" => Some((true, RedirMode::Truncate)),
			"2>>" => Some((true, RedirMode::Append)),
			_ => None,
		};
		let Some((is_stderr, mode)) = target else {
			i += 1;
			continue
		};
		if i + 1 >= args.len() {
			i += 1;
			continue;
		}
		let file_path = args.remove(i + 1);
		args.remove(i);
		if let Ok(file) = open_target(&file_path, mode) {
			if is_stderr {
				redirs.stderr = Some(file);
			} else {
				redirs.stdout = Some(file);
			}
		}
	}
	redirs
}

fn open_target(file_path: &str, mode: RedirMode) -> io::Result<File> {
	match mode {
		RedirMode::Truncate => File::create(file_path),
		RedirMode::Append => OpenOptions::new().create(true).append(true).open(file_path),
	}
}

/// Execute one raw input line: split it into pipeline segments, tokenize
/// them all up front (a parse error discards the whole line), then run the
/// pipeline.
pub fn run_line(shell: &mut Shell, line: &str) -> Result<(), ShellError> {
	let segments = split_pipeline(line);
	if segments.is_empty() {
		return Ok(())
	}

	let mut stages = vec![];
	for segment in &segments {
		let mut tokens = tokenize(segment)?;
		if tokens.is_empty() {
			stages.push(None);
			continue;
		}
		let name = tokens.remove(0);
		let mut args = tokens;
		let redirs = extract_redirections(&mut args);
		stages.push(Some(Stage { name, args, redirs }));
	}

	run_pipeline(shell, stages);
	Ok(())
}

/// One tokenized pipeline segment with its redirections already opened.
pub struct Stage {
	pub name: String,
	pub args: Vec<String>,
	pub redirs: Redirs,
}

/// One inter-stage pipe. Each endpoint is taken exactly once: into a child's
/// stdio, into a builtin's writer, or dropped by teardown.
struct PipePair {
	read: Option<OwnedFd>,
	write: Option<OwnedFd>,
}

fn run_pipeline(shell: &mut Shell, stages: Vec<Option<Stage>>) {
	let count = stages.len();

	// pipes[i] connects stage i to stage i+1
	let mut pipes: Vec<PipePair> = Vec::with_capacity(count.saturating_sub(1));
	for _ in 1..count {
		match unistd::pipe() {
			Ok((read, write)) => pipes.push(PipePair { read: Some(read), write: Some(write) }),
			// No pipe, no pipeline; the whole line becomes a no-op
			Err(_) => return,
		}
	}

	let mut children: Vec<Child> = vec![];
	for (i, stage) in stages.into_iter().enumerate() {
		let Some(Stage { name, args, redirs }) = stage else {
			// An empty segment occupies its slot with no child
			continue
		};

		if let Some(builtin) = builtin::lookup(&name) {
			run_builtin(shell, builtin, args, redirs, i, count, &mut pipes);
			continue;
		}

		if let Err(e) = path::resolve(&name) {
			// Report, but still attempt the spawn so the OS-level failure
			// surfaces the same way
			report(&redirs.stderr, &e);
		}

		let mut cmd = Command::new(&name);
		cmd.args(&args);
		if i > 0 && let Some(read) = pipes[i - 1].read.take() {
			cmd.stdin(Stdio::from(read));
		}
		if let Some(file) = redirs.stdout {
			cmd.stdout(Stdio::from(file));
		} else if i + 1 < count && let Some(write) = pipes[i].write.take() {
			cmd.stdout(Stdio::from(write));
		}
		if let Some(file) = redirs.stderr {
			cmd.stderr(Stdio::from(file));
		}

		match cmd.spawn() {
			Ok(child) => {
				trace!("spawned {name} (pid {})", child.id());
				children.push(child);
			}
			// Spawn failures are suppressed; resolution already reported
			Err(_) => {}
		}
	}

	// Drop every write end the parent still holds, so each child sees EOF on
	// its stdin once the upstream stage finishes
	for pipe in &mut pipes {
		pipe.write.take();
	}

	// Wait in submission order; wait failures are suppressed
	for mut child in children {
		child.wait().ok();
	}

	// Remaining read ends drop here
}

/// Invoke a builtin in pipeline position `i`. Its output writer is the
/// stdout redirection if present, else the connecting pipe, else the
/// terminal; the writer is dropped (closed) as soon as the handler returns.
fn run_builtin(
	shell: &mut Shell,
	builtin: &'static Builtin,
	args: Vec<String>,
	redirs: Redirs,
	i: usize,
	count: usize,
	pipes: &mut [PipePair],
) {
	shell.args = args;
	trace!("invoking builtin {}", builtin.name);

	let Redirs { stdout, stderr } = redirs;
	let mut out: Box<dyn Write> = if let Some(file) = stdout {
		Box::new(file)
	} else if i + 1 < count && let Some(write) = pipes[i].write.take() {
		Box::new(File::from(write))
	} else {
		Box::new(io::stdout())
	};

	let mut err: Box<dyn Write> = match stderr {
		Some(file) => Box::new(file),
		None => Box::new(io::stderr()),
	};

	if let Err(e) = (builtin.run)(shell, &mut out) {
		writeln!(err, "{e}").ok();
	}
	// `out` and `err` drop here, closing any redirection file or pipe end
}

fn report(stderr: &Option<File>, err: &ShellError) {
	match stderr {
		Some(file) => {
			let mut file = file;
			writeln!(file, "{err}").ok();
		}
		None => {
			eprintln!("{err}");
		}
	}
}
