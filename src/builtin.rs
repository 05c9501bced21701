//! The builtin commands and their registry.
//!
//! Each builtin is a plain function taking the shell state and an output
//! writer; error values bubble up to the caller, which renders them to the
//! stage's error writer. The registry is a static table so `type` and the
//! completion seeding can enumerate it.

use std::env;
use std::io::Write;
use std::path::PathBuf;

use log::trace;

use crate::ShellError;
use crate::exec::Shell;
use crate::path;

pub struct Builtin {
	pub name: &'static str,
	pub description: &'static str,
	pub run: fn(&mut Shell, &mut dyn Write) -> Result<(), ShellError>,
}

pub const BUILTINS: &[Builtin] = &[
	Builtin { name: "cd", description: "cd is a shell builtin", run: cmd_cd },
	Builtin { name: "echo", description: "echo is a shell builtin", run: cmd_echo },
	Builtin { name: "exit", description: "exit is a shell builtin", run: cmd_exit },
	Builtin { name: "history", description: "history is a shell builtin", run: cmd_history },
	Builtin { name: "pwd", description: "pwd is a shell builtin", run: cmd_pwd },
	Builtin { name: "type", description: "type is a shell builtin", run: cmd_type },
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
	BUILTINS.iter().find(|builtin| builtin.name == name)
}

fn cmd_echo(shell: &mut Shell, w: &mut dyn Write) -> Result<(), ShellError> {
	writeln!(w, "{}", shell.args.join(" "))?;
	Ok(())
}

fn cmd_pwd(_shell: &mut Shell, w: &mut dyn Write) -> Result<(), ShellError> {
	let dir = env::current_dir()?;
	writeln!(w, "{}", dir.display())?;
	Ok(())
}

fn cmd_cd(shell: &mut Shell, _w: &mut dyn Write) -> Result<(), ShellError> {
	let Some(target) = shell.args.first() else {
		return Ok(())
	};
	let target = if target == "~" {
		env::var("HOME").map_err(|_| ShellError::NoHomeDirectory)?
	} else {
		target.clone()
	};
	trace!("cd {target}");
	env::set_current_dir(&target).map_err(|_| ShellError::NoSuchDirectory(target))
}

fn cmd_type(shell: &mut Shell, w: &mut dyn Write) -> Result<(), ShellError> {
	let Some(target) = shell.args.first() else {
		return Ok(())
	};
	if let Some(builtin) = lookup(target) {
		writeln!(w, "{}", builtin.description)?;
		return Ok(());
	}
	let full = path::resolve(target)?;
	writeln!(w, "{target} is {}", full.display())?;
	Ok(())
}

fn cmd_exit(shell: &mut Shell, _w: &mut dyn Write) -> Result<(), ShellError> {
	let code = shell.args.first()
		.and_then(|arg| arg.parse().ok())
		.unwrap_or(0);
	shell.exit = Some(code);
	Ok(())
}

/// `history` renders the log; `history N` renders the last N entries.
/// `-r`/`-w`/`-a` load, rewrite, or append-since-last-append the history
/// file (the argument after the flag, defaulting to `$HISTFILE`). File
/// errors are swallowed.
fn cmd_history(shell: &mut Shell, w: &mut dyn Write) -> Result<(), ShellError> {
	match shell.args.first().map(|arg| arg.as_str()) {
		Some("-r") => {
			if let Some(file) = history_file(&shell.args) {
				shell.history.load(&file).ok();
			}
		}
		Some("-w") => {
			if let Some(file) = history_file(&shell.args) {
				shell.history.write(&file).ok();
			}
		}
		Some("-a") => {
			if let Some(file) = history_file(&shell.args) {
				shell.history.append_to_file(&file).ok();
			}
		}
		Some(arg) => {
			let last = arg.parse().ok();
			shell.history.render(w, last)?;
		}
		None => shell.history.render(w, None)?,
	}
	Ok(())
}

fn history_file(args: &[String]) -> Option<PathBuf> {
	args.get(1)
		.map(PathBuf::from)
		.or_else(|| env::var_os("HISTFILE").map(PathBuf::from))
}
