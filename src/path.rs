//! Executable lookup against the `PATH` environment variable.

use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use log::trace;

use crate::ShellError;

/// The directories listed in `PATH`, in order. Empty if the variable is
/// unset.
pub fn search_dirs() -> Vec<PathBuf> {
	env::var_os("PATH")
		.map(|value| env::split_paths(&value).collect())
		.unwrap_or_default()
}

/// Find `name` as an executable regular file in the first matching search
/// directory.
pub fn resolve(name: &str) -> Result<PathBuf, ShellError> {
	resolve_in(&search_dirs(), name)
}

pub fn resolve_in(dirs: &[PathBuf], name: &str) -> Result<PathBuf, ShellError> {
	for dir in dirs {
		let full = dir.join(name);
		if is_executable(&full) {
			trace!("resolved {name} to {}", full.display());
			return Ok(full);
		}
	}
	Err(ShellError::CommandNotFound(name.to_string()))
}

/// Basenames of every executable regular file reachable under the search
/// directories. Seeds the completion universe at startup; directories that
/// cannot be read are skipped.
pub fn enumerate() -> Vec<String> {
	enumerate_in(&search_dirs())
}

pub fn enumerate_in(dirs: &[PathBuf]) -> Vec<String> {
	let mut names = vec![];
	for dir in dirs {
		walk(dir, &mut names);
	}
	names
}

fn walk(dir: &Path, names: &mut Vec<String>) {
	let Ok(entries) = fs::read_dir(dir) else {
		return
	};
	for entry in entries.flatten() {
		let path = entry.path();
		// file_type() doesn't follow symlinks, so a link cycle can't recurse
		if entry.file_type().is_ok_and(|kind| kind.is_dir()) {
			walk(&path, names);
		} else if is_executable(&path)
			&& let Some(name) = path.file_name() {
				names.push(name.to_string_lossy().into_owned());
		}
	}
}

fn is_executable(path: &Path) -> bool {
	fs::metadata(path)
		.map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
		.unwrap_or(false)
}
