use std::fs;

use crate::ShellError;
use crate::exec::{self, Shell, extract_redirections};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn args(list: &[&str]) -> Vec<String> {
	list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn extract_consumes_operator_and_path() {
	let dir = tempdir().unwrap();
	let target = dir.path().join("out").display().to_string();

	let mut argv = args(&["foo", ">", &target, "bar"]);
	let redirs = extract_redirections(&mut argv);
	assert_eq!(argv, ["foo", "bar"]);
	assert!(redirs.stdout.is_some());
	assert!(redirs.stderr.is_none());
}

#[test]
fn extract_recognizes_every_operator_spelling() {
	let dir = tempdir().unwrap();
	for op in [">", "1>", ">>", "1>>"] {
		let target = dir.path().join("out").display().to_string();
		let mut argv = args(&[op, &target]);
		let redirs = extract_redirections(&mut argv);
		assert!(argv.is_empty());
		assert!(redirs.stdout.is_some(), "stdout not wired for {op}");
	}
	for op in ["2>", "2>>"] {
		let target = dir.path().join("err").display().to_string();
		let mut argv = args(&[op, &target]);
		let redirs = extract_redirections(&mut argv);
		assert!(argv.is_empty());
		assert!(redirs.stderr.is_some(), "stderr not wired for {op}");
	}
}

#[test]
fn extract_leaves_a_trailing_operator_in_place() {
	let mut argv = args(&["hi", ">"]);
	let redirs = extract_redirections(&mut argv);
	assert_eq!(argv, ["hi", ">"]);
	assert!(redirs.stdout.is_none());
}

#[test]
fn extract_open_failure_still_consumes_tokens() {
	let mut argv = args(&["hi", ">", "/no-such-dir-anywhere/out", "there"]);
	let redirs = extract_redirections(&mut argv);
	assert_eq!(argv, ["hi", "there"]);
	assert!(redirs.stdout.is_none());
}

#[test]
fn redirect_truncates_the_target() {
	let dir = tempdir().unwrap();
	let out = dir.path().join("x");
	let mut shell = Shell::new();

	exec::run_line(&mut shell, &format!("echo foo > {}", out.display())).unwrap();
	assert_eq!(fs::read_to_string(&out).unwrap(), "foo\n");

	exec::run_line(&mut shell, &format!("echo shorter > {}", out.display())).unwrap();
	assert_eq!(fs::read_to_string(&out).unwrap(), "shorter\n");
}

#[test]
fn redirect_append_accumulates() {
	let dir = tempdir().unwrap();
	let out = dir.path().join("x");
	let mut shell = Shell::new();

	exec::run_line(&mut shell, &format!("echo one >> {}", out.display())).unwrap();
	exec::run_line(&mut shell, &format!("echo two >> {}", out.display())).unwrap();
	assert_eq!(fs::read_to_string(&out).unwrap(), "one\ntwo\n");
}

#[test]
fn later_redirection_supersedes_earlier() {
	let dir = tempdir().unwrap();
	let first = dir.path().join("first");
	let second = dir.path().join("second");
	let mut shell = Shell::new();

	let line = format!("echo hi > {} > {}", first.display(), second.display());
	exec::run_line(&mut shell, &line).unwrap();

	assert_eq!(fs::read_to_string(&second).unwrap(), "hi\n");
	// The superseded target was still opened (and truncated), just unused
	assert_eq!(fs::read_to_string(&first).unwrap(), "");
}

#[test]
fn resolution_failure_lands_in_the_stderr_redirect() {
	let dir = tempdir().unwrap();
	let err = dir.path().join("err");
	let mut shell = Shell::new();

	let line = format!("definitely-missing-zzz 2> {}", err.display());
	exec::run_line(&mut shell, &line).unwrap();
	assert_eq!(fs::read_to_string(&err).unwrap(), "definitely-missing-zzz: not found\n");
}

#[test]
fn pipeline_counts_lines() {
	let dir = tempdir().unwrap();
	let out = dir.path().join("count");
	let mut shell = Shell::new();

	let line = format!("echo a | cat | wc -l > {}", out.display());
	exec::run_line(&mut shell, &line).unwrap();
	assert_eq!(fs::read_to_string(&out).unwrap().trim_end(), "1");
}

#[test]
fn builtin_feeds_an_external_stage() {
	let dir = tempdir().unwrap();
	let out = dir.path().join("copy");
	let mut shell = Shell::new();

	let line = format!("echo hello world | cat > {}", out.display());
	exec::run_line(&mut shell, &line).unwrap();
	assert_eq!(fs::read_to_string(&out).unwrap(), "hello world\n");
}

#[test]
fn quoting_survives_the_pipeline_split() {
	let dir = tempdir().unwrap();
	let out = dir.path().join("quoted");
	let mut shell = Shell::new();

	let line = format!("echo 'a | b' | cat > {}", out.display());
	exec::run_line(&mut shell, &line).unwrap();
	assert_eq!(fs::read_to_string(&out).unwrap(), "a | b\n");
}

#[test]
fn parse_error_discards_the_line() {
	let mut shell = Shell::new();
	let result = exec::run_line(&mut shell, "echo 'unfinished");
	assert!(matches!(result, Err(ShellError::UnterminatedQuote)));
}

#[test]
fn empty_line_is_a_no_op() {
	let mut shell = Shell::new();
	exec::run_line(&mut shell, "").unwrap();
	exec::run_line(&mut shell, "   ").unwrap();
}

#[test]
fn empty_pipeline_segment_is_tolerated() {
	let mut shell = Shell::new();
	exec::run_line(&mut shell, "echo a | ").unwrap();
}

#[test]
fn exit_builtin_requests_shutdown() {
	let mut shell = Shell::new();
	exec::run_line(&mut shell, "exit 3").unwrap();
	assert_eq!(shell.exit, Some(3));
}

#[test]
fn history_builtin_respects_stdout_redirect() {
	let dir = tempdir().unwrap();
	let out = dir.path().join("log");
	let mut shell = Shell::new();
	shell.history.append("a");
	shell.history.append("b");

	exec::run_line(&mut shell, &format!("history > {}", out.display())).unwrap();
	assert_eq!(fs::read_to_string(&out).unwrap(), "1  a\n2  b\n");
}

#[test]
fn cd_then_pwd_tracks_the_working_directory() {
	let dir = tempdir().unwrap();
	let out = dir.path().join("cwd");
	let mut shell = Shell::new();

	exec::run_line(&mut shell, &format!("cd {}", dir.path().display())).unwrap();
	exec::run_line(&mut shell, &format!("pwd > {}", out.display())).unwrap();

	let reported = fs::read_to_string(&out).unwrap();
	let expected = fs::canonicalize(dir.path()).unwrap();
	assert_eq!(reported.trim_end(), expected.display().to_string());
}
