use crate::editor::{LineEditor, LineRead};
use crate::reader::RawReader;
use crate::trie::Trie;

pub mod exec;
pub mod trie;

/// Drive one `read_line` call from a canned byte script, the way the
/// terminal would feed it. Returns the read outcome and everything the
/// editor wrote to the screen.
pub fn read_script(universe: &[&str], history: &[&str], bytes: &[u8]) -> (LineRead, String) {
	let mut completions = Trie::new();
	for word in universe {
		completions.insert(word);
	}
	let history: Vec<String> = history.iter().map(|s| s.to_string()).collect();

	let mut editor = LineEditor::new(crate::PROMPT, completions);
	let mut keys = RawReader::new().with_initial(bytes);
	let mut out = Vec::new();

	let outcome = editor.read_line(&mut keys, &history, &mut out).unwrap();
	(outcome, String::from_utf8(out).unwrap())
}
