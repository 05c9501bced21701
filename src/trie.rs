//! The prefix tree backing tab completion.
//!
//! Built once at startup from the builtin names and every executable found on
//! the search path, then queried read-only by the line editor.

use std::collections::BTreeMap;

#[derive(Default,Debug)]
struct TrieNode {
	children: BTreeMap<char, TrieNode>,
	terminal: bool,
}

#[derive(Default,Debug)]
pub struct Trie {
	root: TrieNode,
}

impl Trie {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a word. Inserting the same word twice is a no-op.
	pub fn insert(&mut self, word: &str) {
		let mut node = &mut self.root;
		for ch in word.chars() {
			node = node.children.entry(ch).or_default();
		}
		node.terminal = true;
	}

	/// Every inserted word that starts with `prefix`, in lexicographic order.
	pub fn complete(&self, prefix: &str) -> Vec<String> {
		let mut node = &self.root;
		for ch in prefix.chars() {
			match node.children.get(&ch) {
				Some(child) => node = child,
				None => return vec![],
			}
		}
		let mut results = vec![];
		let mut path = prefix.to_string();
		collect(node, &mut path, &mut results);
		results
	}

	/// True iff this exact word was inserted.
	pub fn is_word(&self, word: &str) -> bool {
		let mut node = &self.root;
		for ch in word.chars() {
			match node.children.get(&ch) {
				Some(child) => node = child,
				None => return false,
			}
		}
		node.terminal
	}
}

fn collect(node: &TrieNode, path: &mut String, results: &mut Vec<String>) {
	if node.terminal {
		results.push(path.clone());
	}
	for (ch, child) in &node.children {
		path.push(*ch);
		collect(child, path, results);
		path.pop();
	}
}

/// The longest string that is a leading substring of every input, by
/// codepoint comparison. Empty input yields the empty string.
pub fn longest_common_prefix(words: &[String]) -> String {
	let Some(first) = words.first() else {
		return String::new()
	};

	let mut end = first.len();
	for word in &words[1..] {
		let common = first[..end]
			.char_indices()
			.zip(word.chars())
			.take_while(|((_, a), b)| a == b)
			.last()
			.map(|((i, a), _)| i + a.len_utf8())
			.unwrap_or(0);
		end = end.min(common);
	}
	first[..end].to_string()
}
