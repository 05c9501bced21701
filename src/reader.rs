use std::collections::VecDeque;
use std::io::Read;

use crate::keys::{KeyCode, KeyEvent, ModKeys};

pub trait KeyReader {
	fn read_key(&mut self) -> Option<KeyEvent>;
}

#[derive(Default,Debug)]
pub struct RawReader {
	pub bytes: VecDeque<u8>
}

impl RawReader {
	pub fn new() -> Self {
		Self::default()
	}
	pub fn with_initial(mut self, bytes: &[u8]) -> Self {
		let bytes = bytes.iter();
		self.bytes.extend(bytes);
		self
	}

	pub fn feed(&mut self, bytes: &[u8]) {
		let bytes = bytes.iter();
		self.bytes.extend(bytes);
	}

	pub fn parse_esc_seq_from_bytes(&mut self) -> Option<KeyEvent> {
		let b1 = self.bytes.pop_front()?;

		match b1 {
			b'[' => {
				let b2 = self.bytes.pop_front()?;

				match b2 {
					b'A' => Some(KeyEvent(KeyCode::Up, ModKeys::empty())),
					b'B' => Some(KeyEvent(KeyCode::Down, ModKeys::empty())),
					b'C' => Some(KeyEvent(KeyCode::Right, ModKeys::empty())),
					b'D' => Some(KeyEvent(KeyCode::Left, ModKeys::empty())),
					b'1'..=b'9' => {
						let mut digits = vec![b2];

						// Consume parameter bytes through the final byte, so an
						// unrecognized sequence never leaks into the input stream.
						while let Some(&b) = self.bytes.front() {
							self.bytes.pop_front();

							if b.is_ascii_digit() {
								digits.push(b);
							} else if b != b';' {
								break;
							}
						}

						let key = match digits.as_slice() {
							[b'1'] => KeyCode::Home,
							[b'3'] => KeyCode::Delete,
							[b'4'] => KeyCode::End,
							[b'5'] => KeyCode::PageUp,
							[b'6'] => KeyCode::PageDown,
							[b'7'] => KeyCode::Home, // xterm alternate
							[b'8'] => KeyCode::End,  // xterm alternate
							_ => KeyCode::Esc,
						};

						Some(KeyEvent(key, ModKeys::empty()))
					}
					_ => Some(KeyEvent(KeyCode::Esc, ModKeys::empty())),
				}
			}

			b'O' => {
				// SS3 sequences (F1-F4 on most terminals); nothing the editor acts on
				self.bytes.pop_front()?;
				Some(KeyEvent(KeyCode::Esc, ModKeys::empty()))
			}

			_ => Some(KeyEvent(KeyCode::Esc, ModKeys::empty())),
		}
	}
}

impl KeyReader for RawReader {
	fn read_key(&mut self) -> Option<KeyEvent> {
		use core::str;

		let mut collected = Vec::with_capacity(4);

		loop {
			let byte = self.bytes.pop_front()?;
			collected.push(byte);

			// If it's an escape sequence, delegate
			if collected[0] == 0x1b && collected.len() == 1 {
				if let Some(&_next @ (b'[' | b'O')) = self.bytes.front() {
					return self.parse_esc_seq_from_bytes()
				}
			}

			// Try parse as valid UTF-8
			if let Ok(s) = str::from_utf8(&collected) {
				return Some(KeyEvent::new(s, ModKeys::empty()));
			}

			if collected.len() >= 4 {
				break;
			}
		}

		None
	}
}

/// Feeds a `RawReader` from stdin, one blocking read at a time.
///
/// In raw mode a read returns as soon as at least one byte is available, so
/// an escape sequence typically arrives as a single chunk and the queue-based
/// parsing above sees it whole.
#[derive(Default,Debug)]
pub struct TtyReader {
	inner: RawReader,
}

impl TtyReader {
	pub fn new() -> Self {
		Self::default()
	}
}

impl KeyReader for TtyReader {
	fn read_key(&mut self) -> Option<KeyEvent> {
		loop {
			if let Some(key) = self.inner.read_key() {
				return Some(key)
			}

			let mut chunk = [0u8; 64];
			let n = std::io::stdin().read(&mut chunk).ok()?;
			if n == 0 {
				// End of the input stream
				return None;
			}
			self.inner.feed(&chunk[..n]);
		}
	}
}
