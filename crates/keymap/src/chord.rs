use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator between modifiers and the key in a chord string.
pub const KEY_SEP: char = '-';

bitflags::bitflags! {
	/// Modifier keys held in a chord.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
	pub struct Modifiers: u8 {
		const ALT = 1 << 0;
		const CTRL = 1 << 1;
		const META = 1 << 2;
		const SHIFT = 1 << 3;
	}
}

/// Target platform, which decides what the `Mod` modifier stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
	/// `Mod` is Meta (Command).
	Mac,
	/// `Mod` is Ctrl.
	#[default]
	Other,
}

impl Platform {
	/// The platform the binary was compiled for.
	pub fn current() -> Self {
		if cfg!(target_os = "macos") { Self::Mac } else { Self::Other }
	}

	/// The modifier `Mod` resolves to.
	pub fn primary(self) -> Modifiers {
		match self {
			Self::Mac => Modifiers::META,
			Self::Other => Modifiers::CTRL,
		}
	}
}

/// Named, non-character keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamedKey {
	Backspace,
	Delete,
	Enter,
	Tab,
	Escape,
	Space,
	ArrowUp,
	ArrowDown,
	ArrowLeft,
	ArrowRight,
	Home,
	End,
	PageUp,
	PageDown,
	Insert,
}

impl NamedKey {
	/// Canonical spelling.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Backspace => "Backspace",
			Self::Delete => "Delete",
			Self::Enter => "Enter",
			Self::Tab => "Tab",
			Self::Escape => "Escape",
			Self::Space => "Space",
			Self::ArrowUp => "ArrowUp",
			Self::ArrowDown => "ArrowDown",
			Self::ArrowLeft => "ArrowLeft",
			Self::ArrowRight => "ArrowRight",
			Self::Home => "Home",
			Self::End => "End",
			Self::PageUp => "PageUp",
			Self::PageDown => "PageDown",
			Self::Insert => "Insert",
		}
	}
}

impl FromStr for NamedKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s.to_ascii_lowercase().as_str() {
			"backspace" => Self::Backspace,
			"delete" | "del" => Self::Delete,
			"enter" | "return" => Self::Enter,
			"tab" => Self::Tab,
			"escape" | "esc" => Self::Escape,
			"space" => Self::Space,
			"arrowup" | "up" => Self::ArrowUp,
			"arrowdown" | "down" => Self::ArrowDown,
			"arrowleft" | "left" => Self::ArrowLeft,
			"arrowright" | "right" => Self::ArrowRight,
			"home" => Self::Home,
			"end" => Self::End,
			"pageup" => Self::PageUp,
			"pagedown" => Self::PageDown,
			"insert" => Self::Insert,
			_ => return Err(()),
		})
	}
}

/// The non-modifier part of a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
	/// A character key, letters stored lowercase.
	Char(char),
	/// A named key.
	Named(NamedKey),
	/// A function key `F1`..`F24`.
	F(u8),
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Char(ch) => write!(f, "{ch}"),
			Self::Named(named) => f.write_str(named.as_str()),
			Self::F(n) => write!(f, "F{n}"),
		}
	}
}

/// A modifier set plus a key, e.g. `Ctrl-b`.
///
/// Chords compare and hash by their canonical form, so `Shift-Mod-z` and
/// `Ctrl-Shift-z` are the same chord on non-Mac platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Chord {
	pub modifiers: Modifiers,
	pub key: Key,
}

impl Chord {
	pub fn new(modifiers: Modifiers, key: Key) -> Self {
		Self { modifiers, key }
	}

	/// A chord without modifiers.
	pub fn plain(key: Key) -> Self {
		Self::new(Modifiers::empty(), key)
	}
}

impl fmt::Display for Chord {
	/// Writes the canonical form: modifiers in `Alt`, `Ctrl`, `Meta`, `Shift`
	/// order, then the key.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (flag, name) in [
			(Modifiers::ALT, "Alt"),
			(Modifiers::CTRL, "Ctrl"),
			(Modifiers::META, "Meta"),
			(Modifiers::SHIFT, "Shift"),
		] {
			if self.modifiers.contains(flag) {
				write!(f, "{name}{KEY_SEP}")?;
			}
		}
		write!(f, "{}", self.key)
	}
}
