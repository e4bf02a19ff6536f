//! Key chord parsing for vellum.
//!
//! Chords are written the way extension authors bind them (`"Mod-b"`,
//! `"Shift-Enter"`, `"Ctrl-Alt-F1"`) and normalized into a [`Chord`] whose
//! `Display` form is canonical, so two spellings of the same chord collide
//! in a keymap.

pub use chord::{Chord, KEY_SEP, Key, Modifiers, NamedKey, Platform};
pub use parser::{ParseError, normalize, parse};

mod chord;
pub mod parser;
