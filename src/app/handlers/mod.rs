//! Feature-Handler für EditorCommand-Verarbeitung.
//!
//! Jeder Handler gruppiert die Command-Ausführung eines Feature-Bereichs.
//! Der Controller dispatcht an die passende Handler-Funktion.

pub mod history;
pub mod params;
pub mod pointer;
pub mod refine;
pub mod session;
pub mod trim;
