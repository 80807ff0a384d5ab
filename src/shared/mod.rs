//! Geteilte, layer-neutrale Bausteine.
//!
//! Enthält die Spline-Basisbibliothek (von `core` genutzt) und die
//! Engine-Optionen (von `app` und dem Binary genutzt).

pub mod options;
pub mod spline_basis;

pub use options::EngineOptions;
