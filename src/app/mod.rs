//! Application-Layer: Controller, Sitzung, Events, Verlauf und Host-Schnittstelle.

pub mod command_log;
pub mod controller;
pub mod events;
pub mod handlers;
pub mod history;
pub mod host;
mod intent_mapping;
/// Sitzungszustand
///
/// Dieses Modul verwaltet die Editier-Sitzung (Zustand, Geometrie, Zeigermodus).
pub mod state;

pub use command_log::{CommandLog, CommandOutcome, CommandRecord};
pub use controller::EditController;
pub use events::{EditorCommand, EditorIntent, MenuOp, PointerEvent, PointerKind};
pub use history::{HistoryEntry, HistoryStack};
pub use host::{HostBridge, HostCallbacks, LoggingHost, ObjectStore, RecordingHost, SceneObjects};
pub use state::{Binding, EditSession, PointerMode, SessionState};
