//! Sitzungszustand: zentrale Datenhaltung der Editier-Engine.

mod interaction;
mod session;

pub use interaction::{DisplayFlags, DragState, DragTarget, PointerMode};
pub use session::EditSession;

use serde::{Deserialize, Serialize};

/// Zustand der Editier-Sitzung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Startform wählen
    #[default]
    Primitives,
    /// Bestehendes Objekt zum Bearbeiten an Ort und Stelle binden
    AttachOld,
    /// Bestehendes Objekt duplizieren; Änderungen betreffen nur die Kopie
    CloneOld,
    /// Alle Geometrie-Operationen zulässig
    Editing,
    /// Sitzung beendet, Verlauf freigegeben
    Detach,
}

impl SessionState {
    /// Popup-Index des State-Menüs (0 Primitives, 1 AttachOld, 2 CloneOld, 3 Detach).
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::Primitives),
            1 => Some(Self::AttachOld),
            2 => Some(Self::CloneOld),
            3 => Some(Self::Detach),
            _ => None,
        }
    }

    /// Übergangstabelle der Sitzung.
    ///
    /// Editing wird nur über eine Startform oder ein gebundenes Objekt
    /// betreten und nur über Detach verlassen.
    pub fn can_enter(self, target: SessionState) -> bool {
        use SessionState::*;
        match (self, target) {
            (Editing, Detach) => true,
            (Editing, _) => false,
            (_, Detach) => false,
            (Detach, Editing) => false,
            (_, _) => true,
        }
    }
}

/// Herkunft der Geometrie unter Bearbeitung.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Neue Startform; Detach fügt ein neues Objekt ein
    Seed { label: String },
    /// An Ort und Stelle; Detach ersetzt das Objekt unter seinem Namen
    Attached { name: String },
    /// Kopie; Detach fügt ein neues Objekt ein, das Original bleibt
    Cloned { source: String },
}
