//! Schnittstelle zum Host: Rückrufe und Objektspeicher.
//!
//! Mehr als diese beiden Traits setzt die Engine vom Host nicht voraus.

use super::state::SessionState;
use crate::core::{EditError, EditableGeometry, ParameterSet};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

/// Rückrufe, die der Host bereitstellen muss.
pub trait HostCallbacks {
    /// Parameteranzeige nach jeder Zustandsänderung neu zeichnen.
    fn param_update_widget(&mut self, params: &ParameterSet, state: SessionState);
    /// Status- oder Fehlermeldung anzeigen.
    fn place_message(&mut self, text: &str);
    /// Viewport neu zeichnen.
    fn request_redraw(&mut self);
}

/// Objektdatenbank des Hosts.
pub trait ObjectStore {
    /// Objektnamen in stabiler Reihenfolge (Index = Unterwähler).
    fn names(&self) -> Vec<String>;
    fn get(&self, name: &str) -> Option<&EditableGeometry>;
    /// Ersetzt ein bestehendes Objekt unter seinem Namen.
    fn replace(&mut self, name: &str, geometry: EditableGeometry) -> Result<(), EditError>;
    /// Fügt ein neues Objekt ein und liefert den vergebenen eindeutigen Namen.
    fn insert(&mut self, base_name: &str, geometry: EditableGeometry) -> String;
    /// Übergibt die Geometrie an den externen Serialisierer.
    fn save(&mut self, geometry: &EditableGeometry, path: &Path) -> Result<(), EditError>;
}

/// Rückrufe und Speicher für einen Dispatcher-Aufruf.
pub struct HostBridge<'a> {
    pub callbacks: &'a mut dyn HostCallbacks,
    pub store: &'a mut dyn ObjectStore,
}

impl<'a> HostBridge<'a> {
    pub fn new(callbacks: &'a mut dyn HostCallbacks, store: &'a mut dyn ObjectStore) -> Self {
        Self { callbacks, store }
    }
}

/// In-Memory-Objektspeicher; Einfügereihenfolge bestimmt die Indizes.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SceneObjects {
    objects: IndexMap<String, EditableGeometry>,
}

impl SceneObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Alle Objekte als JSON (für den Replay-Treiber).
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn unique_name(&self, base_name: &str) -> String {
        let base = if base_name.trim().is_empty() {
            "Objekt"
        } else {
            base_name.trim()
        };
        if !self.objects.contains_key(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}.{n}"))
            .find(|candidate| !self.objects.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

impl ObjectStore for SceneObjects {
    fn names(&self) -> Vec<String> {
        self.objects.keys().cloned().collect()
    }

    fn get(&self, name: &str) -> Option<&EditableGeometry> {
        self.objects.get(name)
    }

    fn replace(&mut self, name: &str, geometry: EditableGeometry) -> Result<(), EditError> {
        match self.objects.get_mut(name) {
            Some(slot) => {
                *slot = geometry;
                Ok(())
            }
            None => Err(EditError::transition(format!(
                "Objekt '{name}' existiert nicht mehr"
            ))),
        }
    }

    fn insert(&mut self, base_name: &str, geometry: EditableGeometry) -> String {
        let name = self.unique_name(base_name);
        self.objects.insert(name.clone(), geometry);
        name
    }

    fn save(&mut self, geometry: &EditableGeometry, path: &Path) -> Result<(), EditError> {
        let json = serde_json::to_string_pretty(geometry)
            .map_err(|e| EditError::Persistence(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| EditError::Persistence(format!("{}: {}", path.display(), e)))?;
        log::info!("Geometrie gespeichert nach: {}", path.display());
        Ok(())
    }
}

/// Leitet alle Rückrufe an `log` weiter (headless Betrieb).
#[derive(Debug, Default)]
pub struct LoggingHost;

impl HostCallbacks for LoggingHost {
    fn param_update_widget(&mut self, params: &ParameterSet, state: SessionState) {
        log::debug!(
            "Parameter [{:?}]: Ordnung {}×{}, {:?}, Enden {:?}/{:?}, rational={}",
            state,
            params.u_order,
            params.v_order,
            params.geom_type,
            params.u_end,
            params.v_end,
            params.rational
        );
    }

    fn place_message(&mut self, text: &str) {
        log::info!("Meldung: {}", text);
    }

    fn request_redraw(&mut self) {
        log::trace!("Neuzeichnen angefordert");
    }
}

/// Zeichnet alle Rückrufe auf (Tests und Skript-Auswertung).
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub messages: Vec<String>,
    pub param_updates: Vec<(ParameterSet, SessionState)>,
    pub redraws: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }
}

impl HostCallbacks for RecordingHost {
    fn param_update_widget(&mut self, params: &ParameterSet, state: SessionState) {
        self.param_updates.push((*params, state));
    }

    fn place_message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }
}
