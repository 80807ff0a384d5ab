use super::{Binding, DisplayFlags, DragState, PointerMode, SessionState};
use crate::app::history::{HistoryEntry, HistoryStack};
use crate::app::CommandLog;
use crate::core::{
    prep_kvs, Axis, EditError, EditableGeometry, EndCondition, MultiResLevels, ParameterSet,
    PickResult, PickView,
};
use crate::shared::EngineOptions;
use std::path::PathBuf;

/// Explizit vom Host gehaltene Editier-Sitzung (keine globalen Zustände).
pub struct EditSession {
    /// Aktueller Sitzungszustand
    pub state: SessionState,
    /// Parametersatz; in Editing ein Spiegel der Geometrie
    pub params: ParameterSet,
    /// Geometrie unter Bearbeitung (nur in Editing vorhanden)
    pub geometry: Option<EditableGeometry>,
    /// Beim Betreten von Editing gesicherte Geometrie (Clear, DrawOrig)
    pub original: Option<EditableGeometry>,
    /// Herkunft der Geometrie
    pub binding: Option<Binding>,
    /// Normalenrichtung umgekehrt (Teil jedes Verlaufs-Frames)
    pub normal_reversed: bool,
    /// Name für beim Abkoppeln eingefügte Objekte
    pub object_name: Option<String>,
    /// Zielpfad für SaveSrf
    pub save_path: Option<PathBuf>,
    /// Undo/Redo-Verlauf der Geometrie
    pub history: HistoryStack,
    /// Multiresolution-Schieberegler und Zerlegung
    pub multires: MultiResLevels,
    pub pointer: PointerMode,
    pub drag: Option<DragState>,
    pub display: DisplayFlags,
    /// Kamera zur Auflösung von Mausereignissen
    pub view: PickView,
    pub last_pick: Option<PickResult>,
    /// Verlauf ausgeführter Commands
    pub command_log: CommandLog,
    /// Laufzeit-Optionen
    pub options: EngineOptions,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSession {
    /// Erstellt eine neue Sitzung im Zustand Primitives.
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            state: SessionState::Primitives,
            params: ParameterSet::default(),
            geometry: None,
            original: None,
            binding: None,
            normal_reversed: false,
            object_name: None,
            save_path: None,
            history: HistoryStack::new_with_capacity(options.history_max_depth),
            multires: MultiResLevels::default(),
            pointer: PointerMode::Idle,
            drag: None,
            display: DisplayFlags::default(),
            view: PickView::default(),
            last_pick: None,
            command_log: CommandLog::new(),
            options,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.state == SessionState::Editing
    }

    /// Undo/Redo helpers
    pub fn can_undo(&self) -> bool {
        self.is_editing() && self.history.can_undo()
    }

    /// Gibt zurück, ob ein Redo-Schritt verfügbar ist.
    pub fn can_redo(&self) -> bool {
        self.is_editing() && self.history.can_redo()
    }

    /// Die Geometrie unter Bearbeitung.
    pub fn current(&self) -> Result<&EditableGeometry, EditError> {
        self.geometry
            .as_ref()
            .ok_or_else(|| EditError::transition("Keine Geometrie in Bearbeitung"))
    }

    /// Betritt Editing mit `geometry`; der Ausgangszustand wird Basis-Frame des Verlaufs.
    pub fn begin_editing(
        &mut self,
        geometry: EditableGeometry,
        binding: Binding,
    ) -> Result<(), EditError> {
        if !self.state.can_enter(SessionState::Editing) {
            return Err(EditError::transition(format!(
                "Editing kann aus {:?} nicht betreten werden",
                self.state
            )));
        }
        geometry.validate()?;

        let mut history = HistoryStack::new_with_capacity(self.options.history_max_depth);
        history.push_state(&geometry, false)?;
        self.original = Some(geometry.try_clone()?);
        self.history = history;
        self.normal_reversed = false;
        self.binding = Some(binding);
        self.pointer = PointerMode::Idle;
        self.drag = None;
        self.last_pick = None;
        self.rebuild_multires(&geometry);
        self.params = geometry.parameter_set();
        self.geometry = Some(geometry);
        self.state = SessionState::Editing;
        Ok(())
    }

    /// Ersetzt die Geometrie nach einem Write-ahead-Push des aktuellen Zustands.
    ///
    /// Scheitert der Push, bleiben Geometrie und Verlauf unverändert.
    pub fn apply(&mut self, next: EditableGeometry) -> Result<(), EditError> {
        let normal_reversed = self.normal_reversed;
        self.apply_with_normal(next, normal_reversed)
    }

    /// Wie [`Self::apply`], setzt zusätzlich die Normalenrichtung.
    pub fn apply_with_normal(
        &mut self,
        next: EditableGeometry,
        normal_reversed: bool,
    ) -> Result<(), EditError> {
        self.push_current()?;
        self.set_live(next, normal_reversed);
        Ok(())
    }

    /// Sichert den aktuellen Zustand als Verlaufs-Frame.
    pub fn push_current(&mut self) -> Result<(), EditError> {
        let current = self
            .geometry
            .as_ref()
            .ok_or_else(|| EditError::transition("Keine Geometrie in Bearbeitung"))?;
        self.history.push_state(current, self.normal_reversed)
    }

    /// Setzt die Live-Geometrie ohne Verlaufseintrag (Ziehgesten, Undo/Redo).
    pub fn set_live(&mut self, geometry: EditableGeometry, normal_reversed: bool) {
        self.normal_reversed = normal_reversed;
        self.params = geometry.parameter_set();
        self.multires.ensure(&geometry);
        self.geometry = Some(geometry);
    }

    /// Aktueller Zustand als unabhängiger Verlaufs-Frame.
    pub fn capture_entry(&self) -> Result<HistoryEntry, EditError> {
        HistoryEntry::capture(self.current()?, self.normal_reversed)
    }

    /// Basisname für neu eingefügte Objekte.
    pub fn base_name(&self) -> String {
        if let Some(name) = &self.object_name {
            return name.clone();
        }
        match &self.binding {
            Some(Binding::Seed { label }) => label.clone(),
            Some(Binding::Attached { name }) => name.clone(),
            Some(Binding::Cloned { source }) => source.clone(),
            None => String::from("Objekt"),
        }
    }

    /// Verlässt Editing: gibt den Verlauf frei und liefert Geometrie und Herkunft.
    pub fn end_editing(&mut self) -> Option<(EditableGeometry, Binding)> {
        self.history.free_state_stack();
        self.original = None;
        self.drag = None;
        self.pointer = PointerMode::Idle;
        self.last_pick = None;
        self.state = SessionState::Detach;
        let geometry = self.geometry.take()?;
        let binding = self.binding.take()?;
        Some((geometry, binding))
    }

    fn rebuild_multires(&mut self, geometry: &EditableGeometry) {
        let periodic = |axis| {
            geometry
                .axis(axis)
                .is_some_and(|s| s.end == EndCondition::Periodic)
        };
        let (u_level, v_level) = (self.multires.u_level, self.multires.v_level);
        self.multires = prep_kvs(
            geometry,
            self.options.multires_respect_discontinuities,
            periodic(Axis::U),
            periodic(Axis::V),
        );
        self.multires.set_level(Axis::U, u_level);
        self.multires.set_level(Axis::V, v_level);
    }
}
