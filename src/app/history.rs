//! HistoryStack: snapshot-basiertes Undo/Redo für die editierte Geometrie.
//!
//! Jeder Frame ist eine unabhängige Tiefenkopie (kein Teilen mit der
//! Live-Geometrie). Kosten: O(1) Push/Pop, Speicher O(Tiefe × Netzgröße).
//! Alle Stapel wachsen nur über `try_reserve`.

use crate::core::{EditError, EditableGeometry};
use std::collections::VecDeque;

/// Ein Verlaufs-Frame: Geometrie (inkl. Trim-Schleifen) plus Normalenrichtung.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub geometry: EditableGeometry,
    pub normal_reversed: bool,
}

impl HistoryEntry {
    /// Erstellt eine unabhängige Kopie mit fehlbarer Speicherreservierung.
    pub fn capture(geometry: &EditableGeometry, normal_reversed: bool) -> Result<Self, EditError> {
        Ok(Self {
            geometry: geometry.try_clone()?,
            normal_reversed,
        })
    }
}

/// Linearer Undo/Redo-Verlauf mit maximaler Tiefe.
#[derive(Debug, Default)]
pub struct HistoryStack {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    max_depth: usize,
}

impl HistoryStack {
    /// Erstellt einen neuen Verlauf mit maximaler Tiefe.
    pub fn new_with_capacity(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Sichert den Zustand vor einer Mutation und verwirft den Redo-Zweig.
    ///
    /// Ist der oberste Frame bereits identisch (z. B. der Basis-Frame direkt
    /// nach dem Betreten von Editing), wird kein Duplikat angelegt.
    pub fn push_state(
        &mut self,
        geometry: &EditableGeometry,
        normal_reversed: bool,
    ) -> Result<(), EditError> {
        let duplicate = self.undo_stack.back().is_some_and(|top| {
            top.normal_reversed == normal_reversed && &top.geometry == geometry
        });
        if !duplicate {
            let entry = HistoryEntry::capture(geometry, normal_reversed)?;
            Self::push_bounded(&mut self.undo_stack, entry, self.max_depth)?;
        }
        self.redo_stack.clear();
        Ok(())
    }

    /// Prüft ob Undo möglich ist.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Prüft ob Redo möglich ist.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Holt den letzten Frame und legt `current` auf den Redo-Stack.
    ///
    /// Bei leerem Verlauf: `Ok(None)`, `current` wird verworfen (Aufrufer prüft
    /// vorher `can_undo`). Scheitert die Reservierung, bleiben beide Stapel unverändert.
    pub fn undo_state(&mut self, current: HistoryEntry) -> Result<Option<HistoryEntry>, EditError> {
        if self.undo_stack.is_empty() {
            return Ok(None);
        }
        Self::push_bounded(&mut self.redo_stack, current, self.max_depth)?;
        Ok(self.undo_stack.pop_back())
    }

    /// Holt den letzten Redo-Frame und legt `current` auf den Undo-Stack.
    pub fn redo_state(&mut self, current: HistoryEntry) -> Result<Option<HistoryEntry>, EditError> {
        if self.redo_stack.is_empty() {
            return Ok(None);
        }
        Self::push_bounded(&mut self.undo_stack, current, self.max_depth)?;
        Ok(self.redo_stack.pop_back())
    }

    /// Gibt alle Frames frei (Ende der Sitzung).
    pub fn free_state_stack(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undo_stack.shrink_to_fit();
        self.redo_stack.shrink_to_fit();
    }

    /// Legt `entry` oben ab; bei voller Tiefe fällt der älteste Frame weg.
    fn push_bounded(
        stack: &mut VecDeque<HistoryEntry>,
        entry: HistoryEntry,
        max_depth: usize,
    ) -> Result<(), EditError> {
        if stack.len() >= max_depth {
            stack.pop_front();
        } else {
            stack.try_reserve(1)?;
        }
        stack.push_back(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::ParameterSet;
    use glam::DVec3;

    fn line_with_length(length: f64) -> EditableGeometry {
        let points = (0..4)
            .map(|i| DVec3::new(length * i as f64 / 3.0, 0.0, 0.0))
            .collect();
        EditableGeometry::from_grid(&ParameterSet::default(), vec![points])
            .expect("Linie sollte gültig sein")
    }

    fn entry(length: f64) -> HistoryEntry {
        HistoryEntry::capture(&line_with_length(length), false).expect("Kopie")
    }

    fn length_of(entry: &HistoryEntry) -> f64 {
        entry.geometry.evaluate(1.0, 0.0).x
    }

    #[test]
    fn empty_history_cannot_undo_or_redo() {
        let history = HistoryStack::new_with_capacity(10);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn push_enables_undo() {
        let mut history = HistoryStack::new_with_capacity(10);
        history
            .push_state(&line_with_length(1.0), false)
            .expect("Push sollte gelingen");
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_restores_previous_frame() {
        let mut history = HistoryStack::new_with_capacity(10);
        history.push_state(&line_with_length(2.0), false).expect("Push");

        let restored = history
            .undo_state(entry(5.0))
            .expect("Undo sollte gelingen")
            .expect("undo vorhanden");

        assert!((length_of(&restored) - 2.0).abs() < 1e-12);
        assert!(!history.can_undo());
        assert!(history.can_redo());
    }

    #[test]
    fn redo_restores_undone_frame() {
        let mut history = HistoryStack::new_with_capacity(10);
        history.push_state(&line_with_length(2.0), false).expect("Push");
        let _restored = history.undo_state(entry(5.0)).expect("Undo");

        let redone = history
            .redo_state(entry(2.0))
            .expect("Redo sollte gelingen")
            .expect("redo vorhanden");

        assert!((length_of(&redone) - 5.0).abs() < 1e-12);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn new_push_clears_redo_stack() {
        let mut history = HistoryStack::new_with_capacity(10);
        history.push_state(&line_with_length(1.0), false).expect("Push");
        let _restored = history.undo_state(entry(3.0)).expect("Undo");
        assert!(history.can_redo());

        history.push_state(&line_with_length(7.0), false).expect("Push");
        assert!(!history.can_redo());
    }

    #[test]
    fn respects_max_depth() {
        let mut history = HistoryStack::new_with_capacity(3);
        for i in 1..=5 {
            history.push_state(&line_with_length(i as f64), false).expect("Push");
        }

        // Nur 3 Undo-Schritte sollten möglich sein
        let mut undo_count = 0;
        while history.can_undo() {
            history.undo_state(entry(99.0)).expect("Undo");
            undo_count += 1;
        }
        assert_eq!(undo_count, 3);
    }

    #[test]
    fn identical_top_frame_is_not_duplicated() {
        let mut history = HistoryStack::new_with_capacity(10);
        let geom = line_with_length(1.0);
        history.push_state(&geom, false).expect("Push");
        history.push_state(&geom, false).expect("Push");
        assert_eq!(history.undo_depth(), 1);
        history.push_state(&geom, true).expect("Push");
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn frames_are_independent_of_live_geometry() {
        let mut history = HistoryStack::new_with_capacity(10);
        let mut live = line_with_length(1.0);
        history.push_state(&live, false).expect("Push");
        live.points_mut()[3].x = 42.0;
        let restored = history
            .undo_state(entry(0.0))
            .expect("Undo sollte gelingen")
            .expect("undo vorhanden");
        assert!((length_of(&restored) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn undo_and_redo_on_empty_return_none() {
        let mut history = HistoryStack::new_with_capacity(10);
        assert_eq!(history.undo_state(entry(1.0)), Ok(None));
        assert_eq!(history.redo_state(entry(1.0)), Ok(None));
    }

    #[test]
    fn free_state_stack_clears_everything() {
        let mut history = HistoryStack::new_with_capacity(10);
        history.push_state(&line_with_length(1.0), false).expect("Push");
        let _ = history.undo_state(entry(2.0)).expect("Undo");
        history.free_state_stack();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_redo_cycles_respect_max_depth() {
        let mut history = HistoryStack::new_with_capacity(2);
        for i in 1..=2 {
            history.push_state(&line_with_length(i as f64), false).expect("Push");
        }
        let mut current = entry(3.0);
        for _ in 0..2 {
            current = history
                .undo_state(current)
                .expect("Undo sollte gelingen")
                .expect("undo vorhanden");
        }
        assert_eq!(history.redo_depth(), 2);
        for _ in 0..2 {
            current = history
                .redo_state(current)
                .expect("Redo sollte gelingen")
                .expect("redo vorhanden");
        }
        assert_eq!(history.undo_depth(), 2);
        assert!((length_of(&current) - 3.0).abs() < 1e-12);
    }
}
