//! Protokoll der ausgeführten Commands samt Ergebnis.
//!
//! Der Replay-Treiber fasst damit einen Lauf zusammen, die Flow-Tests prüfen
//! darüber, ob ein Command angewendet oder abgewiesen wurde.

use super::EditorCommand;
use crate::core::EditError;
use std::collections::VecDeque;

/// Ausgang eines Commands nach dem Dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Zustand wurde übernommen (auch No-ops wie ein Klick ins Leere)
    Applied,
    /// Abgewiesen und per PlaceMessage gemeldet; die Sitzung blieb unverändert
    Rejected(EditError),
}

impl CommandOutcome {
    pub fn from_result(result: &Result<(), EditError>) -> Self {
        match result {
            Ok(()) => Self::Applied,
            Err(err) => Self::Rejected(err.clone()),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Ein Protokolleintrag.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRecord {
    /// Laufende Nummer seit Sitzungsbeginn (bleibt beim Verwerfen alter Einträge erhalten)
    pub sequence: u64,
    pub command: EditorCommand,
    pub outcome: CommandOutcome,
}

/// Begrenztes Protokoll; bei Überlauf fällt jeweils der älteste Eintrag weg.
#[derive(Debug, Default)]
pub struct CommandLog {
    entries: VecDeque<CommandRecord>,
    next_sequence: u64,
    rejected_total: u64,
}

impl CommandLog {
    const MAX_ENTRIES: usize = 1000;

    pub fn new() -> Self {
        Self::default()
    }

    /// Trägt einen ausgeführten Command mit seinem Ausgang ein.
    pub fn record(&mut self, command: EditorCommand, outcome: CommandOutcome) {
        if self.entries.len() >= Self::MAX_ENTRIES {
            self.entries.pop_front();
        }
        if outcome.is_rejected() {
            self.rejected_total += 1;
        }
        self.entries.push_back(CommandRecord {
            sequence: self.next_sequence,
            command,
            outcome,
        });
        self.next_sequence += 1;
    }

    /// Anzahl gehaltener Einträge.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Alle seit Sitzungsbeginn protokollierten Commands (auch verworfene).
    pub fn total(&self) -> u64 {
        self.next_sequence
    }

    /// Alle seit Sitzungsbeginn abgewiesenen Commands.
    pub fn rejected_total(&self) -> u64 {
        self.rejected_total
    }

    pub fn last(&self) -> Option<&CommandRecord> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandRecord> {
        self.entries.iter()
    }

    /// Gehaltene abgewiesene Einträge in Reihenfolge.
    pub fn rejections(&self) -> impl Iterator<Item = &CommandRecord> {
        self.entries.iter().filter(|r| r.outcome.is_rejected())
    }
}
