//! Fehler-Taxonomie der Editier-Engine.
//!
//! Nichts in der Engine beendet den Prozess: `InvalidTransition` und
//! `GeometricPrecondition` werden dem Benutzer gemeldet und als No-op
//! behandelt, `ResourceExhaustion` muss bis zum Host durchgereicht werden.
//! Numerisch degenerierte Picks sind kein Fehler, sondern `None`.

use thiserror::Error;

/// Fehler einer Editier-Operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Operation im aktuellen Sitzungszustand nicht zulässig
    #[error("Ungültiger Zustandsübergang: {0}")]
    InvalidTransition(String),

    /// Geometrische Vorbedingung verletzt (Domäne, Vielfachheit, offene Trim-Schleife, …)
    #[error("Geometrische Vorbedingung verletzt: {0}")]
    GeometricPrecondition(String),

    /// Speicher für einen History-Frame konnte nicht reserviert werden
    #[error("Speicher erschöpft beim Sichern des Verlaufs: {0}")]
    ResourceExhaustion(String),

    /// Externer Serialisierer konnte nicht schreiben
    #[error("Speichern fehlgeschlagen: {0}")]
    Persistence(String),
}

impl EditError {
    /// Kurzform für geometrische Vorbedingungen.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::GeometricPrecondition(message.into())
    }

    /// Kurzform für ungültige Zustandsübergänge.
    pub fn transition(message: impl Into<String>) -> Self {
        Self::InvalidTransition(message.into())
    }

    /// Muss der Fehler an den Host propagiert werden (statt nur gemeldet)?
    pub fn is_fatal_for_dispatch(&self) -> bool {
        matches!(self, Self::ResourceExhaustion(_))
    }
}

impl From<std::collections::TryReserveError> for EditError {
    fn from(err: std::collections::TryReserveError) -> Self {
        Self::ResourceExhaustion(err.to_string())
    }
}
