use crate::core::{Continuity, EditableGeometry, PickResult};
use glam::{DVec2, DVec3};

/// Wofür der nächste Mausklick verwendet wird.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PointerMode {
    /// Klick liefert nur ein Pick-Ergebnis
    #[default]
    Idle,
    /// Kontrollpunkte ziehen (bleibt aktiv)
    MoveControlPoints,
    /// Multiresolution-Verformung ziehen (bleibt aktiv)
    ModifySurface,
    /// Einmalig: Knoten an der Pick-Stelle einfügen
    Refine,
    /// Einmalig: an der Pick-Stelle unterteilen
    Subdivide { continuity: Continuity },
    /// Zwei Klicks begrenzen den herauszuschneidenden Teilbereich
    Region { first: Option<PickResult> },
    /// Einmalig: Flächenpunkt an der Pick-Stelle melden
    Evaluate,
}

impl PointerMode {
    /// Bleibt der Modus nach einem Klick aktiv?
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::MoveControlPoints | Self::ModifySurface)
    }
}

/// Ziel einer laufenden Ziehgeste.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragTarget {
    ControlPoint { index: usize, start: DVec3 },
    Surface { u: f64, v: f64 },
}

/// Laufende Ziehgeste; Bewegungen wirken relativ zur Startgeometrie.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub start_screen: DVec2,
    pub start_geometry: EditableGeometry,
    pub target: DragTarget,
    /// Verlaufs-Frame gesichert; erst bei der ersten echten Bewegung
    pub recorded: bool,
}

/// Anzeige-Schalter ohne Einfluss auf die Geometrie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFlags {
    pub draw_mesh: bool,
    pub draw_original: bool,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self {
            draw_mesh: true,
            draw_original: false,
        }
    }
}
