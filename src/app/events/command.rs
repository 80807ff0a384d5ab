use super::super::state::{PointerMode, SessionState};
use crate::core::{
    Axis, EndCondition, GeomType, ParamType, PickView, PrimitiveKind, ReverseMode,
};
use glam::DVec2;
use std::path::PathBuf;

/// Commands sind mutierende Schritte, die zentral ausgeführt werden.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    /// Primitives, AttachOld oder CloneOld betreten
    EnterState { state: SessionState },
    /// Editing verlassen; `commit` schreibt die Geometrie in den Speicher
    Detach { commit: bool },
    /// Objekt mit Index in `ObjectStore::names()` binden und Editing betreten
    BindObject { index: usize },
    /// Startform aus dem aktuellen Parametersatz erzeugen und Editing betreten
    SeedPrimitive { kind: PrimitiveKind },
    SetOrder { axis: Axis, order: usize },
    SetEndCondition { axis: Axis, end: EndCondition },
    SetRational { rational: bool },
    SetGeomType { geom_type: GeomType },
    SetParamType { axis: Axis, param: ParamType },
    /// Nächsten Mausklick für eine Pick-Operation vorbereiten
    ArmPointer { mode: PointerMode },
    /// Mittelpunkte aller Knotenspannen einfügen
    RefineUniform { axis: Axis },
    RaiseDegree { axis: Axis },
    /// Mit einem Objekt aus dem Speicher verschmelzen
    MergeWith { index: usize },
    Reverse { mode: ReverseMode },
    /// Kurve aus dem Speicher als Trim-Schleife anhängen
    TrimWith { index: usize, primary: bool },
    ToggleNormal,
    ToggleMesh,
    ToggleOriginal,
    /// Geometrie über den externen Serialisierer speichern
    Save,
    /// Geometrie in den Speicher übernehmen, ohne Editing zu verlassen
    Submit,
    EvaluateAt { u: f64, v: f64 },
    Undo,
    Redo,
    /// Zur beim Betreten von Editing gesicherten Geometrie zurückkehren
    Clear,
    PointerDown { screen: DVec2 },
    PointerMotion { screen: DVec2 },
    PointerUp { screen: DVec2 },
    SetLevel { axis: Axis, level: f64 },
    SetView { view: PickView },
    SetSavePath { path: PathBuf },
    Rename { name: String },
    /// Ungültige Eingabe (z. B. Unterwähler außerhalb des Bereichs)
    Reject { reason: String },
}

impl EditorCommand {
    /// Darf der Command nur im Zustand Editing ausgeführt werden?
    pub fn requires_editing(&self) -> bool {
        matches!(
            self,
            Self::Detach { .. }
                | Self::ArmPointer { .. }
                | Self::RefineUniform { .. }
                | Self::RaiseDegree { .. }
                | Self::MergeWith { .. }
                | Self::Reverse { .. }
                | Self::TrimWith { .. }
                | Self::ToggleNormal
                | Self::Save
                | Self::Submit
                | Self::EvaluateAt { .. }
                | Self::Undo
                | Self::Redo
                | Self::Clear
        )
    }
}
