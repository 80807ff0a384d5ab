use crate::core::{Axis, PickView};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Menü-Operationscodes des Hosts.
///
/// Der begleitende Unterwähler (`sub`) ist der gewählte Popup-Eintrag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuOp {
    /// Sitzungszustand wechseln (0 Primitives, 1 AttachOld, 2 CloneOld, 3 Detach)
    State,
    /// Objekt aus dem Speicher binden
    SrfName,
    UOrder,
    VOrder,
    UEndCond,
    VEndCond,
    Rational,
    SrfType,
    UParamType,
    VParamType,
    /// Teilbereich per zwei Klicks herausschneiden
    Region,
    /// 0 an Pick-Stelle, 1 gleichmäßig in U, 2 gleichmäßig in V
    Refine,
    /// 0 Pick mit C0, 1 Pick mit C1
    Subdiv,
    URaise,
    VRaise,
    MoveCtlPts,
    ModifySrf,
    MergeSrfs,
    ModifyNormalDir,
    SaveSrf,
    SubmitSrf,
    DrawMesh,
    DrawOrig,
    Reverse,
    Trim,
    Evaluate,
    Primitives,
    Undo,
    Redo,
    Clear,
    Dismiss,
}

/// Art eines Mausereignisses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    ButtonDown,
    ButtonUp,
    Motion,
}

/// Mausereignis in Bildschirmkoordinaten (Ursprung oben links).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub screen: DVec2,
}

/// Editor-Intents: Eingaben des Hosts ohne direkte Mutationslogik.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorIntent {
    /// Menüauswahl mit Unterwähler
    Menu { op: MenuOp, sub: i32 },
    /// Maustaste oder Mausbewegung im Viewport
    Pointer(PointerEvent),
    /// Multiresolution-Schieberegler bewegt
    LevelChanged { axis: Axis, level: f64 },
    /// Host-Kamera hat sich geändert
    ViewChanged { view: PickView },
    /// Zielpfad für SaveSrf gewählt
    SavePathSelected { path: PathBuf },
    /// Name für das beim Abkoppeln eingefügte Objekt
    Rename { name: String },
    /// Fläche an einer Parameterstelle auswerten
    EvaluateAt { u: f64, v: f64 },
}

impl EditorIntent {
    /// Kurzform für Menü-Intents.
    pub fn menu(op: MenuOp, sub: i32) -> Self {
        Self::Menu { op, sub }
    }

    /// Kurzform für Mausereignisse.
    pub fn pointer(kind: PointerKind, x: f64, y: f64) -> Self {
        Self::Pointer(PointerEvent {
            kind,
            screen: DVec2::new(x, y),
        })
    }
}
