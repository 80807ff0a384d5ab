//! Freiform-Editier-Engine für B-Spline-Kurven und -Flächen.
//! Toolkit-unabhängig; der Host liefert Ereignisse, Rückrufe und Objektspeicher.

pub mod app;
pub mod core;
pub mod shared;

pub use app::{
    Binding, EditController, EditSession, EditorCommand, EditorIntent, HistoryEntry,
    HistoryStack, HostBridge, HostCallbacks, LoggingHost, MenuOp, ObjectStore, PointerKind,
    RecordingHost, SceneObjects, SessionState,
};
pub use core::{
    Axis, EditError, EditableGeometry, EndCondition, GeomType, MultiResLevels, ParamType,
    ParameterSet, PickResult, PickView, PrimitiveKind,
};
pub use shared::EngineOptions;
