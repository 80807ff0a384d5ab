//! Mapping von Host-Intents auf mutierende Editor-Commands.

use super::state::{PointerMode, SessionState};
use super::{EditSession, EditorCommand, EditorIntent, MenuOp, PointerKind};
use crate::core::{
    Axis, Continuity, EndCondition, GeomType, ParamType, PrimitiveKind, ReverseMode,
};

/// Übersetzt einen `EditorIntent` in eine Sequenz ausführbarer `EditorCommand`s.
pub fn map_intent_to_commands(session: &EditSession, intent: EditorIntent) -> Vec<EditorCommand> {
    match intent {
        EditorIntent::Menu { op, sub } => vec![map_menu(op, sub)],
        EditorIntent::Pointer(event) => match event.kind {
            PointerKind::ButtonDown => vec![EditorCommand::PointerDown {
                screen: event.screen,
            }],
            // Bewegung ohne laufende Ziehgeste ändert nichts
            PointerKind::Motion if session.drag.is_none() => Vec::new(),
            PointerKind::Motion => vec![EditorCommand::PointerMotion {
                screen: event.screen,
            }],
            PointerKind::ButtonUp => vec![EditorCommand::PointerUp {
                screen: event.screen,
            }],
        },
        EditorIntent::LevelChanged { axis, level } => vec![EditorCommand::SetLevel { axis, level }],
        EditorIntent::ViewChanged { view } => vec![EditorCommand::SetView { view }],
        EditorIntent::SavePathSelected { path } => vec![EditorCommand::SetSavePath { path }],
        EditorIntent::Rename { name } => vec![EditorCommand::Rename { name }],
        EditorIntent::EvaluateAt { u, v } => vec![EditorCommand::EvaluateAt { u, v }],
    }
}

fn map_menu(op: MenuOp, sub: i32) -> EditorCommand {
    let index = usize::try_from(sub).ok();
    let mapped = match op {
        MenuOp::State => SessionState::from_index(sub).map(|state| match state {
            SessionState::Detach => EditorCommand::Detach { commit: true },
            state => EditorCommand::EnterState { state },
        }),
        MenuOp::SrfName => index.map(|index| EditorCommand::BindObject { index }),
        MenuOp::UOrder => order_command(Axis::U, sub),
        MenuOp::VOrder => order_command(Axis::V, sub),
        MenuOp::UEndCond => EndCondition::from_index(sub)
            .map(|end| EditorCommand::SetEndCondition { axis: Axis::U, end }),
        MenuOp::VEndCond => EndCondition::from_index(sub)
            .map(|end| EditorCommand::SetEndCondition { axis: Axis::V, end }),
        MenuOp::Rational => match sub {
            0 => Some(EditorCommand::SetRational { rational: false }),
            1 => Some(EditorCommand::SetRational { rational: true }),
            _ => None,
        },
        MenuOp::SrfType => match sub {
            0 => Some(EditorCommand::SetGeomType {
                geom_type: GeomType::Bezier,
            }),
            1 => Some(EditorCommand::SetGeomType {
                geom_type: GeomType::Bspline,
            }),
            _ => None,
        },
        MenuOp::UParamType => ParamType::from_index(sub)
            .map(|param| EditorCommand::SetParamType { axis: Axis::U, param }),
        MenuOp::VParamType => ParamType::from_index(sub)
            .map(|param| EditorCommand::SetParamType { axis: Axis::V, param }),
        MenuOp::Region => Some(arm(PointerMode::Region { first: None })),
        MenuOp::Refine => match sub {
            0 => Some(arm(PointerMode::Refine)),
            1 => Some(EditorCommand::RefineUniform { axis: Axis::U }),
            2 => Some(EditorCommand::RefineUniform { axis: Axis::V }),
            _ => None,
        },
        MenuOp::Subdiv => Continuity::from_index(sub)
            .map(|continuity| arm(PointerMode::Subdivide { continuity })),
        MenuOp::URaise => Some(EditorCommand::RaiseDegree { axis: Axis::U }),
        MenuOp::VRaise => Some(EditorCommand::RaiseDegree { axis: Axis::V }),
        MenuOp::MoveCtlPts => Some(arm(PointerMode::MoveControlPoints)),
        MenuOp::ModifySrf => Some(arm(PointerMode::ModifySurface)),
        MenuOp::MergeSrfs => index.map(|index| EditorCommand::MergeWith { index }),
        MenuOp::ModifyNormalDir => Some(EditorCommand::ToggleNormal),
        MenuOp::SaveSrf => Some(EditorCommand::Save),
        MenuOp::SubmitSrf => Some(EditorCommand::Submit),
        MenuOp::DrawMesh => Some(EditorCommand::ToggleMesh),
        MenuOp::DrawOrig => Some(EditorCommand::ToggleOriginal),
        MenuOp::Reverse => ReverseMode::from_index(sub).map(|mode| EditorCommand::Reverse { mode }),
        // Negativ: -(Index + 1) als sekundäre Schleife
        MenuOp::Trim => Some(match index {
            Some(index) => EditorCommand::TrimWith {
                index,
                primary: true,
            },
            None => EditorCommand::TrimWith {
                index: sub.unsigned_abs() as usize - 1,
                primary: false,
            },
        }),
        MenuOp::Evaluate => Some(arm(PointerMode::Evaluate)),
        MenuOp::Primitives => {
            PrimitiveKind::from_index(sub).map(|kind| EditorCommand::SeedPrimitive { kind })
        }
        MenuOp::Undo => Some(EditorCommand::Undo),
        MenuOp::Redo => Some(EditorCommand::Redo),
        MenuOp::Clear => Some(EditorCommand::Clear),
        MenuOp::Dismiss => Some(EditorCommand::Detach { commit: false }),
    };

    mapped.unwrap_or_else(|| EditorCommand::Reject {
        reason: format!("Ungültige Auswahl {sub} für {op:?}"),
    })
}

fn order_command(axis: Axis, sub: i32) -> Option<EditorCommand> {
    usize::try_from(sub)
        .ok()
        .filter(|order| *order >= 1)
        .map(|order| EditorCommand::SetOrder { axis, order })
}

fn arm(mode: PointerMode) -> EditorCommand {
    EditorCommand::ArmPointer { mode }
}

#[cfg(test)]
mod tests;
