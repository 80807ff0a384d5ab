use crate::app::state::{PointerMode, SessionState};
use crate::app::{EditSession, EditorCommand, EditorIntent, MenuOp, PointerKind};
use crate::core::{Axis, Continuity, EndCondition, ReverseMode};

use super::map_intent_to_commands;

fn map_menu(op: MenuOp, sub: i32) -> Vec<EditorCommand> {
    map_intent_to_commands(&EditSession::new(), EditorIntent::menu(op, sub))
}

#[test]
fn state_sub_selector_maps_to_transition_or_detach() {
    assert_eq!(
        map_menu(MenuOp::State, 1),
        vec![EditorCommand::EnterState {
            state: SessionState::AttachOld
        }]
    );
    assert_eq!(
        map_menu(MenuOp::State, 3),
        vec![EditorCommand::Detach { commit: true }]
    );
}

#[test]
fn dismiss_maps_to_detach_without_commit() {
    assert_eq!(
        map_menu(MenuOp::Dismiss, 0),
        vec![EditorCommand::Detach { commit: false }]
    );
}

#[test]
fn out_of_range_sub_selector_maps_to_reject() {
    let commands = map_menu(MenuOp::UEndCond, 7);

    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], EditorCommand::Reject { .. }));
}

#[test]
fn order_zero_is_rejected() {
    assert!(matches!(
        map_menu(MenuOp::VOrder, 0)[0],
        EditorCommand::Reject { .. }
    ));
    assert_eq!(
        map_menu(MenuOp::VOrder, 3),
        vec![EditorCommand::SetOrder {
            axis: Axis::V,
            order: 3
        }]
    );
}

#[test]
fn end_condition_popup_maps_to_axis() {
    assert_eq!(
        map_menu(MenuOp::UEndCond, 2),
        vec![EditorCommand::SetEndCondition {
            axis: Axis::U,
            end: EndCondition::Periodic
        }]
    );
}

#[test]
fn refine_variants_map_to_pick_or_uniform() {
    assert_eq!(
        map_menu(MenuOp::Refine, 0),
        vec![EditorCommand::ArmPointer {
            mode: PointerMode::Refine
        }]
    );
    assert_eq!(
        map_menu(MenuOp::Refine, 2),
        vec![EditorCommand::RefineUniform { axis: Axis::V }]
    );
}

#[test]
fn subdiv_carries_continuity() {
    assert_eq!(
        map_menu(MenuOp::Subdiv, 1),
        vec![EditorCommand::ArmPointer {
            mode: PointerMode::Subdivide {
                continuity: Continuity::C1
            }
        }]
    );
}

#[test]
fn trim_sign_selects_primary_or_secondary_loop() {
    assert_eq!(
        map_menu(MenuOp::Trim, 2),
        vec![EditorCommand::TrimWith {
            index: 2,
            primary: true
        }]
    );
    assert_eq!(
        map_menu(MenuOp::Trim, -1),
        vec![EditorCommand::TrimWith {
            index: 0,
            primary: false
        }]
    );
}

#[test]
fn reverse_swap_maps_to_mode() {
    assert_eq!(
        map_menu(MenuOp::Reverse, 2),
        vec![EditorCommand::Reverse {
            mode: ReverseMode::Swap
        }]
    );
}

#[test]
fn motion_without_drag_maps_to_nothing() {
    let session = EditSession::new();

    let commands = map_intent_to_commands(
        &session,
        EditorIntent::pointer(PointerKind::Motion, 10.0, 20.0),
    );

    assert!(commands.is_empty());
}

#[test]
fn button_down_maps_to_pointer_down() {
    let session = EditSession::new();

    let commands = map_intent_to_commands(
        &session,
        EditorIntent::pointer(PointerKind::ButtonDown, 10.0, 20.0),
    );

    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], EditorCommand::PointerDown { .. }));
}
