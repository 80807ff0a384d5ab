use freeform_edit::app::CommandOutcome;
use freeform_edit::core::primitives::build;
use freeform_edit::{
    Axis, EditController, EditError, EditSession, EditableGeometry, EditorCommand, EditorIntent,
    EndCondition, EngineOptions, HostBridge, MenuOp, ObjectStore, ParameterSet, PrimitiveKind,
    RecordingHost, SceneObjects, SessionState,
};
use glam::DVec3;

struct Harness {
    controller: EditController,
    session: EditSession,
    store: SceneObjects,
    host: RecordingHost,
}

impl Harness {
    fn new() -> Self {
        Self {
            controller: EditController::new(),
            session: EditSession::new(),
            store: SceneObjects::new(),
            host: RecordingHost::new(),
        }
    }

    /// Startformen mit `count` Kontrollpunkten je Richtung.
    fn with_control_count(count: usize) -> Self {
        let options = EngineOptions {
            primitive_control_count: count,
            ..EngineOptions::default()
        };
        Self {
            session: EditSession::with_options(options),
            ..Self::new()
        }
    }

    fn send(&mut self, intent: EditorIntent) {
        let mut bridge = HostBridge::new(&mut self.host, &mut self.store);
        self.controller
            .handle_intent(&mut self.session, &mut bridge, intent)
            .expect("Intent sollte ohne Fehler durchlaufen");
    }

    fn menu(&mut self, op: MenuOp, sub: i32) {
        self.send(EditorIntent::menu(op, sub));
    }

    fn geometry(&self) -> &EditableGeometry {
        self.session
            .geometry
            .as_ref()
            .expect("Es sollte Geometrie in Bearbeitung sein")
    }

    fn last_message(&self) -> &str {
        self.host
            .last_message()
            .expect("Es sollte eine Meldung geben")
    }
}

fn plane() -> EditableGeometry {
    build(PrimitiveKind::Plane, &ParameterSet::default(), 4).expect("Ebene")
}

fn assert_same_shape(a: &EditableGeometry, b: &EditableGeometry) {
    for i in 0..=10 {
        for j in 0..=10 {
            let (u, v) = (i as f64 / 10.0, j as f64 / 10.0);
            let d = (a.evaluate(u, v) - b.evaluate(u, v)).length();
            assert!(d < 1e-9, "Form weicht bei ({u}, {v}) um {d} ab");
        }
    }
}

#[test]
fn test_seed_plane_enters_editing_and_logs_command() {
    let mut h = Harness::new();

    h.menu(MenuOp::Primitives, 0);

    assert_eq!(h.session.state, SessionState::Editing);
    assert!(h.geometry().is_surface());
    assert_eq!(h.geometry().len(Axis::U), 4);
    assert_eq!(h.geometry().len(Axis::V), 4);

    let last = h
        .session
        .command_log
        .last()
        .expect("Es sollte ein Command geloggt sein");
    match &last.command {
        EditorCommand::SeedPrimitive { kind } => assert_eq!(*kind, PrimitiveKind::Plane),
        other => panic!("Unerwarteter letzter Command: {other:?}"),
    }
    assert_eq!(last.outcome, CommandOutcome::Applied);
    let (_, state) = h
        .host
        .param_updates
        .last()
        .expect("Parameteranzeige sollte aktualisiert werden");
    assert_eq!(*state, SessionState::Editing);
}

#[test]
fn test_refine_undo_redo_round_trip() {
    let mut h = Harness::new();
    h.menu(MenuOp::Primitives, 0);
    let s0 = h.geometry().clone();

    h.menu(MenuOp::Refine, 1);
    let s1 = h.geometry().clone();
    assert_eq!(s1.len(Axis::U), 5);
    assert_eq!(s1.len(Axis::V), 4);
    assert_same_shape(&s0, &s1);

    h.menu(MenuOp::Undo, 0);
    assert_eq!(h.geometry(), &s0);
    assert!(h.session.can_redo());

    h.menu(MenuOp::Redo, 0);
    assert_eq!(h.geometry(), &s1);
    assert!(!h.session.can_redo());
}

#[test]
fn test_new_edit_after_undo_discards_redo_branch() {
    let mut h = Harness::new();
    h.menu(MenuOp::Primitives, 0);
    h.menu(MenuOp::Refine, 1);
    h.menu(MenuOp::Undo, 0);

    h.menu(MenuOp::VRaise, 0);
    let raised = h.geometry().clone();
    assert_eq!(raised.axis(Axis::V).map(|a| a.order), Some(5));

    h.menu(MenuOp::Redo, 0);

    assert!(h.last_message().contains("Nichts wiederherzustellen"));
    assert_eq!(h.geometry(), &raised);
}

#[test]
fn test_editing_only_command_outside_editing_is_rejected() {
    let mut h = Harness::new();

    h.menu(MenuOp::Undo, 0);

    assert_eq!(h.session.state, SessionState::Primitives);
    assert!(h.last_message().starts_with("Ungültiger Zustandsübergang"));
    let last = h.session.command_log.last().expect("Command geloggt");
    assert_eq!(last.command, EditorCommand::Undo);
    assert!(matches!(
        last.outcome,
        CommandOutcome::Rejected(EditError::InvalidTransition(_))
    ));
    assert_eq!(h.session.command_log.rejected_total(), 1);
}

#[test]
fn test_out_of_range_sub_selector_is_reported() {
    let mut h = Harness::new();

    h.menu(MenuOp::UEndCond, 9);

    assert!(h.last_message().contains("Ungültige Auswahl 9"));
    assert_eq!(h.session.params, ParameterSet::default());
}

#[test]
fn test_params_outside_editing_shape_next_seed() {
    let mut h = Harness::new();
    h.menu(MenuOp::UOrder, 3);
    h.menu(MenuOp::UEndCond, 2);

    h.menu(MenuOp::Primitives, 1);

    let u = h.geometry().axis(Axis::U).expect("U-Richtung");
    assert_eq!(u.order, 3);
    assert_eq!(u.end, EndCondition::Periodic);
}

#[test]
fn test_seed_outside_primitives_is_rejected() {
    let mut h = Harness::new();
    h.menu(MenuOp::Primitives, 0);

    h.menu(MenuOp::Primitives, 2);

    assert!(h.geometry().is_surface());
    assert!(h.last_message().starts_with("Ungültiger Zustandsübergang"));
}

#[test]
fn test_attach_detach_replaces_store_object() {
    let mut h = Harness::new();
    h.store.insert("Fläche", plane());

    h.menu(MenuOp::State, 1);
    h.menu(MenuOp::SrfName, 0);
    assert_eq!(h.session.state, SessionState::Editing);
    h.menu(MenuOp::Refine, 1);
    h.menu(MenuOp::State, 3);

    assert_eq!(h.session.state, SessionState::Detach);
    assert!(!h.session.history.can_undo());
    assert_eq!(h.store.len(), 1);
    let stored = h.store.get("Fläche").expect("Objekt vorhanden");
    assert_eq!(stored.len(Axis::U), 5);
}

#[test]
fn test_clone_detach_inserts_new_object_and_keeps_source() {
    let mut h = Harness::new();
    h.store.insert("Fläche", plane());

    h.menu(MenuOp::State, 2);
    h.menu(MenuOp::SrfName, 0);
    h.menu(MenuOp::Refine, 2);
    h.menu(MenuOp::State, 3);

    assert_eq!(h.store.names(), vec!["Fläche", "Fläche.2"]);
    assert_eq!(h.store.get("Fläche"), Some(&plane()));
    let copy = h.store.get("Fläche.2").expect("Kopie vorhanden");
    assert_eq!(copy.len(Axis::V), 5);
}

#[test]
fn test_dismiss_discards_changes() {
    let mut h = Harness::new();
    h.store.insert("Fläche", plane());
    h.menu(MenuOp::State, 1);
    h.menu(MenuOp::SrfName, 0);
    h.menu(MenuOp::Refine, 1);

    h.menu(MenuOp::Dismiss, 0);

    assert_eq!(h.session.state, SessionState::Detach);
    assert_eq!(h.store.get("Fläche"), Some(&plane()));
    assert!(h.session.geometry.is_none());
}

#[test]
fn test_bind_unknown_index_is_rejected() {
    let mut h = Harness::new();
    h.menu(MenuOp::State, 1);

    h.menu(MenuOp::SrfName, 3);

    assert_eq!(h.session.state, SessionState::AttachOld);
    assert!(h.last_message().contains("Kein Objekt mit Index 3"));
}

#[test]
fn test_incompatible_merge_reports_and_keeps_geometry() {
    let mut h = Harness::new();
    h.store.insert(
        "Linie",
        build(PrimitiveKind::Line, &ParameterSet::default(), 4).expect("Linie"),
    );
    h.menu(MenuOp::Primitives, 0);
    let before = h.geometry().clone();
    let depth = h.session.history.undo_depth();

    h.menu(MenuOp::MergeSrfs, 0);

    assert!(h.last_message().contains("Inkompatible Flächen"));
    assert_eq!(h.geometry(), &before);
    assert_eq!(h.session.history.undo_depth(), depth);
}

#[test]
fn test_clear_restores_original_and_is_undoable() {
    let mut h = Harness::new();
    h.menu(MenuOp::Primitives, 0);
    let original = h.geometry().clone();
    h.menu(MenuOp::Refine, 1);
    let refined = h.geometry().clone();

    h.menu(MenuOp::Clear, 0);
    assert_eq!(h.geometry(), &original);

    h.menu(MenuOp::Undo, 0);
    assert_eq!(h.geometry(), &refined);
}

#[test]
fn test_order_change_raises_degree_and_keeps_shape() {
    let mut h = Harness::new();
    h.menu(MenuOp::Primitives, 0);
    let before = h.geometry().clone();

    h.menu(MenuOp::UOrder, 6);

    assert_eq!(h.geometry().axis(Axis::U).map(|a| a.order), Some(6));
    assert_eq!(h.session.params.u_order, 6);
    assert_same_shape(&before, h.geometry());

    h.menu(MenuOp::Undo, 0);
    assert_eq!(h.session.params.u_order, 4);
}

#[test]
fn test_uraise_on_non_rational_plane_keeps_shape() {
    let mut h = Harness::with_control_count(6);
    h.menu(MenuOp::Primitives, 0);
    let before = h.geometry().clone();
    let messages = h.host.messages.len();

    h.menu(MenuOp::URaise, 0);

    assert_eq!(h.host.messages.len(), messages, "URaise sollte ohne Meldung gelingen");
    assert_eq!(h.geometry().axis(Axis::U).map(|a| a.order), Some(5));
    assert_eq!(h.session.params.u_order, 5);
    assert!(!h.geometry().is_rational());
    assert_same_shape(&before, h.geometry());

    h.menu(MenuOp::VRaise, 0);
    assert_eq!(h.geometry().axis(Axis::V).map(|a| a.order), Some(5));
    assert_same_shape(&before, h.geometry());

    h.menu(MenuOp::Undo, 0);
    h.menu(MenuOp::Undo, 0);
    assert_eq!(h.geometry(), &before);
}

#[test]
fn test_order_increase_through_parameters_for_every_end_condition() {
    for end in 0..3 {
        let mut h = Harness::with_control_count(6);
        h.menu(MenuOp::UEndCond, end);
        h.menu(MenuOp::VEndCond, end);
        h.menu(MenuOp::Primitives, 0);
        let before = h.geometry().clone();

        h.menu(MenuOp::UOrder, 5);
        h.menu(MenuOp::VOrder, 6);

        let geom = h.geometry();
        assert_eq!(geom.axis(Axis::U).map(|a| a.order), Some(5), "Endbedingung {end}");
        assert_eq!(geom.axis(Axis::V).map(|a| a.order), Some(6), "Endbedingung {end}");
        assert_same_shape(&before, geom);
    }
}

#[test]
fn test_rational_toggle_updates_params() {
    let mut h = Harness::new();
    h.menu(MenuOp::Primitives, 0);

    h.menu(MenuOp::Rational, 1);

    assert!(h.geometry().is_rational());
    assert!(h.session.params.rational);
}

#[test]
fn test_reverse_flips_normal_and_undo_restores_it() {
    let mut h = Harness::new();
    h.menu(MenuOp::Primitives, 0);

    h.menu(MenuOp::Reverse, 0);
    assert!(h.session.normal_reversed);

    h.menu(MenuOp::Undo, 0);
    assert!(!h.session.normal_reversed);
}

#[test]
fn test_normal_toggle_does_not_touch_history() {
    let mut h = Harness::new();
    h.menu(MenuOp::Primitives, 0);
    let depth = h.session.history.undo_depth();

    h.menu(MenuOp::ModifyNormalDir, 0);

    assert!(h.session.normal_reversed);
    assert_eq!(h.session.history.undo_depth(), depth);
    assert!(h.host.redraws > 0);
}

#[test]
fn test_trim_accepts_closed_loop_and_rejects_open_curve() {
    let mut h = Harness::new();
    let ring_params = ParameterSet {
        u_order: 3,
        u_end: EndCondition::Periodic,
        ..ParameterSet::default()
    };
    let ring: Vec<DVec3> = (0..6)
        .map(|i| {
            let a = i as f64 * std::f64::consts::TAU / 6.0;
            DVec3::new(0.5 + 0.25 * a.cos(), 0.5 + 0.25 * a.sin(), 0.0)
        })
        .collect();
    h.store.insert(
        "Schleife",
        EditableGeometry::from_grid(&ring_params, vec![ring]).expect("Schleife"),
    );
    let open: Vec<DVec3> = (0..4)
        .map(|i| DVec3::new(0.1 + 0.2 * i as f64, 0.1, 0.0))
        .collect();
    h.store.insert(
        "Offen",
        EditableGeometry::from_grid(&ParameterSet::default(), vec![open]).expect("Kurve"),
    );
    h.menu(MenuOp::Primitives, 0);

    h.menu(MenuOp::Trim, 1);
    assert!(h.last_message().contains("nicht geschlossen"));
    assert!(h.geometry().trims().is_empty());

    h.menu(MenuOp::Trim, 0);
    assert_eq!(h.geometry().trims().len(), 1);
    assert!(h.geometry().trims()[0].primary);
}

#[test]
fn test_submit_keeps_editing_and_replaces_on_second_submit() {
    let mut h = Harness::new();
    h.menu(MenuOp::Primitives, 0);
    h.send(EditorIntent::Rename {
        name: "Dach".into(),
    });

    h.menu(MenuOp::SubmitSrf, 0);
    h.menu(MenuOp::Refine, 1);
    h.menu(MenuOp::SubmitSrf, 0);

    assert_eq!(h.session.state, SessionState::Editing);
    assert_eq!(h.store.names(), vec!["Dach"]);
    assert_eq!(h.store.get("Dach").map(|g| g.len(Axis::U)), Some(5));
}

#[test]
fn test_save_without_path_is_reported() {
    let mut h = Harness::new();
    h.menu(MenuOp::Primitives, 0);

    h.menu(MenuOp::SaveSrf, 0);

    assert!(h.last_message().starts_with("Speichern fehlgeschlagen"));
    assert_eq!(h.session.state, SessionState::Editing);
    let rejected: Vec<_> = h.session.command_log.rejections().collect();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].command, EditorCommand::Save);
    assert!(matches!(
        rejected[0].outcome,
        CommandOutcome::Rejected(EditError::Persistence(_))
    ));
}

#[test]
fn test_save_writes_selected_path() {
    let dir = std::env::temp_dir().join(format!("freeform_flow_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("Temp-Verzeichnis");
    let path = dir.join("ebene.json");
    let mut h = Harness::new();
    h.menu(MenuOp::Primitives, 0);

    h.send(EditorIntent::SavePathSelected { path: path.clone() });
    h.menu(MenuOp::SaveSrf, 0);

    assert!(path.exists());
    assert!(h.last_message().starts_with("Gespeichert"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_evaluate_at_reports_surface_point() {
    let mut h = Harness::new();
    h.menu(MenuOp::Primitives, 0);

    h.send(EditorIntent::EvaluateAt { u: 0.5, v: 0.5 });

    assert!(h.last_message().starts_with("S(0.5000, 0.5000)"));
}

#[test]
fn test_evaluate_outside_domain_is_rejected() {
    let mut h = Harness::new();
    h.menu(MenuOp::Primitives, 0);

    h.send(EditorIntent::EvaluateAt { u: 2.0, v: 0.5 });

    assert!(h.last_message().contains("außerhalb der Domäne"));
}
