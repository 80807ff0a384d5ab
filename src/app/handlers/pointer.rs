//! Handler für Mausereignisse, Pick-Modi, Ziehgesten und Ansicht.

use super::refine;
use crate::app::state::{DragState, DragTarget, PointerMode};
use crate::app::{EditSession, HostBridge};
use crate::core::{
    find_closest_control_point, find_closest_parameter, modify, Axis, EditError, PickResult,
    PickView,
};
use glam::DVec2;

/// Bereitet den nächsten Klick für eine Pick-Operation vor.
pub fn arm(session: &mut EditSession, host: &mut HostBridge<'_>, mode: PointerMode) {
    session.pointer = mode;
    session.drag = None;
    let hint = match mode {
        PointerMode::Idle => None,
        PointerMode::MoveControlPoints => Some("Kontrollpunkt ziehen"),
        PointerMode::ModifySurface => Some("Fläche ziehen"),
        PointerMode::Refine => Some("Stelle für neuen Knoten wählen"),
        PointerMode::Subdivide { .. } => Some("Unterteilungsstelle wählen"),
        PointerMode::Region { .. } => Some("Ersten Randpunkt des Teilbereichs wählen"),
        PointerMode::Evaluate => Some("Auswertungsstelle wählen"),
    };
    if let Some(hint) = hint {
        host.callbacks.place_message(hint);
    }
    log::debug!("Zeigermodus: {:?}", mode);
}

/// Maustaste gedrückt: Pick auflösen und je nach Modus ausführen.
pub fn pointer_down(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    screen: DVec2,
) -> Result<(), EditError> {
    if !session.is_editing() {
        log::debug!("Mausklick außerhalb von Editing ignoriert");
        return Ok(());
    }
    let Some(ray) = session.view.ray(screen) else {
        log::debug!("Pick: entartete Kamera");
        return Ok(());
    };

    if session.pointer == PointerMode::MoveControlPoints {
        let geometry = session.current()?;
        let Some(hit) = find_closest_control_point(geometry, ray.origin, ray.direction) else {
            host.callbacks.place_message("Kein Kontrollpunkt getroffen");
            return Ok(());
        };
        let start = geometry
            .control_point(hit.index)
            .ok_or_else(|| EditError::precondition("Kontrollpunkt-Index ungültig"))?;
        let (u, v) = geometry.node_params(hit.index);
        let start_geometry = geometry.try_clone()?;
        session.last_pick = Some(PickResult {
            u,
            v,
            axis: Axis::U,
            control_index: Some(hit.index),
            rational: hit.rational,
        });
        begin_drag(
            session,
            DragState {
                start_screen: screen,
                start_geometry,
                target: DragTarget::ControlPoint {
                    index: hit.index,
                    start,
                },
                recorded: false,
            },
        );
        log::debug!("Kontrollpunkt {} gegriffen", hit.index);
        return Ok(());
    }

    let pick = {
        let geometry = session.current()?;
        let Some(hit) = find_closest_parameter(
            geometry,
            ray.origin,
            ray.direction,
            session.options.pick_grid_samples,
            session.options.pick_newton_iterations,
        ) else {
            host.callbacks.place_message("Nichts getroffen");
            return Ok(());
        };
        let control = find_closest_control_point(geometry, ray.origin, ray.direction);
        PickResult::from_hits(&hit, control.as_ref(), geometry.is_rational())
    };
    session.last_pick = Some(pick);

    let mode = session.pointer;
    if !mode.is_persistent() {
        session.pointer = PointerMode::Idle;
    }
    match mode {
        PointerMode::Idle => {
            log::debug!("Pick bei ({:.4}, {:.4}), Richtung {:?}", pick.u, pick.v, pick.axis);
            Ok(())
        }
        PointerMode::ModifySurface => {
            let start_geometry = session.current()?.try_clone()?;
            begin_drag(
                session,
                DragState {
                    start_screen: screen,
                    start_geometry,
                    target: DragTarget::Surface {
                        u: pick.u,
                        v: pick.v,
                    },
                    recorded: false,
                },
            );
            Ok(())
        }
        PointerMode::Refine => refine::refine_at(session, host, &pick),
        PointerMode::Subdivide { continuity } => {
            refine::subdivide_at(session, host, &pick, continuity)
        }
        PointerMode::Region { first: None } => {
            session.pointer = PointerMode::Region { first: Some(pick) };
            host.callbacks
                .place_message("Zweiten Randpunkt des Teilbereichs wählen");
            Ok(())
        }
        PointerMode::Region { first: Some(first) } => {
            refine::extract_region(session, host, &first, &pick)
        }
        PointerMode::Evaluate => refine::evaluate_at(session, host, pick.u, pick.v),
        PointerMode::MoveControlPoints => Ok(()),
    }
}

/// Mausbewegung: laufende Ziehgeste relativ zur Startgeometrie fortsetzen.
pub fn pointer_motion(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    screen: DVec2,
) -> Result<(), EditError> {
    let Some(drag) = session.drag.as_mut() else {
        return Ok(());
    };
    let offset = screen - drag.start_screen;
    if !drag.recorded {
        if offset == DVec2::ZERO {
            return Ok(());
        }
        drag.recorded = true;
        // Ein Verlaufs-Frame für die ganze Geste
        if let Err(err) = session.push_current() {
            session.drag = None;
            return Err(err);
        }
    }
    let Some(drag) = session.drag.as_ref() else {
        return Ok(());
    };
    let delta = session.view.screen_delta_to_world(offset);
    let next = match drag.target {
        DragTarget::ControlPoint { index, start } => {
            let mut moved = drag.start_geometry.try_clone()?;
            if !moved.set_control_point(index, start + delta) {
                return Err(EditError::precondition("Kontrollpunkt-Index ungültig"));
            }
            moved
        }
        DragTarget::Surface { u, v } => modify(
            &drag.start_geometry,
            &session.multires,
            session.multires.u_level,
            session.multires.v_level,
            u,
            v,
            delta,
        )?,
    };
    let normal_reversed = session.normal_reversed;
    session.set_live(next, normal_reversed);
    host.callbacks.request_redraw();
    Ok(())
}

/// Maustaste losgelassen: letzte Position übernehmen und Ziehgeste beenden.
pub fn pointer_up(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    screen: DVec2,
) -> Result<(), EditError> {
    if session.drag.is_none() {
        return Ok(());
    }
    let result = pointer_motion(session, host, screen);
    session.drag = None;
    log::info!("Ziehgeste beendet");
    result
}

/// Multiresolution-Schieberegler setzen (auf [0, 1] geklemmt).
pub fn set_level(session: &mut EditSession, axis: Axis, level: f64) {
    session.multires.set_level(axis, level);
    log::debug!("Multiresolution {:?}: {:.3}", axis, session.multires.level(axis));
}

pub fn set_view(session: &mut EditSession, view: PickView) {
    session.view = view;
}

/// Ziehen relativ zum Start; der Verlaufs-Frame folgt mit der ersten Bewegung.
fn begin_drag(session: &mut EditSession, drag: DragState) {
    session.drag = Some(drag);
}
