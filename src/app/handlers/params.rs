//! Handler für Änderungen am Parametersatz.
//!
//! Außerhalb von Editing wird nur der Parametersatz für die nächste
//! Startform gesetzt. In Editing wird die Geometrie umgebaut (rückgängig machbar).

use crate::app::{EditSession, HostBridge};
use crate::core::refine::{refit_axis, to_bezier};
use crate::core::{degree_raise, Axis, EditError, EditableGeometry, EndCondition, GeomType, ParamType};

/// Setzt die Ordnung; in Editing per DegreeRaise (erhöhen) oder Neuaufbau (verringern).
pub fn set_order(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    axis: Axis,
    order: usize,
) -> Result<(), EditError> {
    if !session.is_editing() {
        if !session.params.set_order(axis, order) {
            return Err(EditError::precondition("Ordnung muss mindestens 1 sein"));
        }
        return Ok(());
    }
    let geometry = session.current()?;
    let spline = geometry.require_axis(axis)?;
    let current = spline.order;
    if order == current {
        log::debug!("Ordnung {:?} unverändert ({})", axis, order);
        return Ok(());
    }
    let next = if order > current {
        let mut raised = degree_raise(geometry, axis)?;
        for _ in current + 1..order {
            raised = degree_raise(&raised, axis)?;
        }
        raised
    } else {
        refit_axis(geometry, axis, order, spline.end, spline.param)?
    };
    commit(session, host, next)?;
    log::info!("Ordnung {:?}: {} → {}", axis, current, order);
    Ok(())
}

/// Setzt die Endbedingung einer Richtung (Neuaufbau der Knoten).
pub fn set_end_condition(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    axis: Axis,
    end: EndCondition,
) -> Result<(), EditError> {
    if !session.is_editing() {
        session.params.set_end_condition(axis, end);
        return Ok(());
    }
    let geometry = session.current()?;
    let spline = geometry.require_axis(axis)?;
    if spline.end == end {
        return Ok(());
    }
    let next = refit_axis(geometry, axis, spline.order, end, spline.param)?;
    commit(session, host, next)?;
    log::info!("Endbedingung {:?}: {:?}", axis, end);
    Ok(())
}

/// Setzt die Parametrisierung einer Richtung (Neuaufbau der Knoten).
pub fn set_param_type(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    axis: Axis,
    param: ParamType,
) -> Result<(), EditError> {
    if !session.is_editing() {
        session.params.set_param_type(axis, param);
        return Ok(());
    }
    let geometry = session.current()?;
    let spline = geometry.require_axis(axis)?;
    if spline.param == param {
        return Ok(());
    }
    let next = refit_axis(geometry, axis, spline.order, spline.end, param)?;
    commit(session, host, next)?;
    log::info!("Parametrisierung {:?}: {:?}", axis, param);
    Ok(())
}

/// Schaltet Rationalität um (homogenisiert bzw. de-homogenisiert alle Punkte).
pub fn set_rational(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    rational: bool,
) -> Result<(), EditError> {
    if !session.is_editing() {
        session.params.rational = rational;
        return Ok(());
    }
    let geometry = session.current()?;
    if geometry.is_rational() == rational {
        return Ok(());
    }
    let mut next = geometry.try_clone()?;
    next.set_rational(rational);
    commit(session, host, next)?;
    log::info!("Rational: {}", rational);
    Ok(())
}

/// Bezier erzwingt Ordnung = Punktanzahl und offene Enden; Bspline setzt nur den Typ.
pub fn set_geom_type(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    geom_type: GeomType,
) -> Result<(), EditError> {
    if !session.is_editing() {
        session.params.geom_type = geom_type;
        return Ok(());
    }
    let geometry = session.current()?;
    if geometry.geom_type() == geom_type {
        return Ok(());
    }
    let next = match geom_type {
        GeomType::Bezier => to_bezier(geometry)?,
        GeomType::Bspline => {
            let mut next = geometry.try_clone()?;
            next.set_geom_type(GeomType::Bspline);
            next
        }
    };
    commit(session, host, next)?;
    log::info!("Geometrietyp: {:?}", geom_type);
    Ok(())
}

fn commit(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    next: EditableGeometry,
) -> Result<(), EditError> {
    session.apply(next)?;
    host.callbacks.request_redraw();
    Ok(())
}
