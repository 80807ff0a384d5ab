//! Handler für Verfeinerung, Unterteilung, Verschmelzen, Umkehren und Auswertung.

use super::session::object_name_at;
use crate::app::state::Binding;
use crate::app::{EditSession, HostBridge};
use crate::core::refine::refine_uniform;
use crate::core::{
    degree_raise, domain_from_srf, merge_srfs, refine_srf, reverse_srf, subdiv_srf, Axis,
    Continuity, EditError, PickResult, ReverseMode, Subdivision,
};
use crate::shared::spline_basis::KNOT_EPSILON;

/// Fügt die Mittelpunkte aller Knotenspannen entlang `axis` ein.
pub fn refine_all(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    axis: Axis,
) -> Result<(), EditError> {
    let next = refine_uniform(session.current()?, axis)?;
    session.apply(next)?;
    host.callbacks.request_redraw();
    log::info!("Gleichmäßig verfeinert in {:?}", axis);
    Ok(())
}

/// Fügt einen Knoten an der Pick-Stelle ein.
pub fn refine_at(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    pick: &PickResult,
) -> Result<(), EditError> {
    let next = refine_srf(session.current()?, &[pick.param()], pick.axis)?;
    session.apply(next)?;
    host.callbacks.request_redraw();
    log::info!("Knoten {:.4} in {:?} eingefügt", pick.param(), pick.axis);
    Ok(())
}

/// Unterteilt an der Pick-Stelle.
///
/// C0: die untere Hälfte bleibt in Bearbeitung, die obere wird als neues
/// Objekt eingefügt. C1: ein Objekt mit Naht.
pub fn subdivide_at(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    pick: &PickResult,
    continuity: Continuity,
) -> Result<(), EditError> {
    let subdivision = subdiv_srf(session.current()?, pick.param(), continuity, pick.axis)?;
    match subdivision {
        Subdivision::Split { low, high } => {
            session.apply(low)?;
            let name = host
                .store
                .insert(&format!("{}-Teil", session.base_name()), high);
            host.callbacks
                .place_message(&format!("Unterteilt; zweite Hälfte als '{name}' eingefügt"));
        }
        Subdivision::Seamed(seamed) => session.apply(seamed)?,
    }
    host.callbacks.request_redraw();
    log::info!(
        "Unterteilt bei {:.4} in {:?} ({:?})",
        pick.param(),
        pick.axis,
        continuity
    );
    Ok(())
}

/// Schneidet den Bereich zwischen zwei Picks entlang der Richtung des ersten heraus.
pub fn extract_region(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    first: &PickResult,
    second: &PickResult,
) -> Result<(), EditError> {
    let axis = first.axis;
    let t2 = match axis {
        Axis::U => second.u,
        Axis::V => second.v,
    };
    let next = domain_from_srf(session.current()?, first.param(), t2, axis)?;
    session.apply(next)?;
    host.callbacks.request_redraw();
    log::info!("Teilbereich [{:.4}, {:.4}] in {:?} herausgeschnitten", first.param(), t2, axis);
    Ok(())
}

pub fn raise_degree(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    axis: Axis,
) -> Result<(), EditError> {
    let next = degree_raise(session.current()?, axis)?;
    session.apply(next)?;
    host.callbacks.request_redraw();
    log::info!("Ordnung in {:?} erhöht", axis);
    Ok(())
}

/// Verschmilzt mit einem Objekt aus dem Speicher; das Objekt selbst bleibt unverändert.
pub fn merge_with(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    index: usize,
) -> Result<(), EditError> {
    let name = object_name_at(&*host.store, index)?;
    if matches!(&session.binding, Some(Binding::Attached { name: bound }) if *bound == name) {
        return Err(EditError::precondition(format!(
            "'{name}' ist bereits in Bearbeitung"
        )));
    }
    let other = host
        .store
        .get(&name)
        .ok_or_else(|| EditError::transition(format!("Objekt '{name}' existiert nicht")))?;
    let next = merge_srfs(session.current()?, other, session.options.merge_tolerance)?;
    session.apply(next)?;
    host.callbacks.request_redraw();
    log::info!("Mit '{}' verschmolzen", name);
    Ok(())
}

/// Kehrt eine Richtung um oder vertauscht U/V; die Normalenrichtung wechselt mit.
pub fn reverse(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    mode: ReverseMode,
) -> Result<(), EditError> {
    let reversal = reverse_srf(session.current()?, mode)?;
    let normal_reversed = session.normal_reversed ^ reversal.flips_normal;
    session.apply_with_normal(reversal.geometry, normal_reversed)?;
    host.callbacks.request_redraw();
    log::info!("Umgekehrt: {:?}", mode);
    Ok(())
}

/// Meldet S(u, v) über PlaceMessage.
pub fn evaluate_at(
    session: &EditSession,
    host: &mut HostBridge<'_>,
    u: f64,
    v: f64,
) -> Result<(), EditError> {
    let geometry = session.current()?;
    let inside = |axis: Axis, t: f64| {
        let (a, b) = geometry.domain(axis);
        t.is_finite() && t >= a - KNOT_EPSILON && t <= b + KNOT_EPSILON
    };
    if !inside(Axis::U, u) || (geometry.is_surface() && !inside(Axis::V, v)) {
        return Err(EditError::precondition(format!(
            "Parameter ({u}, {v}) liegt außerhalb der Domäne"
        )));
    }
    let p = geometry.evaluate(u, v);
    let text = if geometry.is_surface() {
        format!("S({u:.4}, {v:.4}) = ({:.4}, {:.4}, {:.4})", p.x, p.y, p.z)
    } else {
        format!("C({u:.4}) = ({:.4}, {:.4}, {:.4})", p.x, p.y, p.z)
    };
    host.callbacks.place_message(&text);
    Ok(())
}
