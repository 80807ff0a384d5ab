//! Handler für Undo/Redo und Clear.

use crate::app::{EditSession, HostBridge};
use crate::core::EditError;

/// Führt einen Undo-Schritt aus, falls vorhanden.
pub fn undo(session: &mut EditSession, host: &mut HostBridge<'_>) -> Result<(), EditError> {
    if !session.history.can_undo() {
        log::debug!("Undo: nichts zu tun");
        return Err(EditError::transition("Nichts rückgängig zu machen"));
    }
    let current = session.capture_entry()?;
    if let Some(prev) = session.history.undo_state(current)? {
        session.drag = None;
        session.set_live(prev.geometry, prev.normal_reversed);
        host.callbacks.request_redraw();
        log::info!("Undo ausgeführt");
    }
    Ok(())
}

/// Führt einen Redo-Schritt aus, falls vorhanden.
pub fn redo(session: &mut EditSession, host: &mut HostBridge<'_>) -> Result<(), EditError> {
    if !session.history.can_redo() {
        log::debug!("Redo: nichts zu tun");
        return Err(EditError::transition("Nichts wiederherzustellen"));
    }
    let current = session.capture_entry()?;
    if let Some(next) = session.history.redo_state(current)? {
        session.drag = None;
        session.set_live(next.geometry, next.normal_reversed);
        host.callbacks.request_redraw();
        log::info!("Redo ausgeführt");
    }
    Ok(())
}

/// Stellt die beim Betreten von Editing gesicherte Geometrie wieder her (rückgängig machbar).
pub fn clear(session: &mut EditSession, host: &mut HostBridge<'_>) -> Result<(), EditError> {
    let original = session
        .original
        .as_ref()
        .ok_or_else(|| EditError::transition("Keine Ausgangsgeometrie vorhanden"))?
        .try_clone()?;
    session.apply_with_normal(original, false)?;
    host.callbacks.request_redraw();
    log::info!("Geometrie auf Ausgangszustand zurückgesetzt");
    Ok(())
}
