//! Handler für Trim-Schleifen.

use super::session::object_name_at;
use crate::app::{EditSession, HostBridge};
use crate::core::{trim_srf, EditError};

/// Hängt die Kurve mit Index `index` aus dem Speicher als Trim-Schleife an.
pub fn trim_with(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    index: usize,
    primary: bool,
) -> Result<(), EditError> {
    let name = object_name_at(&*host.store, index)?;
    let boundary = host
        .store
        .get(&name)
        .ok_or_else(|| EditError::transition(format!("Objekt '{name}' existiert nicht")))?;
    let next = trim_srf(
        session.current()?,
        boundary,
        primary,
        session.options.trim_closure_tolerance,
    )?;
    session.apply(next)?;
    host.callbacks.request_redraw();
    log::info!("'{}' als Trim-Schleife verwendet", name);
    Ok(())
}
