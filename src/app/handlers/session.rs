//! Handler für Sitzungsübergänge, Übernahme in den Speicher und Anzeige-Schalter.

use crate::app::state::{Binding, SessionState};
use crate::app::{EditSession, HostBridge, ObjectStore};
use crate::core::primitives::{self, PrimitiveKind};
use crate::core::{EditError, EditableGeometry};
use std::path::PathBuf;

/// Wechselt in Primitives, AttachOld oder CloneOld.
pub fn enter_state(session: &mut EditSession, target: SessionState) -> Result<(), EditError> {
    if session.state == target {
        log::debug!("Zustand {:?} bereits aktiv", target);
        return Ok(());
    }
    if target == SessionState::Editing || !session.state.can_enter(target) {
        return Err(EditError::transition(format!(
            "Wechsel von {:?} nach {:?} nicht möglich",
            session.state, target
        )));
    }
    session.state = target;
    log::info!("Sitzungszustand: {:?}", target);
    Ok(())
}

/// Erzeugt eine Startform und betritt Editing.
pub fn seed_primitive(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    kind: PrimitiveKind,
) -> Result<(), EditError> {
    if session.state != SessionState::Primitives {
        return Err(EditError::transition(format!(
            "Startformen nur im Zustand Primitives (aktuell {:?})",
            session.state
        )));
    }
    let geometry =
        primitives::build(kind, &session.params, session.options.primitive_control_count)?;
    session.begin_editing(
        geometry,
        Binding::Seed {
            label: kind.label().to_string(),
        },
    )?;
    host.callbacks.request_redraw();
    log::info!("Startform {} erzeugt", kind.label());
    Ok(())
}

/// Bindet ein Objekt aus dem Speicher und betritt Editing.
pub fn bind_object(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    index: usize,
) -> Result<(), EditError> {
    let attach = match session.state {
        SessionState::AttachOld => true,
        SessionState::CloneOld => false,
        other => {
            return Err(EditError::transition(format!(
                "Objekte lassen sich nur in AttachOld oder CloneOld binden (aktuell {other:?})"
            )))
        }
    };
    let name = object_name_at(&*host.store, index)?;
    let geometry = host
        .store
        .get(&name)
        .ok_or_else(|| EditError::transition(format!("Objekt '{name}' existiert nicht")))?
        .try_clone()?;
    let binding = if attach {
        Binding::Attached { name: name.clone() }
    } else {
        Binding::Cloned {
            source: name.clone(),
        }
    };
    session.begin_editing(geometry, binding)?;
    host.callbacks.request_redraw();
    log::info!(
        "'{}' {} zum Bearbeiten",
        name,
        if attach { "gebunden" } else { "kopiert" }
    );
    Ok(())
}

/// Verlässt Editing; mit `commit` wird die Geometrie vorher übernommen.
pub fn detach(
    session: &mut EditSession,
    host: &mut HostBridge<'_>,
    commit: bool,
) -> Result<(), EditError> {
    if commit {
        let geometry = session.current()?.try_clone()?;
        let name = commit_to_store(session, host.store, geometry)?;
        host.callbacks.place_message(&format!("'{name}' übernommen"));
    }
    if session.end_editing().is_none() {
        log::debug!("Detach ohne Geometrie");
    }
    session.object_name = None;
    host.callbacks.request_redraw();
    log::info!(
        "Editing verlassen ({})",
        if commit { "übernommen" } else { "verworfen" }
    );
    Ok(())
}

/// Übernimmt die Geometrie in den Speicher, ohne Editing zu verlassen.
///
/// Danach ist die Sitzung an das übernommene Objekt gebunden, weitere
/// Übernahmen ersetzen es.
pub fn submit(session: &mut EditSession, host: &mut HostBridge<'_>) -> Result<(), EditError> {
    let geometry = session.current()?.try_clone()?;
    let name = commit_to_store(session, host.store, geometry)?;
    session.binding = Some(Binding::Attached { name: name.clone() });
    host.callbacks.place_message(&format!("'{name}' übernommen"));
    log::info!("Geometrie als '{}' übernommen", name);
    Ok(())
}

/// Speichert die Geometrie über den externen Serialisierer.
pub fn save(session: &mut EditSession, host: &mut HostBridge<'_>) -> Result<(), EditError> {
    let path = session
        .save_path
        .clone()
        .ok_or_else(|| EditError::Persistence("Kein Speicherpfad gewählt".into()))?;
    host.store.save(session.current()?, &path)?;
    host.callbacks
        .place_message(&format!("Gespeichert: {}", path.display()));
    Ok(())
}

pub fn set_save_path(session: &mut EditSession, path: PathBuf) {
    log::info!("Speicherpfad: {}", path.display());
    session.save_path = Some(path);
}

/// Setzt den Namen für künftig eingefügte Objekte (leer = Standardname).
pub fn rename(session: &mut EditSession, name: String) {
    let trimmed = name.trim();
    session.object_name = if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    };
    log::info!("Objektname: {:?}", session.object_name);
}

/// Kehrt die angezeigte Normalenrichtung um (ohne Verlaufseintrag).
pub fn toggle_normal(session: &mut EditSession, host: &mut HostBridge<'_>) {
    session.normal_reversed = !session.normal_reversed;
    host.callbacks.request_redraw();
    log::info!("Normalenrichtung umgekehrt: {}", session.normal_reversed);
}

pub fn toggle_mesh(session: &mut EditSession, host: &mut HostBridge<'_>) {
    session.display.draw_mesh = !session.display.draw_mesh;
    host.callbacks.request_redraw();
}

pub fn toggle_original(session: &mut EditSession, host: &mut HostBridge<'_>) {
    session.display.draw_original = !session.display.draw_original;
    host.callbacks.request_redraw();
}

/// Name des Objekts mit Index `index` in `ObjectStore::names()`.
pub(crate) fn object_name_at(store: &dyn ObjectStore, index: usize) -> Result<String, EditError> {
    store
        .names()
        .into_iter()
        .nth(index)
        .ok_or_else(|| EditError::transition(format!("Kein Objekt mit Index {index}")))
}

/// Ersetzt das gebundene Objekt (AttachOld) oder fügt ein neues ein.
fn commit_to_store(
    session: &EditSession,
    store: &mut dyn ObjectStore,
    geometry: EditableGeometry,
) -> Result<String, EditError> {
    match &session.binding {
        Some(Binding::Attached { name }) => {
            store.replace(name, geometry)?;
            Ok(name.clone())
        }
        Some(Binding::Seed { .. }) | Some(Binding::Cloned { .. }) => {
            Ok(store.insert(&session.base_name(), geometry))
        }
        None => Err(EditError::transition("Sitzung ist an kein Objekt gebunden")),
    }
}
