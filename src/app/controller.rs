//! Edit-Controller für zentrale Event-Verarbeitung.

use super::command_log::CommandOutcome;
use super::{EditSession, EditorCommand, EditorIntent, HostBridge};
use crate::core::EditError;

/// Orchestriert Host-Events und Handler auf der EditSession.
#[derive(Default)]
pub struct EditController;

impl EditController {
    /// Erstellt einen neuen Controller.
    pub fn new() -> Self {
        Self
    }

    /// Verarbeitet einen Intent über Intent->Command Mapping.
    pub fn handle_intent(
        &mut self,
        session: &mut EditSession,
        host: &mut HostBridge<'_>,
        intent: EditorIntent,
    ) -> anyhow::Result<()> {
        let commands = self.map_intent_to_commands(session, intent);
        for command in commands {
            self.handle_command(session, host, command)?;
        }

        Ok(())
    }

    fn map_intent_to_commands(
        &self,
        session: &EditSession,
        intent: EditorIntent,
    ) -> Vec<EditorCommand> {
        super::intent_mapping::map_intent_to_commands(session, intent)
    }

    /// Führt mutierende Commands auf der EditSession aus.
    /// Dispatcht an Feature-Handler in `handlers/`.
    ///
    /// Abgewiesene Operationen werden per PlaceMessage gemeldet und sind ein
    /// No-op; nur Speichererschöpfung wird an den Host weitergereicht.
    /// Jeder Command landet mit seinem Ausgang im Command-Log.
    pub fn handle_command(
        &mut self,
        session: &mut EditSession,
        host: &mut HostBridge<'_>,
        command: EditorCommand,
    ) -> anyhow::Result<()> {
        use super::handlers;
        let logged = command.clone();

        let result = if command.requires_editing() && !session.is_editing() {
            Err(EditError::transition(format!(
                "{command:?} ist nur im Zustand Editing möglich (aktuell {:?})",
                session.state
            )))
        } else {
            match command {
                // === Sitzung ===
                EditorCommand::EnterState { state } => {
                    handlers::session::enter_state(session, state)
                }
                EditorCommand::SeedPrimitive { kind } => {
                    handlers::session::seed_primitive(session, host, kind)
                }
                EditorCommand::BindObject { index } => {
                    handlers::session::bind_object(session, host, index)
                }
                EditorCommand::Detach { commit } => {
                    handlers::session::detach(session, host, commit)
                }
                EditorCommand::Submit => handlers::session::submit(session, host),
                EditorCommand::Save => handlers::session::save(session, host),
                EditorCommand::SetSavePath { path } => {
                    handlers::session::set_save_path(session, path);
                    Ok(())
                }
                EditorCommand::Rename { name } => {
                    handlers::session::rename(session, name);
                    Ok(())
                }
                EditorCommand::ToggleNormal => {
                    handlers::session::toggle_normal(session, host);
                    Ok(())
                }
                EditorCommand::ToggleMesh => {
                    handlers::session::toggle_mesh(session, host);
                    Ok(())
                }
                EditorCommand::ToggleOriginal => {
                    handlers::session::toggle_original(session, host);
                    Ok(())
                }

                // === Parameter ===
                EditorCommand::SetOrder { axis, order } => {
                    handlers::params::set_order(session, host, axis, order)
                }
                EditorCommand::SetEndCondition { axis, end } => {
                    handlers::params::set_end_condition(session, host, axis, end)
                }
                EditorCommand::SetParamType { axis, param } => {
                    handlers::params::set_param_type(session, host, axis, param)
                }
                EditorCommand::SetRational { rational } => {
                    handlers::params::set_rational(session, host, rational)
                }
                EditorCommand::SetGeomType { geom_type } => {
                    handlers::params::set_geom_type(session, host, geom_type)
                }

                // === Verfeinerung ===
                EditorCommand::RefineUniform { axis } => {
                    handlers::refine::refine_all(session, host, axis)
                }
                EditorCommand::RaiseDegree { axis } => {
                    handlers::refine::raise_degree(session, host, axis)
                }
                EditorCommand::MergeWith { index } => {
                    handlers::refine::merge_with(session, host, index)
                }
                EditorCommand::Reverse { mode } => handlers::refine::reverse(session, host, mode),
                EditorCommand::EvaluateAt { u, v } => {
                    handlers::refine::evaluate_at(session, host, u, v)
                }
                EditorCommand::TrimWith { index, primary } => {
                    handlers::trim::trim_with(session, host, index, primary)
                }

                // === Zeiger & Ansicht ===
                EditorCommand::ArmPointer { mode } => {
                    handlers::pointer::arm(session, host, mode);
                    Ok(())
                }
                EditorCommand::PointerDown { screen } => {
                    handlers::pointer::pointer_down(session, host, screen)
                }
                EditorCommand::PointerMotion { screen } => {
                    handlers::pointer::pointer_motion(session, host, screen)
                }
                EditorCommand::PointerUp { screen } => {
                    handlers::pointer::pointer_up(session, host, screen)
                }
                EditorCommand::SetLevel { axis, level } => {
                    handlers::pointer::set_level(session, axis, level);
                    Ok(())
                }
                EditorCommand::SetView { view } => {
                    handlers::pointer::set_view(session, view);
                    Ok(())
                }

                // === History ===
                EditorCommand::Undo => handlers::history::undo(session, host),
                EditorCommand::Redo => handlers::history::redo(session, host),
                EditorCommand::Clear => handlers::history::clear(session, host),

                EditorCommand::Reject { reason } => Err(EditError::transition(reason)),
            }
        };

        session
            .command_log
            .record(logged, CommandOutcome::from_result(&result));
        if let Err(err) = result {
            log::warn!("{}", err);
            host.callbacks.place_message(&err.to_string());
            if err.is_fatal_for_dispatch() {
                return Err(err.into());
            }
        }
        host.callbacks
            .param_update_widget(&session.params, session.state);
        Ok(())
    }
}
