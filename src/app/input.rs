use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::SparkApi;

use super::{App, PendingAction, PendingActionKind};

pub enum InputResult {
    Exit,
    Render,
    Ignored,
}

pub fn handle_key<A: SparkApi + 'static>(app: &mut App<A>, key: KeyEvent) -> InputResult {
    let KeyEvent { code, modifiers, .. } = key;

    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return InputResult::Exit;
    }

    // Confirmation prompt swallows the next key press.
    if let Some(pending) = app.pending_action.take() {
        if code == KeyCode::Char('y') {
            dispatch_action(app, pending.kind);
        } else {
            app.status_message = Some("Cancelled".to_string());
        }
        return InputResult::Render;
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => InputResult::Exit,
        KeyCode::Char('h') => {
            app.toggle_hidden();
            InputResult::Render
        }
        KeyCode::Up => {
            if app.ui_state.selected_index > 0 {
                app.ui_state.selected_index -= 1;
                return InputResult::Render;
            }
            InputResult::Ignored
        }
        KeyCode::Down => {
            if app.ui_state.selected_index + 1 < app.ui_state.total_rows {
                app.ui_state.selected_index += 1;
                return InputResult::Render;
            }
            InputResult::Ignored
        }
        KeyCode::Right | KeyCode::Enter => {
            toggle_selected_section(app, false)
        }
        KeyCode::Left => {
            toggle_selected_section(app, true)
        }
        KeyCode::Char('s') => {
            app.status_message = None;
            dispatch_action(app, PendingActionKind::StartCluster);
            InputResult::Render
        }
        KeyCode::Char('x') => {
            app.pending_action = Some(PendingAction::new(
                "Stop the Spark cluster?",
                PendingActionKind::StopCluster,
            ));
            InputResult::Render
        }
        KeyCode::Char('r') => {
            app.pending_action = Some(PendingAction::new(
                "Restart the Spark cluster (stop, then start)?",
                PendingActionKind::RestartCluster,
            ));
            InputResult::Render
        }
        _ => InputResult::Ignored,
    }
}

/// Collapse (`true`) or expand (`false`) the currently selected section.
fn toggle_selected_section<A: SparkApi + 'static>(app: &mut App<A>, collapse: bool) -> InputResult {
    let Some(section) = app.layout.sections.get(app.ui_state.selected_index) else {
        return InputResult::Ignored;
    };
    let id = section.id;
    if app.layout.is_collapsed(id) != collapse {
        app.layout.toggle_section(id);
        return InputResult::Render;
    }
    InputResult::Ignored
}

/// Hand a mutation to the runtime. Duplicate triggers are refused up front
/// so the user gets feedback instead of a silent drop.
fn dispatch_action<A: SparkApi + 'static>(app: &mut App<A>, kind: PendingActionKind) {
    if app.actions.is_mutating() {
        app.status_message = Some("A cluster action is already in progress...".to_string());
        return;
    }

    app.status_message = Some(
        match kind {
            PendingActionKind::StartCluster => "Starting cluster...",
            PendingActionKind::StopCluster => "Stopping cluster...",
            PendingActionKind::RestartCluster => "Restarting cluster...",
        }
        .to_string(),
    );

    let actions = Arc::clone(&app.actions);
    app.runtime().spawn(async move {
        match kind {
            PendingActionKind::StartCluster => actions.start(None).await,
            PendingActionKind::StopCluster => actions.stop().await,
            PendingActionKind::RestartCluster => actions.restart(None).await,
        }
    });
}
