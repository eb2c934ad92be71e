use std::io;

use chrono::Local;
use crossterm::{cursor::MoveTo, execute, terminal::{Clear, ClearType}};

use crate::api::SparkApi;
use crate::view::Presenter;

use super::App;

pub fn render<A: SparkApi + 'static>(app: &mut App<A>) -> io::Result<()> {
    // Clone out of the cache up front so no lock is held during terminal I/O.
    let snapshot = app.cache.lock().unwrap().snapshot();
    let actions = app.actions.snapshot();
    let time = Local::now().format("%H:%M:%S").to_string();

    let mut out = io::stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    if app.hidden {
        Presenter::render_ambient(&snapshot, &time)?;
    } else {
        Presenter::render_dashboard(
            &snapshot,
            &actions,
            &app.layout,
            &mut app.ui_state,
            &app.status_message,
            &time,
        )?;
        if let Some(ref pending) = app.pending_action {
            Presenter::render_confirmation(&pending.prompt)?;
        }
    }
    Ok(())
}
