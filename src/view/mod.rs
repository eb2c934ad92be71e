mod shared;
mod status_bar;
mod overview;
mod executors;
mod stages;
mod apps;
mod confirmation;

use std::io::{self, Write};
use crossterm::{cursor::MoveTo, queue, style::{Color, SetForegroundColor, ResetColor, SetAttribute, Attribute, Print}, terminal};

use crate::actions::ActionSnapshot;
use crate::layout::{Layout, SectionId};
use crate::model::UiState;
use crate::poll::MonitorSnapshot;

pub use shared::{format_bytes, format_duration, progress_bar, truncate_str};
pub use status_bar::{DotColor, derive_status};

pub struct Presenter;

impl Presenter {
    /// One-line ambient view while the dashboard is hidden.
    pub fn render_ambient(snapshot: &MonitorSnapshot, time: &str) -> io::Result<()> {
        let mut out = io::stdout();
        status_bar::render_ambient(&mut out, &snapshot.status, time)?;
        out.flush()
    }

    /// Full dashboard: header, collapsible sections, footer.
    pub fn render_dashboard(
        snapshot: &MonitorSnapshot,
        actions: &ActionSnapshot,
        layout: &Layout,
        ui_state: &mut UiState,
        status_message: &Option<String>,
        time: &str,
    ) -> io::Result<()> {
        let mut out = io::stdout();

        render_header(&mut out, snapshot, actions, time)?;

        let mut current_row: usize = 0;
        for section in &layout.sections {
            let indicator = if section.collapsed { "▶" } else { "▼" };
            let header = format!("{} --- {} ---", indicator, section.title);
            shared::write_section_header(&mut out, &header, current_row == ui_state.selected_index)?;
            current_row += 1;

            if section.collapsed {
                continue;
            }

            match section.id {
                SectionId::ClusterOverview => {
                    overview::render_overview(&mut out, &snapshot.status, &snapshot.cluster, actions)?;
                }
                SectionId::Workers => overview::render_workers(&mut out, &snapshot.cluster)?,
                SectionId::Executors => executors::render_executors(&mut out, &snapshot.executors)?,
                SectionId::ActiveStages => stages::render_active_stages(&mut out, &snapshot.stages)?,
                SectionId::RecentStages => stages::render_recent_stages(&mut out, &snapshot.stages)?,
                SectionId::Applications => apps::render_applications(&mut out, &snapshot.cluster)?,
            }
            shared::writeln(&mut out, "")?;
        }
        ui_state.total_rows = current_row;

        if let Some(msg) = status_message {
            queue!(io::stdout(), SetForegroundColor(Color::Yellow))?;
            shared::writeln(&mut out, &format!("  {}", msg))?;
            queue!(io::stdout(), ResetColor)?;
        }

        let size = terminal::size()?;
        let help = "q: Quit | h: Hide | ↑/↓: Navigate | →/←: Expand/Collapse | s: Start | x: Stop | r: Restart";
        let help_y = size.1.saturating_sub(1);
        queue!(
            out,
            MoveTo(1, help_y),
            SetForegroundColor(Color::DarkGrey),
            Print(format!("{:<width$}", help, width = size.0 as usize)),
            ResetColor
        )?;

        out.flush()
    }

    pub fn render_confirmation(prompt: &str) -> io::Result<()> {
        confirmation::render_confirmation(prompt)
    }
}

fn render_header(
    out: &mut impl Write,
    snapshot: &MonitorSnapshot,
    actions: &ActionSnapshot,
    time: &str,
) -> io::Result<()> {
    let (label, _) = status_bar::derive_status(&snapshot.status);

    queue!(io::stdout(), SetAttribute(Attribute::Bold))?;
    write!(out, "  {}", label)?;
    queue!(io::stdout(), SetAttribute(Attribute::Reset))?;
    if actions.is_mutating() {
        queue!(io::stdout(), SetForegroundColor(Color::Cyan))?;
        write!(out, "  [mutation pending]")?;
        queue!(io::stdout(), ResetColor)?;
    }

    // Right-align the time
    let size = terminal::size()?;
    let time_str = format!("sparkmon - {} ", time);
    let col = (size.0 as usize).saturating_sub(time_str.len());
    queue!(io::stdout(), MoveTo(col as u16, 0))?;
    queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "{}", time_str)?;
    queue!(io::stdout(), ResetColor)?;
    write!(out, "\r\n")?;

    let sep: String = "─".repeat(size.0 as usize);
    queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "{}\r\n", sep)?;
    queue!(io::stdout(), ResetColor)?;
    Ok(())
}
