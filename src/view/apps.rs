use std::io::{self, Write};
use crossterm::{queue, style::{Color, SetForegroundColor, ResetColor}};

use chrono::DateTime;

use crate::model::{AppInfo, MasterSummary};
use crate::poll::ResourceView;
use super::shared::{format_duration, truncate_str, writeln};

/// Active and completed Spark applications from the master summary.
pub fn render_applications(
    out: &mut impl Write,
    cluster: &ResourceView<MasterSummary>,
) -> io::Result<()> {
    let Some(data) = cluster.data.as_ref() else {
        return writeln(out, "  No application data yet");
    };
    if data.active_apps.is_empty() && data.completed_apps.is_empty() {
        return writeln(out, "  No applications");
    }

    queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "    {:<28} {:<10} {:<8} {:<10} {}\r\n",
        "NAME", "STATE", "CORES", "STARTED", "DURATION")?;
    queue!(io::stdout(), ResetColor)?;

    for app in &data.active_apps {
        render_app_row(out, app, true)?;
    }
    for app in &data.completed_apps {
        render_app_row(out, app, false)?;
    }
    Ok(())
}

fn render_app_row(out: &mut impl Write, app: &AppInfo, active: bool) -> io::Result<()> {
    let started = DateTime::from_timestamp_millis(app.start_time)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let line = format!("    {:<28} {:<10} {:<8} {:<10} {}",
        truncate_str(&app.name, 26),
        app.state,
        app.cores,
        started,
        format_duration(app.duration.max(0) as u64),
    );
    if active {
        queue!(io::stdout(), SetForegroundColor(Color::Green))?;
    } else {
        queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
    }
    writeln(out, &line)?;
    queue!(io::stdout(), ResetColor)?;
    Ok(())
}
