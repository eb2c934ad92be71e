use std::io::{self, Write};
use crossterm::{queue, style::{Color, SetForegroundColor, ResetColor}};

use crate::model::{StageStatus, StageSummary};
use crate::poll::ResourceView;
use crate::selectors::partition_stages;
use super::shared::{format_bytes, format_duration, progress_bar, truncate_str, writeln};

const BAR_WIDTH: usize = 20;

pub fn render_active_stages(
    out: &mut impl Write,
    stages: &ResourceView<Vec<StageSummary>>,
) -> io::Result<()> {
    if stages.is_loading {
        return writeln(out, "  Loading stages...");
    }
    if stages.is_error && stages.data.is_none() {
        return writeln(out, "  Error loading stages");
    }
    let Some(data) = stages.data.as_ref() else {
        return writeln(out, "  No stage data");
    };

    let active = partition_stages(data).active;
    if active.is_empty() {
        return writeln(out, "  No active stages");
    }

    for stage in active {
        let pct = if stage.num_tasks > 0 {
            (stage.num_complete_tasks as f64 / stage.num_tasks as f64) * 100.0
        } else {
            0.0
        };
        write!(out, "  {:<44} ", truncate_str(&stage.name, 42))?;
        queue!(io::stdout(), SetForegroundColor(Color::Green))?;
        write!(out, "{}", progress_bar(pct, BAR_WIDTH))?;
        queue!(io::stdout(), ResetColor)?;
        write!(out, " {}/{}\r\n", stage.num_complete_tasks, stage.num_tasks)?;

        queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
        writeln(out, &format!(
            "    In: {} | Out: {} | Shuffle: {}/{}",
            format_bytes(stage.input_bytes),
            format_bytes(stage.output_bytes),
            format_bytes(stage.shuffle_read_bytes),
            format_bytes(stage.shuffle_write_bytes),
        ))?;
        queue!(io::stdout(), ResetColor)?;
    }
    Ok(())
}

/// Completed and failed stages, newest first (capped upstream at 20).
pub fn render_recent_stages(
    out: &mut impl Write,
    stages: &ResourceView<Vec<StageSummary>>,
) -> io::Result<()> {
    let Some(data) = stages.data.as_ref() else {
        return writeln(out, "  No stage data");
    };

    let recent = partition_stages(data).recent;
    if recent.is_empty() {
        return writeln(out, "  No completed stages");
    }

    for stage in recent {
        let succeeded = stage.status == StageStatus::Complete;
        let (marker, color) = if succeeded {
            ("✓", Color::Green)
        } else {
            ("✗", Color::Red)
        };

        write!(out, "  ")?;
        queue!(io::stdout(), SetForegroundColor(color))?;
        write!(out, "{}", marker)?;
        queue!(io::stdout(), ResetColor)?;
        write!(out, " {:<50} {:>10}", truncate_str(&stage.name, 48), format_duration(stage.executor_run_time))?;
        if stage.num_failed_tasks > 0 {
            queue!(io::stdout(), SetForegroundColor(Color::Red))?;
            write!(out, "  {} failed", stage.num_failed_tasks)?;
            queue!(io::stdout(), ResetColor)?;
        }
        if stage.disk_bytes_spilled > 0 {
            queue!(io::stdout(), SetForegroundColor(Color::Yellow))?;
            write!(out, "  spill {}", format_bytes(stage.disk_bytes_spilled))?;
            queue!(io::stdout(), ResetColor)?;
        }
        write!(out, "\r\n")?;
    }
    Ok(())
}
