use std::io::{self, Write};
use crossterm::{queue, style::{Color, SetForegroundColor, ResetColor}};

use crate::model::ExecutorSummary;
use crate::poll::ResourceView;
use crate::selectors::spilling_executors;
use super::shared::{format_bytes, format_duration, truncate_str, writeln};

/// GC share of task time above which the column turns amber.
const GC_WARN_PCT: f64 = 10.0;

pub fn render_executors(
    out: &mut impl Write,
    executors: &ResourceView<Vec<ExecutorSummary>>,
) -> io::Result<()> {
    if executors.is_loading {
        return writeln(out, "  Loading executors...");
    }
    if executors.is_error && executors.data.is_none() {
        return writeln(out, "  Error loading executors");
    }
    let Some(data) = executors.data.as_ref() else {
        return writeln(out, "  No executor data");
    };
    if data.is_empty() {
        return writeln(out, "  No active Spark session");
    }

    let spilling = spilling_executors(data);
    if !spilling.is_empty() {
        queue!(io::stdout(), SetForegroundColor(Color::Yellow))?;
        writeln(out, &format!("  ⚠ Disk spill detected on executor(s): {}", spilling.join(", ")))?;
        queue!(io::stdout(), ResetColor)?;
    }

    queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "    {:<6} {:<20} {:<14} {:<20} {:<10} {:<20} {}\r\n",
        "ID", "HOST", "TASKS", "MEMORY", "DISK", "SHUFFLE R/W", "GC")?;
    queue!(io::stdout(), ResetColor)?;

    for exec in data {
        let gc_pct = if exec.total_duration > 0 {
            (exec.total_gc_time as f64 / exec.total_duration as f64) * 100.0
        } else {
            0.0
        };

        write!(out, "    {:<6} {:<20} {:<14} {:<20} ",
            truncate_str(&exec.id, 6),
            truncate_str(&exec.host_port, 18),
            format!("{} act / {} done", exec.active_tasks, exec.completed_tasks),
            format!("{} / {}", format_bytes(exec.memory_used), format_bytes(exec.max_memory)),
        )?;

        if exec.disk_used > 0 {
            queue!(io::stdout(), SetForegroundColor(Color::Red))?;
        }
        write!(out, "{:<10} ", format_bytes(exec.disk_used))?;
        queue!(io::stdout(), ResetColor)?;

        write!(out, "{:<20} ",
            format!("{} / {}", format_bytes(exec.total_shuffle_read), format_bytes(exec.total_shuffle_write)))?;

        if gc_pct > GC_WARN_PCT {
            queue!(io::stdout(), SetForegroundColor(Color::Yellow))?;
        }
        write!(out, "{}", format_duration(exec.total_gc_time))?;
        queue!(io::stdout(), ResetColor)?;
        write!(out, "\r\n")?;

        if exec.failed_tasks > 0 {
            queue!(io::stdout(), SetForegroundColor(Color::Red))?;
            writeln(out, &format!("      {} failed task(s)", exec.failed_tasks))?;
            queue!(io::stdout(), ResetColor)?;
        }
    }

    if executors.is_error {
        queue!(io::stdout(), SetForegroundColor(Color::Yellow))?;
        writeln(out, "  (stale, executor refresh failing)")?;
        queue!(io::stdout(), ResetColor)?;
    }
    Ok(())
}
