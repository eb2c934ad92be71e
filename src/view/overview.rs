use std::io::{self, Write};
use crossterm::{queue, style::{Color, SetForegroundColor, ResetColor}};

use crate::actions::ActionSnapshot;
use crate::model::{ClusterStatus, DeploymentStatus, MasterSummary};
use crate::poll::ResourceView;
use crate::selectors::{ClusterPhase, cluster_phase};
use super::shared::{format_bytes, progress_bar, utilization_color, writeln};

const BAR_WIDTH: usize = 24;

/// Spark master memory figures are MB.
fn mb(megabytes: u64) -> u64 {
    megabytes * 1024 * 1024
}

pub fn render_overview(
    out: &mut impl Write,
    status: &ResourceView<ClusterStatus>,
    cluster: &ResourceView<MasterSummary>,
    actions: &ActionSnapshot,
) -> io::Result<()> {
    render_deployments(out, status)?;
    render_controls(out, status, actions)?;
    writeln(out, "")?;
    render_resources(out, cluster)
}

fn render_deployments(out: &mut impl Write, status: &ResourceView<ClusterStatus>) -> io::Result<()> {
    let Some(data) = status.data.as_ref() else {
        let text = if status.is_error {
            "  Cluster status unavailable"
        } else {
            "  Loading cluster status..."
        };
        return writeln(out, text);
    };

    render_deployment_row(out, "master", &data.master)?;
    render_deployment_row(out, "workers", &data.workers)?;

    if !data.master_ui_url.is_empty() {
        queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
        writeln(out, &format!("  UI: {}", data.master_ui_url))?;
        queue!(io::stdout(), ResetColor)?;
    }
    if let Some(err) = &data.error {
        queue!(io::stdout(), SetForegroundColor(Color::Red))?;
        writeln(out, &format!("  ⚠ {}", err))?;
        queue!(io::stdout(), ResetColor)?;
    }
    if status.is_error {
        queue!(io::stdout(), SetForegroundColor(Color::Yellow))?;
        writeln(out, "  (showing last known state, refresh failing)")?;
        queue!(io::stdout(), ResetColor)?;
    }
    Ok(())
}

fn render_deployment_row(out: &mut impl Write, name: &str, dep: &DeploymentStatus) -> io::Result<()> {
    let (marker, color) = if !dep.exists {
        ("○", Color::DarkGrey)
    } else if dep.is_ready {
        ("●", Color::Green)
    } else {
        ("●", Color::Yellow)
    };
    let detail = if dep.exists {
        format!("{}/{} ready", dep.ready_replicas, dep.replicas)
    } else {
        "not deployed".to_string()
    };

    write!(out, "  ")?;
    queue!(io::stdout(), SetForegroundColor(color))?;
    write!(out, "{}", marker)?;
    queue!(io::stdout(), ResetColor)?;
    write!(out, " {:<8} {}", name, detail)?;
    if let Some(err) = &dep.error {
        queue!(io::stdout(), SetForegroundColor(Color::Red))?;
        write!(out, "  {}", err)?;
        queue!(io::stdout(), ResetColor)?;
    }
    write!(out, "\r\n")
}

fn render_controls(
    out: &mut impl Write,
    status: &ResourceView<ClusterStatus>,
    actions: &ActionSnapshot,
) -> io::Result<()> {
    let hint = if actions.start.is_pending() {
        "Starting..."
    } else if actions.stop.is_pending() {
        "Stopping..."
    } else {
        match cluster_phase(status.data.as_ref()) {
            ClusterPhase::NoCluster => "s: Start Cluster",
            ClusterPhase::Starting => "Starting...",
            ClusterPhase::Ready => "x: Stop | r: Restart",
            ClusterPhase::Error | ClusterPhase::Unknown => "",
        }
    };

    if !hint.is_empty() {
        queue!(io::stdout(), SetForegroundColor(Color::Cyan))?;
        writeln(out, &format!("  {}", hint))?;
        queue!(io::stdout(), ResetColor)?;
    }

    if let Some(err) = actions.error() {
        queue!(io::stdout(), SetForegroundColor(Color::Red))?;
        writeln(out, &format!("  ⚠ {}", err))?;
        queue!(io::stdout(), ResetColor)?;
    }
    Ok(())
}

fn render_resources(out: &mut impl Write, cluster: &ResourceView<MasterSummary>) -> io::Result<()> {
    let Some(data) = cluster.data.as_ref() else {
        let text = if cluster.is_error {
            "  Unable to reach Spark Master"
        } else if cluster.enabled {
            "  Loading cluster info..."
        } else {
            "  (paused while hidden)"
        };
        return writeln(out, text);
    };

    writeln(out, &format!("  Workers alive: {}", data.alive_workers))?;
    render_bar(
        out,
        "Cores",
        data.cores_used as f64,
        data.cores as f64,
        &format!("{}/{}", data.cores_used, data.cores),
    )?;
    render_bar(
        out,
        "Memory",
        data.memory_used as f64,
        data.memory as f64,
        &format!("{} / {}", format_bytes(mb(data.memory_used)), format_bytes(mb(data.memory))),
    )?;

    if cluster.is_error {
        queue!(io::stdout(), SetForegroundColor(Color::Yellow))?;
        writeln(out, "  (stale, master refresh failing)")?;
        queue!(io::stdout(), ResetColor)?;
    }
    Ok(())
}

fn render_bar(out: &mut impl Write, label: &str, used: f64, total: f64, value: &str) -> io::Result<()> {
    let pct = if total > 0.0 { (used / total) * 100.0 } else { 0.0 };
    let bar = progress_bar(pct, BAR_WIDTH);

    write!(out, "  {:<7} ", label)?;
    queue!(io::stdout(), SetForegroundColor(utilization_color(pct)))?;
    write!(out, "{}", bar)?;
    queue!(io::stdout(), ResetColor)?;
    write!(out, " {} ({:.0}%)\r\n", value, pct)
}

pub fn render_workers(out: &mut impl Write, cluster: &ResourceView<MasterSummary>) -> io::Result<()> {
    let Some(data) = cluster.data.as_ref() else {
        return writeln(out, "  No worker data yet");
    };
    if data.workers.is_empty() {
        return writeln(out, "  No registered workers");
    }

    queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "    {:<24} {:<8} {:<12} {:<22} {}\r\n",
        "HOST", "STATE", "CORES", "MEMORY", "ID")?;
    queue!(io::stdout(), ResetColor)?;

    for worker in &data.workers {
        let line = format!("    {:<24} {:<8} {:<12} {:<22} {}",
            super::shared::truncate_str(&format!("{}:{}", worker.host, worker.port), 22),
            worker.state,
            format!("{}/{}", worker.cores_used, worker.cores),
            format!("{} / {}", format_bytes(mb(worker.memory_used)), format_bytes(mb(worker.memory))),
            super::shared::truncate_str(&worker.id, 28),
        );
        if worker.state != "ALIVE" {
            queue!(io::stdout(), SetForegroundColor(Color::Red))?;
        }
        writeln(out, &line)?;
        queue!(io::stdout(), ResetColor)?;
    }
    Ok(())
}
