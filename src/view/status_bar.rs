use std::io::{self, Write};
use crossterm::{queue, style::{Color, SetForegroundColor, ResetColor, SetAttribute, Attribute}};

use crate::model::ClusterStatus;
use crate::poll::ResourceView;
use super::shared::writeln;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DotColor {
    Green,
    Amber,
    Red,
    Muted,
}

impl DotColor {
    fn terminal_color(self) -> Color {
        match self {
            DotColor::Green => Color::Green,
            DotColor::Amber => Color::Yellow,
            DotColor::Red => Color::Red,
            DotColor::Muted => Color::DarkGrey,
        }
    }
}

/// Ambient indicator text for the current cluster status.
pub fn derive_status(view: &ResourceView<ClusterStatus>) -> (String, DotColor) {
    if view.is_loading {
        return ("Spark: ...".to_string(), DotColor::Muted);
    }
    let Some(data) = view.data.as_ref() else {
        // Covers the error-with-no-data case as well.
        return ("Spark".to_string(), DotColor::Muted);
    };
    if data.error.is_some() {
        return ("Spark: Error".to_string(), DotColor::Red);
    }
    if !data.master.exists {
        return ("Spark: No Cluster".to_string(), DotColor::Muted);
    }
    let ready = data.workers.ready_replicas;
    let total = data.workers.replicas;
    if data.master.is_ready && data.workers.is_ready {
        (format!("Spark: Ready ({ready}/{total})"), DotColor::Green)
    } else {
        (format!("Spark: Starting ({ready}/{total})"), DotColor::Amber)
    }
}

/// One-line ambient view shown while the dashboard is hidden. The status
/// resource keeps polling underneath it regardless of visibility.
pub fn render_ambient(
    out: &mut impl Write,
    status: &ResourceView<ClusterStatus>,
    time: &str,
) -> io::Result<()> {
    let (label, dot) = derive_status(status);

    queue!(io::stdout(), SetForegroundColor(dot.terminal_color()))?;
    write!(out, "  ● ")?;
    queue!(io::stdout(), ResetColor, SetAttribute(Attribute::Bold))?;
    write!(out, "{}", label)?;
    queue!(io::stdout(), SetAttribute(Attribute::Reset))?;
    if status.is_error && status.data.is_some() {
        queue!(io::stdout(), SetForegroundColor(Color::Yellow))?;
        write!(out, "  (stale)")?;
        queue!(io::stdout(), ResetColor)?;
    }
    queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "  —  {}\r\n", time)?;
    queue!(io::stdout(), ResetColor)?;
    writeln(out, "")?;
    queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
    writeln(out, "  h: Show Dashboard | q: Quit")?;
    queue!(io::stdout(), ResetColor)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeploymentStatus;
    use crate::poll::ResourceView;

    fn view(data: Option<ClusterStatus>, is_loading: bool, is_error: bool) -> ResourceView<ClusterStatus> {
        ResourceView {
            data,
            is_loading,
            is_error,
            error: None,
            enabled: true,
        }
    }

    fn ready_status(ready: u32, total: u32, all_ready: bool) -> ClusterStatus {
        ClusterStatus {
            master: DeploymentStatus {
                exists: true,
                is_ready: true,
                ..Default::default()
            },
            workers: DeploymentStatus {
                exists: true,
                is_ready: all_ready,
                ready_replicas: ready,
                replicas: total,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn loading_shows_ellipsis() {
        let (label, dot) = derive_status(&view(None, true, false));
        assert_eq!(label, "Spark: ...");
        assert_eq!(dot, DotColor::Muted);
    }

    #[test]
    fn error_without_data_is_muted() {
        let (label, dot) = derive_status(&view(None, false, true));
        assert_eq!(label, "Spark");
        assert_eq!(dot, DotColor::Muted);
    }

    #[test]
    fn ready_cluster_is_green_with_replica_counts() {
        let (label, dot) = derive_status(&view(Some(ready_status(3, 3, true)), false, false));
        assert_eq!(label, "Spark: Ready (3/3)");
        assert_eq!(dot, DotColor::Green);
    }

    #[test]
    fn starting_cluster_is_amber() {
        let (label, dot) = derive_status(&view(Some(ready_status(1, 3, false)), false, false));
        assert_eq!(label, "Spark: Starting (1/3)");
        assert_eq!(dot, DotColor::Amber);
    }

    #[test]
    fn no_master_means_no_cluster() {
        let (label, dot) = derive_status(&view(Some(ClusterStatus::default()), false, false));
        assert_eq!(label, "Spark: No Cluster");
        assert_eq!(dot, DotColor::Muted);
    }

    #[test]
    fn backend_error_field_is_red() {
        let status = ClusterStatus {
            error: Some("kube probe failed".into()),
            ..Default::default()
        };
        let (label, dot) = derive_status(&view(Some(status), false, false));
        assert_eq!(label, "Spark: Error");
        assert_eq!(dot, DotColor::Red);
    }
}
