//! Pure selectors over cached payloads.
//!
//! Stateless: recomputed from the current snapshot on every render, never
//! triggering a fetch.

use crate::model::{ClusterStatus, ExecutorSummary, StageStatus, StageSummary};

/// Recent-history cap for completed/failed stages.
pub const RECENT_STAGE_LIMIT: usize = 20;

pub struct StagePartition<'a> {
    /// Stages currently running.
    pub active: Vec<&'a StageSummary>,
    /// Completed or failed stages, newest first, capped at
    /// [`RECENT_STAGE_LIMIT`].
    pub recent: Vec<&'a StageSummary>,
}

/// Split the raw stage list into the two view-relevant subsets.
///
/// Recent stages sort descending by completion time, falling back to
/// submission time. The timestamps are ISO-8601 strings, so plain string
/// comparison orders them correctly.
pub fn partition_stages(stages: &[StageSummary]) -> StagePartition<'_> {
    let active = stages
        .iter()
        .filter(|s| s.status == StageStatus::Active)
        .collect();

    let mut recent: Vec<&StageSummary> = stages
        .iter()
        .filter(|s| matches!(s.status, StageStatus::Complete | StageStatus::Failed))
        .collect();
    recent.sort_by(|a, b| sort_timestamp(b).cmp(sort_timestamp(a)));
    recent.truncate(RECENT_STAGE_LIMIT);

    StagePartition { active, recent }
}

fn sort_timestamp(stage: &StageSummary) -> &str {
    stage
        .completion_time
        .as_deref()
        .or(stage.submission_time.as_deref())
        .unwrap_or("")
}

/// Derived lifecycle state of the cluster, driving the controls and the
/// ambient indicator.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClusterPhase {
    /// No status data yet.
    Unknown,
    /// The backend reported an error probing the deployments.
    Error,
    /// Neither master nor worker deployment exists.
    NoCluster,
    /// Deployments exist but replicas are not all ready.
    Starting,
    Ready,
}

pub fn cluster_phase(status: Option<&ClusterStatus>) -> ClusterPhase {
    let Some(status) = status else {
        return ClusterPhase::Unknown;
    };
    if status.error.is_some() {
        return ClusterPhase::Error;
    }
    if !status.master.exists && !status.workers.exists {
        return ClusterPhase::NoCluster;
    }
    if status.master.is_ready && status.workers.is_ready {
        ClusterPhase::Ready
    } else {
        ClusterPhase::Starting
    }
}

/// Ids of executors that have spilled to disk.
pub fn spilling_executors(executors: &[ExecutorSummary]) -> Vec<&str> {
    executors
        .iter()
        .filter(|e| e.disk_used > 0)
        .map(|e| e.id.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeploymentStatus;

    fn stage(status: StageStatus, completion: Option<&str>, submission: Option<&str>) -> StageSummary {
        StageSummary {
            status,
            completion_time: completion.map(str::to_string),
            submission_time: submission.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn partition_excludes_active_from_recent_and_sorts_newest_first() {
        let stages = vec![
            stage(StageStatus::Active, None, Some("2025-06-01T10:00:00.000GMT")),
            stage(StageStatus::Complete, Some("2025-06-01T10:05:00.000GMT"), None),
            stage(StageStatus::Complete, Some("2025-06-01T10:20:00.000GMT"), None),
            stage(StageStatus::Failed, Some("2025-06-01T10:10:00.000GMT"), None),
        ];

        let partition = partition_stages(&stages);
        assert_eq!(partition.active.len(), 1);
        assert_eq!(partition.recent.len(), 3);
        let times: Vec<_> = partition
            .recent
            .iter()
            .map(|s| s.completion_time.as_deref().unwrap())
            .collect();
        assert_eq!(
            times,
            vec![
                "2025-06-01T10:20:00.000GMT",
                "2025-06-01T10:10:00.000GMT",
                "2025-06-01T10:05:00.000GMT",
            ]
        );
    }

    #[test]
    fn recent_falls_back_to_submission_time() {
        let stages = vec![
            stage(StageStatus::Complete, None, Some("2025-06-01T09:00:00.000GMT")),
            stage(StageStatus::Complete, Some("2025-06-01T09:30:00.000GMT"), None),
        ];
        let partition = partition_stages(&stages);
        assert_eq!(
            partition.recent[0].completion_time.as_deref(),
            Some("2025-06-01T09:30:00.000GMT")
        );
        assert_eq!(
            partition.recent[1].submission_time.as_deref(),
            Some("2025-06-01T09:00:00.000GMT")
        );
    }

    #[test]
    fn recent_is_capped_at_twenty() {
        let stages: Vec<StageSummary> = (0..25)
            .map(|i| {
                let completed = format!("2025-06-01T10:00:{i:02}.000GMT");
                stage(StageStatus::Complete, Some(completed.as_str()), None)
            })
            .collect();
        let partition = partition_stages(&stages);
        assert_eq!(partition.recent.len(), RECENT_STAGE_LIMIT);
        // Newest (largest second field) survives the cap.
        assert_eq!(
            partition.recent[0].completion_time.as_deref(),
            Some("2025-06-01T10:00:24.000GMT")
        );
    }

    #[test]
    fn empty_input_yields_empty_partitions() {
        let partition = partition_stages(&[]);
        assert!(partition.active.is_empty());
        assert!(partition.recent.is_empty());
    }

    fn deployment(exists: bool, is_ready: bool) -> DeploymentStatus {
        DeploymentStatus {
            exists,
            is_ready,
            ..Default::default()
        }
    }

    #[test]
    fn phase_ready_when_both_deployments_ready() {
        let status = ClusterStatus {
            master: deployment(true, true),
            workers: deployment(true, true),
            ..Default::default()
        };
        assert_eq!(cluster_phase(Some(&status)), ClusterPhase::Ready);
    }

    #[test]
    fn phase_starting_while_workers_come_up() {
        let status = ClusterStatus {
            master: deployment(true, true),
            workers: deployment(true, false),
            ..Default::default()
        };
        assert_eq!(cluster_phase(Some(&status)), ClusterPhase::Starting);
    }

    #[test]
    fn phase_no_cluster_when_nothing_exists() {
        let status = ClusterStatus::default();
        assert_eq!(cluster_phase(Some(&status)), ClusterPhase::NoCluster);
    }

    #[test]
    fn phase_error_and_unknown() {
        let status = ClusterStatus {
            error: Some("probe failed".into()),
            ..Default::default()
        };
        assert_eq!(cluster_phase(Some(&status)), ClusterPhase::Error);
        assert_eq!(cluster_phase(None), ClusterPhase::Unknown);
    }

    #[test]
    fn spill_detection_lists_offending_executor_ids() {
        let executors = vec![
            crate::model::ExecutorSummary {
                id: "0".into(),
                disk_used: 0,
                ..Default::default()
            },
            crate::model::ExecutorSummary {
                id: "1".into(),
                disk_used: 4096,
                ..Default::default()
            },
        ];
        assert_eq!(spilling_executors(&executors), vec!["1"]);
        assert!(spilling_executors(&[]).is_empty());
    }
}
