use serde::{Deserialize, Serialize};

// --- Cluster manager API (snake_case JSON) ---

/// Readiness of one Kubernetes deployment (master or workers).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeploymentStatus {
    pub available_replicas: u32,
    pub ready_replicas: u32,
    pub replicas: u32,
    pub unavailable_replicas: u32,
    pub is_ready: bool,
    pub exists: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClusterStatus {
    pub master: DeploymentStatus,
    pub workers: DeploymentStatus,
    pub master_url: String,
    pub master_ui_url: String,
    pub error: Option<String>,
}

// --- Spark Master /json/ payload ---
//
// Field names follow the Spark master REST API verbatim, including its
// historical lowercase-smashed names. Memory figures are in MB.

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkerInfo {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub cores: u32,
    #[serde(rename = "coresUsed")]
    pub cores_used: u32,
    #[serde(rename = "coresFree")]
    pub cores_free: u32,
    pub memory: u64,
    #[serde(rename = "memoryUsed")]
    pub memory_used: u64,
    #[serde(rename = "memoryFree")]
    pub memory_free: u64,
    pub state: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppInfo {
    pub id: String,
    pub name: String,
    pub cores: u32,
    #[serde(rename = "memoryperslave")]
    pub memory_per_slave: u64,
    pub state: String,
    /// Epoch milliseconds.
    #[serde(rename = "starttime")]
    pub start_time: i64,
    pub duration: i64,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MasterSummary {
    pub url: String,
    pub workers: Vec<WorkerInfo>,
    #[serde(rename = "aliveworkers")]
    pub alive_workers: u32,
    pub cores: u32,
    #[serde(rename = "coresused")]
    pub cores_used: u32,
    pub memory: u64,
    #[serde(rename = "memoryused")]
    pub memory_used: u64,
    #[serde(rename = "activeapps")]
    pub active_apps: Vec<AppInfo>,
    #[serde(rename = "completedapps")]
    pub completed_apps: Vec<AppInfo>,
    pub status: String,
}

// --- Spark application REST API (camelCase JSON) ---

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryMetrics {
    pub used_on_heap_storage_memory: u64,
    pub used_off_heap_storage_memory: u64,
    pub total_on_heap_storage_memory: u64,
    pub total_off_heap_storage_memory: u64,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutorSummary {
    pub id: String,
    pub host_port: String,
    pub is_active: bool,
    pub rdd_blocks: u32,
    pub memory_used: u64,
    pub disk_used: u64,
    pub total_cores: u32,
    pub max_tasks: u32,
    pub active_tasks: u32,
    pub failed_tasks: u32,
    pub completed_tasks: u32,
    pub total_tasks: u32,
    pub total_duration: u64,
    #[serde(rename = "totalGCTime")]
    pub total_gc_time: u64,
    pub total_input_bytes: u64,
    pub total_shuffle_read: u64,
    pub total_shuffle_write: u64,
    pub max_memory: u64,
    pub memory_metrics: Option<MemoryMetrics>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StageStatus {
    Active,
    Complete,
    #[default]
    Pending,
    Failed,
    Skipped,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StageSummary {
    pub status: StageStatus,
    pub stage_id: u64,
    pub attempt_id: u32,
    pub num_tasks: u32,
    pub num_active_tasks: u32,
    pub num_complete_tasks: u32,
    pub num_failed_tasks: u32,
    pub executor_run_time: u64,
    pub input_bytes: u64,
    pub input_records: u64,
    pub output_bytes: u64,
    pub output_records: u64,
    pub shuffle_read_bytes: u64,
    pub shuffle_write_bytes: u64,
    pub memory_bytes_spilled: u64,
    pub disk_bytes_spilled: u64,
    pub name: String,
    /// ISO-8601 strings straight from the API. Kept as strings: ordering is
    /// lexicographic, which is correct for these timestamps.
    pub submission_time: Option<String>,
    pub completion_time: Option<String>,
}

// --- Cluster lifecycle types ---

#[derive(Clone, Debug, Default, Serialize)]
pub struct ClusterConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_cores: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_cores: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_memory: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClusterCreateResponse {
    pub cluster_id: String,
    pub master_url: String,
    pub master_ui_url: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClusterDeleteResponse {
    pub message: String,
}

// --- UI State ---

pub struct UiState {
    pub selected_index: usize,
    pub total_rows: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            selected_index: 0,
            total_rows: 0,
        }
    }
}
