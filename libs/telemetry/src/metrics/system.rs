use serde::Serialize;
use sysinfo::{CpuExt, SystemExt};

pub(crate) struct System {
    inner: sysinfo::System,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SystemMetrics {
    pub cpu_usage_percent: f32,
    pub cpu_count: usize,
    pub total_memory_bytes: u64,
    pub used_memory_bytes: u64,
    pub total_swap_bytes: u64,
    pub used_swap_bytes: u64,
    pub uptime_seconds: u64,
}

/// Nests the gauges under a `system_` metric prefix when encoded.
#[derive(Debug, Serialize)]
pub(crate) struct SystemMetricsWrapper {
    pub system: SystemMetrics,
}

impl System {
    pub(crate) fn new() -> Self {
        let mut inner = sysinfo::System::new();
        inner.refresh_cpu();
        inner.refresh_memory();
        Self { inner }
    }

    pub(crate) fn refresh(&mut self) {
        self.inner.refresh_cpu();
        self.inner.refresh_memory();
    }

    pub(crate) fn metrics(&self) -> SystemMetrics {
        SystemMetrics {
            cpu_usage_percent: self.inner.global_cpu_info().cpu_usage(),
            cpu_count: self.inner.cpus().len(),
            total_memory_bytes: self.inner.total_memory(),
            used_memory_bytes: self.inner.used_memory(),
            total_swap_bytes: self.inner.total_swap(),
            used_swap_bytes: self.inner.used_swap(),
            uptime_seconds: self.inner.uptime(),
        }
    }
}

impl From<SystemMetrics> for SystemMetricsWrapper {
    fn from(system: SystemMetrics) -> Self {
        Self { system }
    }
}
