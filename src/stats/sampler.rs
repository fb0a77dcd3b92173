//! CPU and memory sampling via sysinfo

use anyhow::{Result, bail};
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

/// One instantaneous reading of system load
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSample {
    pub cpu_percent: f32,
    pub mem_percent: f32,
    pub mem_used_bytes: u64,
    pub mem_total_bytes: u64,
}

impl StatsSample {
    /// The percentage counts everything not available for new allocations
    /// (`total - available`), which is larger than `used` once buffers and
    /// caches that cannot be reclaimed are included.
    pub fn new(
        cpu_percent: f32,
        mem_used_bytes: u64,
        mem_available_bytes: u64,
        mem_total_bytes: u64,
    ) -> Self {
        let mem_percent = if mem_total_bytes == 0 {
            0.0
        } else {
            let unavailable = mem_total_bytes.saturating_sub(mem_available_bytes);
            (unavailable as f64 / mem_total_bytes as f64 * 100.0) as f32
        };
        Self {
            cpu_percent,
            mem_percent,
            mem_used_bytes,
            mem_total_bytes,
        }
    }
}

/// Source of system statistics
pub trait StatsSampler {
    /// Best-effort instantaneous values; must not block
    fn sample(&mut self) -> Result<StatsSample>;
}

/// sysinfo-backed sampler.
///
/// CPU usage is computed between two refreshes, so the first sample after
/// construction may report 0%.
pub struct SystemSampler {
    system: System,
}

impl SystemSampler {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::new().with_cpu_usage())
                .with_memory(MemoryRefreshKind::new().with_ram()),
        );
        Self { system }
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsSampler for SystemSampler {
    fn sample(&mut self) -> Result<StatsSample> {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        if self.system.cpus().is_empty() {
            bail!("OS reported no CPUs");
        }
        let total = self.system.total_memory();
        if total == 0 {
            bail!("OS reported zero total memory");
        }

        let cpu = self.system.global_cpu_usage();
        if !cpu.is_finite() {
            bail!("CPU usage is not a number");
        }

        Ok(StatsSample::new(
            cpu.clamp(0.0, 100.0),
            self.system.used_memory().min(total),
            self.system.available_memory().min(total),
            total,
        ))
    }
}
