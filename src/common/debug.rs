use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};
use tracing::info;

use crate::common::format::format_bytes;

/// Log system information for debugging purposes
pub fn log_system_info() {
    info!("=== System Information ===");

    if let Some(name) = System::long_os_version().or_else(System::name) {
        info!("OS: {}", name);
    }
    if let Some(kernel) = System::kernel_version() {
        info!("Kernel: {}", kernel);
    }
    if let Some(host) = System::host_name() {
        info!("Host: {}", host);
    }
    info!("Architecture: {}", std::env::consts::ARCH);

    // Desktop Environment / Window Manager hints
    if let Ok(session) = std::env::var("XDG_SESSION_TYPE") {
        info!("Session Type: {}", session);
    }
    if let Ok(desktop) = std::env::var("XDG_CURRENT_DESKTOP") {
        info!("Desktop Environment: {}", desktop);
    }

    let system = System::new_with_specifics(
        RefreshKind::new()
            .with_cpu(CpuRefreshKind::new())
            .with_memory(MemoryRefreshKind::new().with_ram()),
    );
    info!("CPUs: {}", system.cpus().len());
    info!(
        "Memory: {} (Total), {} (Available)",
        format_bytes(system.total_memory(), 2),
        format_bytes(system.available_memory(), 2)
    );

    info!("==========================");
}
