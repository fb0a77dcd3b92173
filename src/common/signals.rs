//! Unix signal flags polled from the UI loop
//!
//! Handlers only flip atomics; the egui update loop checks them on its next
//! pass, so no widget state is touched from signal context.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;

/// Flags raised by process signals
#[derive(Debug, Clone, Default)]
pub struct SignalFlags {
    quit: Arc<AtomicBool>,
    reload: Arc<AtomicBool>,
}

impl SignalFlags {
    /// Register SIGINT/SIGTERM as quit requests and SIGHUP as a settings reload
    #[cfg(unix)]
    pub fn register() -> Result<Self> {
        use anyhow::Context;
        use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};

        let flags = Self::default();
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, Arc::clone(&flags.quit))
                .with_context(|| format!("Failed to register handler for signal {signal}"))?;
        }
        signal_hook::flag::register(SIGHUP, Arc::clone(&flags.reload))
            .context("Failed to register SIGHUP handler")?;
        Ok(flags)
    }

    #[cfg(not(unix))]
    pub fn register() -> Result<Self> {
        Ok(Self::default())
    }

    /// Returns true once per received quit signal
    pub fn take_quit(&self) -> bool {
        self.quit.swap(false, Ordering::SeqCst)
    }

    /// Returns true once per received reload signal
    pub fn take_reload(&self) -> bool {
        self.reload.swap(false, Ordering::SeqCst)
    }

    #[cfg(test)]
    pub fn raise_quit(&self) {
        self.quit.store(true, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn raise_reload(&self) {
        self.reload.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_are_consumed_once() {
        let flags = SignalFlags::default();
        assert!(!flags.take_quit());

        flags.raise_quit();
        assert!(flags.take_quit());
        assert!(!flags.take_quit());

        flags.raise_reload();
        let clone = flags.clone();
        assert!(clone.take_reload());
        assert!(!flags.take_reload());
    }
}
