//! Display readiness check raced against a timeout
//!
//! A failing or slow probe never blocks a test: the run continues with the
//! fallback rendering and the reason is logged.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub const READINESS_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Fallback { reason: String },
}

/// Run `probe` on a worker thread; whichever of probe and timeout finishes first decides
pub fn probe_with_timeout<F>(probe: F, timeout: Duration) -> Readiness
where
    F: FnOnce() -> Result<(), String> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let _ = tx.send(probe());
    });

    // A timed-out worker is left detached; its late result goes nowhere
    match rx.recv_timeout(timeout) {
        Ok(Ok(())) => Readiness::Ready,
        Ok(Err(reason)) => Readiness::Fallback { reason },
        Err(mpsc::RecvTimeoutError::Timeout) => Readiness::Fallback {
            reason: format!("display check timed out after {}ms", timeout.as_millis()),
        },
        Err(mpsc::RecvTimeoutError::Disconnected) => Readiness::Fallback {
            reason: "display check aborted".to_string(),
        },
    }
}

/// Terminal has a usable size and a UTF-8 locale for the symbol glyphs
pub fn terminal_probe() -> Result<(), String> {
    let (cols, rows) = crossterm::terminal::size().map_err(|e| e.to_string())?;
    if cols == 0 || rows == 0 {
        return Err("terminal reports zero size".to_string());
    }

    let locale = ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .unwrap_or_default();
    if !locale.to_uppercase().contains("UTF-8") && !locale.to_uppercase().contains("UTF8") {
        return Err(format!("locale '{}' may not render symbol glyphs", locale));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_ready() {
        let r = probe_with_timeout(|| Ok(()), Duration::from_millis(500));
        assert_eq!(r, Readiness::Ready);
    }

    #[test]
    fn test_probe_failure_falls_back() {
        let r = probe_with_timeout(|| Err("no glyphs".to_string()), Duration::from_millis(500));
        assert_eq!(
            r,
            Readiness::Fallback {
                reason: "no glyphs".to_string()
            }
        );
    }

    #[test]
    fn test_probe_timeout_falls_back() {
        let r = probe_with_timeout(
            || {
                thread::sleep(Duration::from_millis(300));
                Ok(())
            },
            Duration::from_millis(20),
        );
        assert!(matches!(r, Readiness::Fallback { .. }));
    }

    #[test]
    fn test_panicking_probe_falls_back() {
        let r = probe_with_timeout(|| panic!("probe crashed"), Duration::from_millis(500));
        assert!(matches!(r, Readiness::Fallback { .. }));
    }
}
