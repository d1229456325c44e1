// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! Installs handlers for SIGTERM and SIGINT (Ctrl+C), triggering a
//! [`CancellationToken`] the front end watches. In-flight requests are
//! drained before the process exits.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use yal_admission::AdmissionController;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is received.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {
                            info!("received SIGINT (Ctrl+C), initiating shutdown");
                        }
                        _ = sigterm.recv() => {
                            info!("received SIGTERM, initiating shutdown");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Waits up to `timeout` for every admitted request to release its slot.
///
/// Returns the number of users still holding slots when it gave up.
pub async fn drain_in_flight(admission: &AdmissionController, timeout: Duration) -> usize {
    let active = admission.active_users();
    if active == 0 {
        info!("no in-flight requests to drain");
        return 0;
    }

    info!(users = active, "waiting for in-flight requests to complete");
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        if admission.active_users() == 0 {
            info!("all in-flight requests drained");
            return 0;
        }
    }

    let remaining = admission.active_users();
    if remaining > 0 {
        warn!(users = remaining, "drain timeout reached, abandoning requests");
    }
    remaining
}
