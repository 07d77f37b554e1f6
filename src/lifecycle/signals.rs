//! OS signal handling.
//!
//! SIGINT and SIGTERM both start a graceful shutdown. There is no reload
//! signal: the backend set is fixed for the life of the process.

use std::io;

/// Resolve once the process is asked to terminate; returns the signal name.
pub async fn wait_for_termination() -> io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                Ok("SIGINT")
            }
            _ = terminate.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok("ctrl-c")
    }
}
