//! Interactive session: one dashboard per selection event.
//!
//! Each input line is `<report> <year>` (for example `OPT1 2010` or
//! `delay 2015`). Every event is answered with exactly one JSON line
//! holding the five chart slots, so a front end can re-render on each
//! control change. An initial selection, when given, is rendered before
//! the first line is read.

use crate::charts::{build_dashboard, Dashboard};
use crate::dataset::Dataset;
use crate::models::ReportSelection;
use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Events answered with a computed dashboard.
    pub rendered: usize,
    /// Events that did not parse and were answered with a blank dashboard.
    pub rejected: usize,
}

/// Answer a single event line.
pub fn handle_event(dataset: &Dataset, line: &str) -> (Dashboard, bool) {
    match ReportSelection::parse_line(line) {
        Ok(selection) => (build_dashboard(dataset, selection), true),
        Err(e) => {
            warn!("Ignoring selection event: {}", e);
            (Dashboard::blank(), false)
        }
    }
}

async fn write_dashboard<W>(writer: &mut W, dashboard: &Dashboard) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut payload = serde_json::to_string(dashboard)?;
    payload.push('\n');
    writer
        .write_all(payload.as_bytes())
        .await
        .context("Failed to write dashboard")?;
    writer.flush().await?;
    Ok(())
}

/// Run the event loop until EOF or a `quit`/`exit` line.
pub async fn run_session<R, W>(
    dataset: &Dataset,
    initial: Option<ReportSelection>,
    reader: R,
    mut writer: W,
) -> Result<SessionStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stats = SessionStats::default();
    let mut lines = reader.lines();

    if let Some(selection) = initial {
        debug!("Initial render: {}", selection);
        write_dashboard(&mut writer, &build_dashboard(dataset, selection)).await?;
        stats.rendered += 1;
    }

    while let Some(line) = lines.next_line().await.context("Failed to read selection")? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            debug!("Session closed by client");
            break;
        }

        let (dashboard, accepted) = handle_event(dataset, line);
        if accepted {
            stats.rendered += 1;
        } else {
            stats.rejected += 1;
        }

        write_dashboard(&mut writer, &dashboard).await?;
    }

    info!(
        "Session ended: {} rendered, {} rejected",
        stats.rendered, stats.rejected
    );
    Ok(stats)
}
