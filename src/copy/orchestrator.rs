use aws_sdk_dynamodb::Client;
use tracing::{error, info};

use crate::copy::schema::{replicate, CapacityOverrides, Replication};
use crate::copy::segment::copy_segment;
use crate::error::CopyError;
use crate::utils::Config;

/// Result of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunReport {
    /// The destination already existed; nothing was created or copied.
    DestinationExists,
    /// Schema phase (unless skipped) and copy phase both ran.
    Completed(CopySummary),
}

/// Totals gathered after joining the copy workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopySummary {
    /// Items copied by workers that finished cleanly.
    pub copied: u64,
    pub workers: usize,
    pub failed_workers: usize,
}

/// Run the full table copy: replicate the schema (unless configured to
/// skip it), then fan the item copy out over disjoint scan segments.
///
/// Workers are joined unconditionally; one worker failing neither cancels
/// its siblings nor fails the run. Failures are logged and counted in the
/// summary.
pub async fn run(
    client: &Client,
    config: &Config,
    source: &str,
    dest: &str,
) -> Result<RunReport, CopyError> {
    if config.skip_creation {
        info!("skipping table creation, copying items only");
    } else {
        let overrides = CapacityOverrides {
            read_capacity_units: config.read_capacity,
            write_capacity_units: config.write_capacity,
        };
        if replicate(client, source, dest, overrides).await? == Replication::AlreadyExists {
            return Ok(RunReport::DestinationExists);
        }
    }

    info!(
        parallelism = config.parallelism,
        page_size = config.page_size,
        "copying '{source}' into '{dest}'"
    );

    let mut handles = Vec::with_capacity(config.parallelism);
    for (segment, total_segments) in segment_plan(config.parallelism) {
        let client = client.clone();
        let source = source.to_string();
        let dest = dest.to_string();
        let page_size = config.page_size;
        handles.push(tokio::spawn(async move {
            copy_segment(&client, &source, &dest, segment, total_segments, page_size).await
        }));
    }

    let mut summary = CopySummary {
        workers: handles.len(),
        ..CopySummary::default()
    };

    for (segment, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(Ok(count)) => {
                info!(segment, count, "worker finished");
                summary.copied += count;
            }
            Ok(Err(err)) => {
                error!(segment, error = %err, "worker failed, copy may be incomplete");
                summary.failed_workers += 1;
            }
            Err(err) => {
                error!(segment, error = %err, "worker panicked, copy may be incomplete");
                summary.failed_workers += 1;
            }
        }
    }

    Ok(RunReport::Completed(summary))
}

/// Static `(segment, total_segments)` assignment for each worker. Segments
/// partition the scan space, so the plan is complete and disjoint by
/// construction.
pub fn segment_plan(parallelism: usize) -> Vec<(i32, i32)> {
    let total = parallelism as i32;
    (0..total).map(|segment| (segment, total)).collect()
}
