use std::collections::HashMap;
use std::time::Duration;

use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, Select, WriteRequest};
use aws_sdk_dynamodb::Client;
use tracing::{info, warn};

use crate::error::CopyError;

/// Attempts to land a page's write batch, counting the initial call.
const MAX_WRITE_ATTEMPTS: u32 = 8;
/// Pause before resending unprocessed items, giving throttling a chance
/// to clear.
const UNPROCESSED_RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Copy one segment's share of the source table into the destination.
///
/// Runs a strongly-consistent scan restricted to `(segment,
/// total_segments)` and turns every page into exactly one batch-write-item
/// call of put requests. Pages are never merged or split, so `page_size`
/// bounds the write call size. Items are copied verbatim; an existing
/// destination item with the same key is overwritten.
///
/// Returns the number of items this worker copied.
pub async fn copy_segment(
    client: &Client,
    source: &str,
    dest: &str,
    segment: i32,
    total_segments: i32,
    page_size: i32,
) -> Result<u64, CopyError> {
    let mut item_count: u64 = 0;

    let mut pages = client
        .scan()
        .table_name(source)
        .select(Select::AllAttributes)
        .consistent_read(true)
        .segment(segment)
        .total_segments(total_segments)
        .into_paginator()
        .page_size(page_size)
        .send();

    while let Some(page) = pages.next().await {
        let page = page.map_err(|err| CopyError::Scan {
            segment,
            message: err.to_string(),
        })?;

        let items = page.items.unwrap_or_default();
        if items.is_empty() {
            continue;
        }

        item_count += items.len() as u64;
        let requests = to_write_requests(dest, items)?;
        write_batch(client, dest, segment, requests).await?;

        info!(segment, copied = item_count, "worker progress");
    }

    Ok(item_count)
}

/// Wrap scanned items in put-request envelopes, leaving their attributes
/// untouched.
pub fn to_write_requests(
    dest: &str,
    items: Vec<HashMap<String, AttributeValue>>,
) -> Result<Vec<WriteRequest>, CopyError> {
    items
        .into_iter()
        .map(|item| {
            let put = PutRequest::builder()
                .set_item(Some(item))
                .build()
                .map_err(|err| CopyError::BatchWrite {
                    table: dest.to_string(),
                    message: err.to_string(),
                })?;
            Ok(WriteRequest::builder().put_request(put).build())
        })
        .collect()
}

/// Issue one batch-write-item call, resending any unprocessed items until
/// the service accepts them all or the attempt budget runs out.
async fn write_batch(
    client: &Client,
    dest: &str,
    segment: i32,
    requests: Vec<WriteRequest>,
) -> Result<(), CopyError> {
    let mut pending = requests;

    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let output = client
            .batch_write_item()
            .request_items(dest.to_string(), pending)
            .send()
            .await
            .map_err(|err| CopyError::BatchWrite {
                table: dest.to_string(),
                message: err.into_service_error().to_string(),
            })?;

        let unprocessed = output
            .unprocessed_items
            .and_then(|mut tables| tables.remove(dest))
            .unwrap_or_default();

        if unprocessed.is_empty() {
            return Ok(());
        }

        if attempt == MAX_WRITE_ATTEMPTS {
            return Err(CopyError::UnprocessedItems {
                table: dest.to_string(),
                count: unprocessed.len(),
                attempts: attempt,
            });
        }

        warn!(
            segment,
            attempt,
            unprocessed = unprocessed.len(),
            "resending unprocessed items"
        );
        pending = unprocessed;
        tokio::time::sleep(UNPROCESSED_RETRY_PAUSE).await;
    }

    unreachable!("write attempt loop returns before exhausting its range")
}
