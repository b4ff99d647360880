// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Consumption of `?watch=true` streams: one JSON event per line, dispatched in order.

use crate::error::{KwatchError, Result};
use crate::kubernetes::session::{resource_uri, Session};
use crate::types::WatchEvent;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::future::{join_all, try_join_all};
use futures::{Stream, StreamExt, TryStreamExt};
use http_body_util::BodyStream;
use std::fmt::Display;
use std::pin::pin;
use tracing::{debug, error, info, instrument};

/// Receives every event of a watch stream, in stream order
#[async_trait]
pub trait WatchHandler: Send {
    async fn handle(&mut self, event: WatchEvent);
}

/// One independent watch: its own session, resource and handler
pub struct WatchTask<H> {
    pub session: Session,
    pub resource_path: String,
    pub handler: H,
}

/// Request path with `watch=true` appended to any existing query
pub fn watch_uri(resource_path: &str) -> String {
    let uri = resource_uri(resource_path);
    let separator = if uri.contains('?') { '&' } else { '?' };
    format!("{}{}watch=true", uri, separator)
}

/// Watch `resource_path` until the server closes the stream.
///
/// Returns the number of events dispatched. A non-200 answer fails with
/// `ConnectionError`; a malformed line fails with `MalformedEvent` after all
/// earlier lines were dispatched. There is no reconnect.
#[instrument(skip(session, handler))]
pub async fn watch<H: WatchHandler + ?Sized>(
    session: &Session,
    resource_path: &str,
    handler: &mut H,
) -> Result<usize> {
    let response = session.get(&watch_uri(resource_path)).await?;
    info!("Watching {}", resource_path);

    let chunks = BodyStream::new(response.into_body())
        .try_filter_map(|frame| futures::future::ready(Ok(frame.into_data().ok())));
    let dispatched = dispatch_lines(chunks, handler).await?;

    info!(
        "Watch on {} closed by server after {} events",
        resource_path, dispatched
    );
    Ok(dispatched)
}

/// Split a byte stream into lines and hand each decoded event to `handler`
pub async fn dispatch_lines<S, E, H>(chunks: S, handler: &mut H) -> Result<usize>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Display,
    H: WatchHandler + ?Sized,
{
    let mut chunks = pin!(chunks);
    let mut decoder = LineDecoder::default();
    let mut dispatched = 0;

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(|e| KwatchError::StreamError(e.to_string()))?;
        decoder.extend(&chunk);
        while let Some((number, line)) = decoder.next_line() {
            dispatched += dispatch(number, &line, handler).await?;
        }
    }
    if let Some((number, line)) = decoder.finish() {
        dispatched += dispatch(number, &line, handler).await?;
    }

    Ok(dispatched)
}

async fn dispatch<H: WatchHandler + ?Sized>(number: usize, line: &[u8], handler: &mut H) -> Result<usize> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return Ok(0);
    }

    let event: WatchEvent = serde_json::from_slice(line)
        .map_err(|source| KwatchError::MalformedEvent { line: number, source })?;
    debug!("Line {}: {} event", number, event.event_type);
    handler.handle(event).await;
    Ok(1)
}

/// Buffers partial chunks until a full line is available
#[derive(Default)]
struct LineDecoder {
    buffer: BytesMut,
    // Bytes of `buffer` already known to contain no newline
    scanned: usize,
    lines: usize,
}

impl LineDecoder {
    fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    fn next_line(&mut self) -> Option<(usize, Bytes)> {
        let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') else {
            self.scanned = self.buffer.len();
            return None;
        };
        let end = self.scanned + offset;
        let mut line = self.buffer.split_to(end + 1);
        line.truncate(end);
        if line.last() == Some(&b'\r') {
            line.truncate(end - 1);
        }
        self.scanned = 0;
        self.lines += 1;
        Some((self.lines, line.freeze()))
    }

    /// Trailing data without a final newline
    fn finish(&mut self) -> Option<(usize, Bytes)> {
        if self.buffer.is_empty() {
            return None;
        }
        self.scanned = 0;
        self.lines += 1;
        Some((self.lines, self.buffer.split().freeze()))
    }
}

/// Run every watch on the current task. A failing watch never stops its siblings;
/// each result is returned in task order.
pub async fn watch_concurrently<H: WatchHandler>(tasks: Vec<WatchTask<H>>) -> Vec<Result<usize>> {
    join_all(tasks.into_iter().map(run_task)).await
}

/// Like `watch_concurrently`, but the first failure ends all watches
pub async fn watch_concurrently_fail_fast<H: WatchHandler>(
    tasks: Vec<WatchTask<H>>,
) -> Result<Vec<usize>> {
    try_join_all(tasks.into_iter().map(run_task)).await
}

async fn run_task<H: WatchHandler>(mut task: WatchTask<H>) -> Result<usize> {
    let result = watch(&task.session, &task.resource_path, &mut task.handler).await;
    if let Err(e) = &result {
        error!("Watch on {} failed: {}", task.resource_path, e);
    }
    result
}
