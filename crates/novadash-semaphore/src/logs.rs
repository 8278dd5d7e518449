//! Incremental task log streaming

use std::time::Duration;

use futures::stream::{
    self,
    Stream,
    StreamExt,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::SemaphoreApi;
use crate::types::TaskOutput;
use crate::{
    SemaphoreError,
    SemaphoreResult,
};

pub const DEFAULT_LOG_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub const DEFAULT_LOG_TIMEOUT: Duration = Duration::from_secs(600);

/// Tracks the highest log id already handed to a consumer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogCursor {
    last_id: i64,
}

impl LogCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes delivery after an id a consumer has already seen
    pub fn after(last_id: i64) -> Self {
        Self { last_id }
    }

    pub fn last_id(&self) -> i64 {
        self.last_id
    }

    /// Keeps only entries newer than the cursor, in ascending id order,
    /// and moves the cursor past them
    pub fn advance(&mut self, mut entries: Vec<TaskOutput>) -> Vec<TaskOutput> {
        entries.retain(|entry| entry.id > self.last_id);
        entries.sort_by_key(|entry| entry.id);
        entries.dedup_by_key(|entry| entry.id);

        if let Some(last) = entries.last() {
            self.last_id = last.id;
        }

        entries
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LogStreamOptions {
    /// Keep polling until the task reaches a terminal status
    pub follow: bool,
    pub poll_interval: Duration,
    /// Give up following once this much time has passed; `None` follows forever
    pub timeout: Option<Duration>,
}

impl Default for LogStreamOptions {
    fn default() -> Self {
        Self {
            follow: true,
            poll_interval: DEFAULT_LOG_POLL_INTERVAL,
            timeout: Some(DEFAULT_LOG_TIMEOUT),
        }
    }
}

/// Polling log reader for one task
///
/// Ends after the batch fetched while the task was terminal, or after the
/// first batch when not following. A stream that outlives its timeout ends
/// with [`SemaphoreError::StreamTimeout`].
pub struct TaskLogStream<'a, A: SemaphoreApi + ?Sized> {
    api: &'a A,
    project_id: i64,
    task_id: i64,
    options: LogStreamOptions,
    cursor: LogCursor,
    polls: usize,
    finished: bool,
    cancel: CancellationToken,
    started: Instant,
}

pub fn stream_task_logs<A: SemaphoreApi + ?Sized>(
    api: &A, project_id: i64, task_id: i64, options: LogStreamOptions,
) -> TaskLogStream<'_, A> {
    TaskLogStream {
        api,
        project_id,
        task_id,
        options,
        cursor: LogCursor::new(),
        polls: 0,
        finished: false,
        cancel: CancellationToken::new(),
        started: Instant::now(),
    }
}

impl<'a, A: SemaphoreApi + ?Sized> TaskLogStream<'a, A> {
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_cursor(mut self, cursor: LogCursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn cursor(&self) -> LogCursor {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fetches the next batch of unseen entries; `None` once the stream ended
    pub async fn next_batch(&mut self) -> SemaphoreResult<Option<Vec<TaskOutput>>> {
        if self.finished {
            return Ok(None);
        }

        if self.polls > 0 {
            tokio::select! {
                _ = self.cancel.cancelled() => {}
                _ = tokio::time::sleep(self.options.poll_interval) => {}
            }
        }

        if self.cancel.is_cancelled() {
            self.finished = true;
            return Err(SemaphoreError::Cancelled {
                task_id: self.task_id,
                elapsed: self.started.elapsed(),
            });
        }

        if let Some(timeout) = self.options.timeout {
            let elapsed = self.started.elapsed();
            if elapsed >= timeout {
                self.finished = true;
                return Err(SemaphoreError::StreamTimeout {
                    task_id: self.task_id,
                    elapsed,
                });
            }
        }

        self.polls += 1;

        let fetched = async {
            let task = self.api.get_task(self.project_id, self.task_id).await?;
            let output = self
                .api
                .get_task_output(self.project_id, self.task_id)
                .await?;
            Ok::<_, SemaphoreError>((task, output))
        }
        .await;

        let (task, output) = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };

        let fresh = self.cursor.advance(output);
        debug!(
            task_id = self.task_id,
            status = %task.status,
            new_entries = fresh.len(),
            last_id = self.cursor.last_id(),
            "Polled task output"
        );

        if task.is_terminal() || !self.options.follow {
            self.finished = true;
        }

        Ok(Some(fresh))
    }

    /// Flattens the batches into a stream of entries; an error is yielded
    /// once and ends the stream
    pub fn into_stream(self) -> impl Stream<Item = SemaphoreResult<TaskOutput>> + 'a {
        stream::unfold(self, |mut logs| async move {
            match logs.next_batch().await {
                Ok(Some(batch)) => Some((Ok(batch), logs)),
                Ok(None) => None,
                Err(e) => Some((Err(e), logs)),
            }
        })
        .flat_map(|batch| {
            let items: Vec<SemaphoreResult<TaskOutput>> = match batch {
                Ok(entries) => entries.into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            stream::iter(items)
        })
    }
}
