//! Chunked bulk writes.
//!
//! Every backend caps the number of records a single batch-write call may
//! carry. The loader partitions the input into contiguous chunks within
//! that cap and issues one call per chunk, in order, aborting on the
//! first failure. Nothing is rolled back or retried: a failed load means
//! some unknown prefix of the input was written.

use std::future::Future;

use crate::error::{StoreError, StoreResult};

/// Writes `records` through `write`, one call per chunk of at most
/// `max_batch_size` records.
///
/// On a chunk failure the error is wrapped as
/// [`StoreError::PartialLoad`] carrying the 1-based index of the failed
/// chunk; later chunks are never attempted.
pub async fn load_batched<T, F, Fut>(
    records: Vec<T>,
    max_batch_size: usize,
    mut write: F,
) -> StoreResult<()>
where
    F: FnMut(Vec<T>) -> Fut,
    Fut: Future<Output = StoreResult<()>>,
{
    if max_batch_size == 0 {
        return Err(StoreError::InvalidBatchSize(0));
    }
    if records.is_empty() {
        return Ok(());
    }

    let total_chunks = records.len().div_ceil(max_batch_size);
    let mut remaining = records;
    let mut chunk_index = 0;
    while !remaining.is_empty() {
        let tail = remaining.split_off(remaining.len().min(max_batch_size));
        let chunk = std::mem::replace(&mut remaining, tail);
        chunk_index += 1;
        write(chunk).await.map_err(|err| {
            StoreError::PartialLoad {
                failed_chunk: chunk_index,
                total_chunks,
                source: Box::new(err),
            }
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(count: usize) -> Vec<usize> {
        (0..count).collect()
    }

    #[tokio::test]
    async fn test_chunks_of_twenty_five() {
        let mut sizes = Vec::new();
        load_batched(records(51), 25, |chunk| {
            sizes.push(chunk.len());
            async { Ok(()) }
        })
        .await
        .unwrap();
        assert_eq!(sizes, vec![25, 25, 1]);
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_empty_tail() {
        let mut sizes = Vec::new();
        load_batched(records(50), 25, |chunk| {
            sizes.push(chunk.len());
            async { Ok(()) }
        })
        .await
        .unwrap();
        assert_eq!(sizes, vec![25, 25]);
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_chunks() {
        let mut calls = 0;
        let err = load_batched(records(51), 25, |_chunk| {
            calls += 1;
            let fail = calls == 2;
            async move {
                if fail {
                    Err(StoreError::backend("test", "write", "forced failure"))
                } else {
                    Ok(())
                }
            }
        })
        .await
        .unwrap_err();

        assert_eq!(calls, 2, "no chunk may be attempted after a failure");
        let StoreError::PartialLoad {
            failed_chunk,
            total_chunks,
            ..
        } = err
        else {
            panic!("expected PartialLoad, got {err:?}");
        };
        assert_eq!(failed_chunk, 2);
        assert_eq!(total_chunks, 3);
    }

    #[tokio::test]
    async fn test_empty_input_issues_no_calls() {
        let mut calls = 0;
        load_batched(Vec::<usize>::new(), 25, |_chunk| {
            calls += 1;
            async { Ok(()) }
        })
        .await
        .unwrap();
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_rejected() {
        let err = load_batched(records(1), 0, |_chunk| async { Ok(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidBatchSize(0)));
    }

    #[tokio::test]
    async fn test_chunks_preserve_input_order() {
        let mut seen = Vec::new();
        load_batched(records(7), 3, |chunk| {
            seen.extend(chunk);
            async { Ok(()) }
        })
        .await
        .unwrap();
        assert_eq!(seen, records(7));
    }
}
