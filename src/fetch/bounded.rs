//! Size-capped collection of a byte stream.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("File too large")]
    TooLarge { limit: usize },

    #[error("Stream read error: {0}")]
    Stream(String),
}

/// Collect `stream` into one buffer, failing as soon as more than `max_bytes`
/// have arrived. A `declared` length above the limit fails before the first
/// chunk is polled. Nothing read so far is returned on failure.
pub async fn read_bounded<S, E>(
    stream: S,
    declared: Option<u64>,
    max_bytes: usize,
) -> Result<Vec<u8>, ReadError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    if declared.is_some_and(|len| len > max_bytes as u64) {
        return Err(ReadError::TooLarge { limit: max_bytes });
    }

    let mut stream = std::pin::pin!(stream);
    let mut chunks: Vec<Bytes> = Vec::new();
    let mut received: usize = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ReadError::Stream(e.to_string()))?;
        if chunk.is_empty() {
            continue;
        }
        received = received.saturating_add(chunk.len());
        if received > max_bytes {
            tracing::debug!(received, max_bytes, "stream exceeded byte ceiling");
            return Err(ReadError::TooLarge { limit: max_bytes });
        }
        chunks.push(chunk);
    }

    let mut out = Vec::with_capacity(received);
    for chunk in &chunks {
        out.extend_from_slice(chunk);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_BLOB_BYTES;
    use futures_util::stream;
    use std::convert::Infallible;
    use std::time::Duration;

    fn chunks(parts: &[&'static [u8]]) -> Vec<Result<Bytes, Infallible>> {
        parts.iter().map(|p| Ok(Bytes::from_static(p))).collect()
    }

    #[tokio::test]
    async fn test_concatenates_chunks_exactly() {
        let body = read_bounded(stream::iter(chunks(&[b"ab", b"", b"cde"])), None, 5)
            .await
            .unwrap();
        assert_eq!(body, b"abcde");
    }

    #[tokio::test]
    async fn test_empty_stream_is_empty_body() {
        let body = read_bounded(stream::iter(chunks(&[])), Some(0), 5)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_declared_length_short_circuits() {
        // A pending stream would hang if it were polled.
        let pending = stream::pending::<Result<Bytes, Infallible>>();
        let result = read_bounded(pending, Some(6), 5).await;
        assert_eq!(result, Err(ReadError::TooLarge { limit: 5 }));
    }

    #[tokio::test]
    async fn test_stops_reading_once_limit_crossed() {
        let body = stream::iter(chunks(&[b"abc", b"def"])).chain(stream::pending());
        let result = tokio::time::timeout(Duration::from_secs(5), read_bounded(body, None, 5))
            .await
            .expect("reader kept polling past the limit");
        assert_eq!(result, Err(ReadError::TooLarge { limit: 5 }));
    }

    #[tokio::test]
    async fn test_blob_ceiling_is_enforced_cumulatively() {
        let mib = Bytes::from(vec![7u8; 1024 * 1024]);
        let parts: Vec<Result<Bytes, Infallible>> = (0..25).map(|_| Ok(mib.clone())).collect();
        let result = read_bounded(stream::iter(parts), None, MAX_BLOB_BYTES).await;
        assert_eq!(
            result,
            Err(ReadError::TooLarge {
                limit: MAX_BLOB_BYTES
            })
        );

        let parts: Vec<Result<Bytes, Infallible>> = (0..24).map(|_| Ok(mib.clone())).collect();
        let body = read_bounded(stream::iter(parts), None, MAX_BLOB_BYTES)
            .await
            .unwrap();
        assert_eq!(body.len(), MAX_BLOB_BYTES);
    }

    #[tokio::test]
    async fn test_stream_error_is_reported() {
        let parts: Vec<Result<Bytes, String>> =
            vec![Ok(Bytes::from_static(b"ab")), Err("connection reset".to_string())];
        let result = read_bounded(stream::iter(parts), None, 5).await;
        assert_eq!(result, Err(ReadError::Stream("connection reset".to_string())));
    }
}
