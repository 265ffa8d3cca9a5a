//! Cancellable body reader shared by the streaming transports

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::READ_CHUNK_SIZE;
use crate::loader::error::LoaderError;

/// Read the whole body as UTF-8, checking for cancellation between chunks
///
/// Each read is raced against the token so a stalled transfer is abandoned as
/// soon as cancellation is requested.
pub(crate) async fn read_to_string_cancellable<R>(
    mut reader: R,
    cancel_token: &CancellationToken,
) -> Result<String, LoaderError>
where
    R: AsyncRead + Unpin,
{
    let mut body = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    loop {
        if cancel_token.is_cancelled() {
            debug!("Cancelled after reading {} bytes", body.len());
            return Err(LoaderError::Cancelled);
        }

        let read = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                debug!("Cancelled while waiting for data after {} bytes", body.len());
                return Err(LoaderError::Cancelled);
            }
            read = reader.read(&mut chunk) => read?,
        };

        if read == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..read]);
    }

    Ok(String::from_utf8(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Reader that serves fixed chunks and cancels the token after `cancel_after` reads
    struct ChunkedReader {
        chunks: Vec<&'static [u8]>,
        reads: usize,
        cancel_after: Option<usize>,
        token: CancellationToken,
    }

    impl AsyncRead for ChunkedReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = &mut *self;
            if let Some(chunk) = this.chunks.get(this.reads) {
                buf.put_slice(chunk);
            }
            this.reads += 1;
            if this.cancel_after == Some(this.reads) {
                this.token.cancel();
            }
            Poll::Ready(Ok(()))
        }
    }

    fn chunked_reader(
        chunks: Vec<&'static [u8]>,
        cancel_after: Option<usize>,
    ) -> (ChunkedReader, CancellationToken) {
        let token = CancellationToken::new();
        (
            ChunkedReader {
                chunks,
                reads: 0,
                cancel_after,
                token: token.clone(),
            },
            token,
        )
    }

    #[tokio::test]
    async fn reads_all_chunks_into_string() {
        let chunks = vec![&b"{\"latest"[..], &b"_version\":"[..], &b"\"1.0\"}"[..]];
        let (mut reader, token) = chunked_reader(chunks, None);

        let content = read_to_string_cancellable(&mut reader, &token).await.unwrap();

        assert_eq!(content, r#"{"latest_version":"1.0"}"#);
        assert_eq!(reader.reads, 4);
    }

    #[tokio::test]
    async fn stops_mid_stream_when_cancelled() {
        let chunks = vec![&b"first"[..], &b"second"[..], &b"third"[..]];
        let (mut reader, token) = chunked_reader(chunks, Some(1));

        let result = read_to_string_cancellable(&mut reader, &token).await;

        assert!(matches!(result, Err(LoaderError::Cancelled)));
        assert_eq!(reader.reads, 1);
    }

    #[tokio::test]
    async fn reads_nothing_when_already_cancelled() {
        let (mut reader, token) = chunked_reader(vec![&b"data"[..]], None);
        token.cancel();

        let result = read_to_string_cancellable(&mut reader, &token).await;

        assert!(matches!(result, Err(LoaderError::Cancelled)));
        assert_eq!(reader.reads, 0);
    }

    #[tokio::test]
    async fn rejects_invalid_utf8() {
        let (mut reader, token) = chunked_reader(vec![&b"\xff\xfe"[..]], None);

        let result = read_to_string_cancellable(&mut reader, &token).await;

        assert!(matches!(result, Err(LoaderError::InvalidEncoding(_))));
    }
}
