//! Sequential byte sources feeding the segment parser.
//!
//! Three interchangeable backends sit behind the [`ByteSource`] contract:
//! an in-memory buffer, a concatenation of buffers, and an incremental
//! source fed by an asynchronous supplier. Reads are async throughout so
//! the parser's control flow is identical for buffered and streaming input;
//! the buffered backends never actually suspend.

use async_trait::async_trait;
use bytes::{Buf, Bytes, BytesMut};
use tokio::sync::mpsc;

use crate::error::PgsError;

/// Chunk item delivered by a streaming supplier.
pub type ChunkResult = Result<Bytes, PgsError>;

/// A position-tracked, forward-only byte provider.
///
/// Positions are monotonically non-decreasing and never exceed [`len`]
/// for bounded backends. `read_bytes` hands out a [`Bytes`] view that is
/// zero-copy wherever the backing storage allows; `read_bytes_owned` is the
/// explicit copying variant for callers that must outlive the source.
///
/// [`len`]: ByteSource::len
#[async_trait]
pub trait ByteSource: Send {
    /// Bytes consumed so far.
    fn position(&self) -> usize;

    /// Total length for bounded backends; bytes received so far for
    /// streaming ones.
    fn len(&self) -> usize;

    /// Whether no further byte can be read. A streaming backend may need to
    /// await its supplier to answer.
    async fn at_end(&mut self) -> bool;

    /// Read a single byte, failing with [`PgsError::UnexpectedEnd`] at the
    /// end of data.
    async fn read_byte(&mut self) -> Result<u8, PgsError>;

    /// Read the next `n` bytes, advancing the position by `n`.
    async fn read_bytes(&mut self, n: usize) -> Result<Bytes, PgsError>;

    /// Read the next `n` bytes into a freshly owned buffer.
    async fn read_bytes_owned(&mut self, n: usize) -> Result<Vec<u8>, PgsError> {
        Ok(self.read_bytes(n).await?.to_vec())
    }
}

/// Big-endian field decoding over any byte source.
///
/// A stateless decorator: every method is defined in terms of the wrapped
/// source's reads and carries no position of its own.
#[async_trait]
pub trait ReadFieldsExt: ByteSource {
    async fn read_u8(&mut self) -> Result<u8, PgsError> {
        self.read_byte().await
    }

    async fn read_u16(&mut self) -> Result<u16, PgsError> {
        let b = self.read_bytes(2).await?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    async fn read_u24(&mut self) -> Result<u32, PgsError> {
        let b = self.read_bytes(3).await?;
        Ok(((b[0] as u32) << 16) | ((b[1] as u32) << 8) | (b[2] as u32))
    }

    async fn read_u32(&mut self) -> Result<u32, PgsError> {
        let b = self.read_bytes(4).await?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

impl<S: ByteSource + ?Sized> ReadFieldsExt for S {}

/// Byte source over one contiguous in-memory buffer.
///
/// `read_bytes` returns zero-copy slices of the backing [`Bytes`].
pub struct BufferSource {
    data: Bytes,
    position: usize,
}

impl BufferSource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            position: 0,
        }
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

impl From<Vec<u8>> for BufferSource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for BufferSource {
    fn from(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }
}

#[async_trait]
impl ByteSource for BufferSource {
    fn position(&self) -> usize {
        self.position
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    async fn at_end(&mut self) -> bool {
        self.remaining() == 0
    }

    async fn read_byte(&mut self) -> Result<u8, PgsError> {
        if self.remaining() == 0 {
            return Err(PgsError::UnexpectedEnd {
                position: self.position,
            });
        }
        let byte = self.data[self.position];
        self.position += 1;
        Ok(byte)
    }

    async fn read_bytes(&mut self, n: usize) -> Result<Bytes, PgsError> {
        if self.remaining() < n {
            return Err(PgsError::UnexpectedEnd {
                position: self.data.len(),
            });
        }
        let out = self.data.slice(self.position..self.position + n);
        self.position += n;
        Ok(out)
    }
}

/// Byte source over an ordered sequence of buffers, presented as one
/// logical stream without copying the chunks together.
///
/// Reads within a chunk stay zero-copy; a read crossing a chunk boundary
/// assembles an owned copy.
pub struct ChunkedSource {
    chunks: Vec<Bytes>,
    chunk: usize,
    offset: usize,
    position: usize,
    total: usize,
}

impl ChunkedSource {
    pub fn new(chunks: Vec<Bytes>) -> Self {
        let total = chunks.iter().map(Bytes::len).sum();
        Self {
            chunks,
            chunk: 0,
            offset: 0,
            position: 0,
            total,
        }
    }

    /// Skip exhausted chunks so the cursor rests on readable data.
    fn settle(&mut self) {
        while self.chunk < self.chunks.len() && self.offset >= self.chunks[self.chunk].len() {
            self.chunk += 1;
            self.offset = 0;
        }
    }
}

#[async_trait]
impl ByteSource for ChunkedSource {
    fn position(&self) -> usize {
        self.position
    }

    fn len(&self) -> usize {
        self.total
    }

    async fn at_end(&mut self) -> bool {
        self.position >= self.total
    }

    async fn read_byte(&mut self) -> Result<u8, PgsError> {
        self.settle();
        if self.chunk >= self.chunks.len() {
            return Err(PgsError::UnexpectedEnd {
                position: self.position,
            });
        }
        let byte = self.chunks[self.chunk][self.offset];
        self.offset += 1;
        self.position += 1;
        Ok(byte)
    }

    async fn read_bytes(&mut self, n: usize) -> Result<Bytes, PgsError> {
        if self.total - self.position < n {
            return Err(PgsError::UnexpectedEnd {
                position: self.total,
            });
        }
        if n == 0 {
            // With every chunk exhausted there is no chunk to settle on.
            return Ok(Bytes::new());
        }
        self.settle();

        let current = &self.chunks[self.chunk];
        if current.len() - self.offset >= n {
            let out = current.slice(self.offset..self.offset + n);
            self.offset += n;
            self.position += n;
            return Ok(out);
        }

        // Boundary crossing: gather from as many chunks as needed.
        let mut out = BytesMut::with_capacity(n);
        while out.len() < n {
            self.settle();
            let current = &self.chunks[self.chunk];
            let take = (n - out.len()).min(current.len() - self.offset);
            out.extend_from_slice(&current[self.offset..self.offset + take]);
            self.offset += take;
        }
        self.position += n;
        Ok(out.freeze())
    }
}

/// Byte source fed incrementally by an asynchronous supplier, e.g. a
/// network response body.
///
/// The supplier pushes [`ChunkResult`] items into the channel; dropping the
/// sender signals end-of-data, and an `Err` item is surfaced as a transport
/// failure on the next read. Reading past the buffered chunk suspends until
/// the next one arrives.
pub struct StreamSource {
    rx: mpsc::Receiver<ChunkResult>,
    current: Bytes,
    position: usize,
    received: usize,
    done: bool,
    pending: Option<PgsError>,
}

impl StreamSource {
    pub fn new(rx: mpsc::Receiver<ChunkResult>) -> Self {
        Self {
            rx,
            current: Bytes::new(),
            position: 0,
            received: 0,
            done: false,
            pending: None,
        }
    }

    /// Create a source together with the sender half of its chunk channel.
    pub fn channel(buffer: usize) -> (mpsc::Sender<ChunkResult>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx))
    }

    /// Await chunks until data is buffered or the supplier is exhausted.
    async fn refill(&mut self) -> Result<(), PgsError> {
        while self.current.is_empty() && !self.done {
            match self.rx.recv().await {
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => {
                    self.received += chunk.len();
                    self.current = chunk;
                }
                Some(Err(err)) => {
                    self.done = true;
                    return Err(err);
                }
                None => self.done = true,
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ByteSource for StreamSource {
    fn position(&self) -> usize {
        self.position
    }

    fn len(&self) -> usize {
        self.received
    }

    async fn at_end(&mut self) -> bool {
        if !self.current.is_empty() || self.pending.is_some() {
            return false;
        }
        match self.refill().await {
            // A supplier failure is not end-of-data; the next read reports it.
            Err(err) => {
                self.pending = Some(err);
                false
            }
            Ok(()) => self.current.is_empty(),
        }
    }

    async fn read_byte(&mut self) -> Result<u8, PgsError> {
        if let Some(err) = self.pending.take() {
            return Err(err);
        }
        self.refill().await?;
        if self.current.is_empty() {
            return Err(PgsError::UnexpectedEnd {
                position: self.position,
            });
        }
        let byte = self.current[0];
        self.current.advance(1);
        self.position += 1;
        Ok(byte)
    }

    async fn read_bytes(&mut self, n: usize) -> Result<Bytes, PgsError> {
        if let Some(err) = self.pending.take() {
            return Err(err);
        }
        if n == 0 {
            // Never wait on the supplier for an empty read.
            return Ok(Bytes::new());
        }
        self.refill().await?;

        if self.current.len() >= n {
            let out = self.current.split_to(n);
            self.position += n;
            return Ok(out);
        }

        let mut out = BytesMut::with_capacity(n);
        while out.len() < n {
            if self.current.is_empty() {
                self.refill().await?;
                if self.current.is_empty() {
                    return Err(PgsError::UnexpectedEnd {
                        position: self.position + out.len(),
                    });
                }
            }
            let take = (n - out.len()).min(self.current.len());
            out.extend_from_slice(&self.current[..take]);
            self.current.advance(take);
        }
        self.position += n;
        Ok(out.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_buffer_source_reads() {
        let mut source = BufferSource::from(vec![0x01, 0x02, 0x03, 0x04, 0x05]);

        assert_eq!(source.len(), 5);
        assert!(!source.at_end().await);
        assert_eq!(source.read_byte().await.unwrap(), 0x01);
        assert_eq!(&source.read_bytes(3).await.unwrap()[..], &[0x02, 0x03, 0x04]);
        assert_eq!(source.position(), 4);

        assert_eq!(source.read_bytes_owned(1).await.unwrap(), vec![0x05]);
        assert!(source.at_end().await);
        assert!(matches!(
            source.read_byte().await,
            Err(PgsError::UnexpectedEnd { position: 5 })
        ));
    }

    #[tokio::test]
    async fn test_buffer_source_fields() {
        let mut source = BufferSource::from(vec![0xAB, 0x01, 0x02, 0x03, 0x04, 0x05, 0x00, 0x01, 0x00, 0x00]);

        assert_eq!(source.read_u8().await.unwrap(), 0xAB);
        assert_eq!(source.read_u16().await.unwrap(), 0x0102);
        assert_eq!(source.read_u24().await.unwrap(), 0x030405);
        assert_eq!(source.read_u32().await.unwrap(), 0x0001_0000);
    }

    #[tokio::test]
    async fn test_chunked_source_crosses_boundaries() {
        let chunks = vec![
            Bytes::from_static(&[0x01, 0x02]),
            Bytes::from_static(&[]),
            Bytes::from_static(&[0x03]),
            Bytes::from_static(&[0x04, 0x05, 0x06]),
        ];
        let mut chunked = ChunkedSource::new(chunks);
        let mut flat = BufferSource::from(vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);

        assert_eq!(chunked.len(), flat.len());
        assert_eq!(
            chunked.read_byte().await.unwrap(),
            flat.read_byte().await.unwrap()
        );
        // This read spans three chunk boundaries.
        assert_eq!(
            &chunked.read_bytes(4).await.unwrap()[..],
            &flat.read_bytes(4).await.unwrap()[..]
        );
        assert_eq!(chunked.position(), flat.position());
        assert_eq!(
            chunked.read_bytes(1).await.unwrap(),
            flat.read_bytes(1).await.unwrap()
        );
        assert!(chunked.at_end().await);
        assert!(chunked.read_bytes(1).await.is_err());
    }

    #[tokio::test]
    async fn test_chunked_source_empty_read_at_end() {
        let mut source = ChunkedSource::new(vec![Bytes::from_static(&[0x01])]);

        assert_eq!(source.read_byte().await.unwrap(), 0x01);
        assert!(source.at_end().await);
        // Empty payloads are read even once the chunks are used up.
        assert_eq!(source.read_bytes(0).await.unwrap(), Bytes::new());
        assert_eq!(source.position(), 1);
    }

    #[tokio::test]
    async fn test_chunked_source_zero_copy_within_chunk() {
        let backing = Bytes::from_static(&[0x0A, 0x0B, 0x0C, 0x0D]);
        let mut source = ChunkedSource::new(vec![backing.clone()]);

        let view = source.read_bytes(2).await.unwrap();
        assert_eq!(&view[..], &[0x0A, 0x0B]);
        // The view points into the original allocation.
        assert_eq!(view.as_ptr(), backing.as_ptr());
    }

    #[tokio::test]
    async fn test_stream_source_suspends_until_chunks_arrive() {
        let (tx, mut source) = StreamSource::channel(4);

        let feeder = tokio::spawn(async move {
            tx.send(Ok(Bytes::from_static(&[0x01, 0x02]))).await.unwrap();
            tx.send(Ok(Bytes::from_static(&[0x03, 0x04, 0x05]))).await.unwrap();
            // Dropping the sender ends the stream.
        });

        assert_eq!(source.read_byte().await.unwrap(), 0x01);
        assert_eq!(
            &source.read_bytes(3).await.unwrap()[..],
            &[0x02, 0x03, 0x04]
        );
        assert_eq!(source.read_byte().await.unwrap(), 0x05);
        assert!(source.at_end().await);
        assert_eq!(source.position(), 5);
        assert_eq!(source.len(), 5);

        feeder.await.unwrap();
    }

    #[tokio::test]
    async fn test_stream_source_transport_failure() {
        let (tx, mut source) = StreamSource::channel(4);
        tx.send(Ok(Bytes::from_static(&[0x01]))).await.unwrap();
        tx.send(Err(PgsError::Transport("connection reset".into())))
            .await
            .unwrap();
        drop(tx);

        assert_eq!(source.read_byte().await.unwrap(), 0x01);
        // The failure is discovered while answering at_end and surfaced on
        // the following read.
        assert!(!source.at_end().await);
        assert!(matches!(
            source.read_byte().await,
            Err(PgsError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_stream_source_truncated_read() {
        let (tx, mut source) = StreamSource::channel(4);
        tx.send(Ok(Bytes::from_static(&[0x01, 0x02]))).await.unwrap();
        drop(tx);

        assert!(matches!(
            source.read_bytes(4).await,
            Err(PgsError::UnexpectedEnd { position: 2 })
        ));
    }
}
