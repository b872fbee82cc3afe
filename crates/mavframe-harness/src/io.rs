//! In-memory and faulty stream fixtures.

use std::{
    collections::VecDeque,
    io::{self, Read, Write},
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
};

use parking_lot::Mutex;

/// Cloneable in-memory sink. All clones share the same bytes.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far
    pub fn contents(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }

    /// Take everything written so far, leaving the buffer empty
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.bytes.lock())
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reader that returns at most `chunk` bytes per call.
#[derive(Debug, Clone)]
pub struct ChunkedReader {
    data: Vec<u8>,
    offset: usize,
    chunk: usize,
}

impl ChunkedReader {
    /// Serve `data` in pieces of at most `chunk` bytes (minimum 1).
    pub fn new(data: Vec<u8>, chunk: usize) -> Self {
        Self { data, offset: 0, chunk: chunk.max(1) }
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.data[self.offset..];
        let n = remaining.len().min(out.len()).min(self.chunk);
        out[..n].copy_from_slice(&remaining[..n]);
        self.offset += n;
        Ok(n)
    }
}

/// Writer whose every write fails with the given error kind.
#[derive(Debug, Clone, Copy)]
pub struct FailingWriter {
    kind: io::ErrorKind,
}

impl FailingWriter {
    /// Fail with `kind`
    pub fn new(kind: io::ErrorKind) -> Self {
        Self { kind }
    }
}

impl Write for FailingWriter {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(self.kind, "injected write failure"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(self.kind, "injected flush failure"))
    }
}

/// One scripted response of a [`ScriptedReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadStep {
    /// Deliver these bytes, possibly across several reads
    Data(Vec<u8>),
    /// Fail one read with this kind
    Error(io::ErrorKind),
}

/// Reader that replays a script of data and errors, then reports end of stream.
#[derive(Debug, Clone, Default)]
pub struct ScriptedReader {
    steps: VecDeque<ReadStep>,
}

impl ScriptedReader {
    /// Replay `steps` in order.
    pub fn new(steps: impl IntoIterator<Item = ReadStep>) -> Self {
        Self { steps: steps.into_iter().collect() }
    }
}

impl Read for ScriptedReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        match self.steps.pop_front() {
            None => Ok(0),
            Some(ReadStep::Error(kind)) => Err(io::Error::new(kind, "injected read failure")),
            Some(ReadStep::Data(mut data)) => {
                let n = data.len().min(out.len());
                out[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.steps.push_front(ReadStep::Data(data.split_off(n)));
                }
                Ok(n)
            },
        }
    }
}

/// Write end of [`pipe`]. Dropping every clone ends the read side's stream.
#[derive(Debug, Clone)]
pub struct PipeWriter {
    tx: Sender<Vec<u8>>,
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.tx.send(buf.to_vec()).map_err(|_| io::Error::from(io::ErrorKind::BrokenPipe))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Read end of [`pipe`]. Blocks until data arrives or every writer is gone.
#[derive(Debug)]
pub struct PipeReader {
    rx: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
}

impl Read for PipeReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.rx.recv() {
                Ok(chunk) => self.pending.extend(chunk),
                Err(_) => return Ok(0),
            }
        }
        self.pending.read(out)
    }
}

/// Blocking in-memory byte pipe for cross-thread tests.
pub fn pipe() -> (PipeReader, PipeWriter) {
    let (tx, rx) = mpsc::channel();
    (PipeReader { rx, pending: VecDeque::new() }, PipeWriter { tx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunked_reader_limits_reads() {
        let mut reader = ChunkedReader::new(vec![1, 2, 3, 4, 5], 2);
        let mut out = [0u8; 8];
        assert_eq!(reader.read(&mut out).ok(), Some(2));
        assert_eq!(reader.read(&mut out).ok(), Some(2));
        assert_eq!(reader.read(&mut out).ok(), Some(1));
        assert_eq!(reader.read(&mut out).ok(), Some(0));
    }

    #[test]
    fn scripted_reader_replays_errors() {
        let mut reader = ScriptedReader::new([
            ReadStep::Data(vec![1, 2]),
            ReadStep::Error(io::ErrorKind::TimedOut),
            ReadStep::Data(vec![3]),
        ]);
        let mut out = [0u8; 1];

        assert_eq!(reader.read(&mut out).ok(), Some(1));
        assert_eq!(reader.read(&mut out).ok(), Some(1));
        assert_eq!(reader.read(&mut out).err().map(|e| e.kind()), Some(io::ErrorKind::TimedOut));
        assert_eq!(reader.read(&mut out).ok(), Some(1));
        assert_eq!(out, [3]);
        assert_eq!(reader.read(&mut out).ok(), Some(0));
    }

    #[test]
    fn shared_buffer_clones_share_bytes() {
        let buffer = SharedBuffer::new();
        let mut writer = buffer.clone();
        writer.write_all(&[9, 8]).expect("in-memory write");

        assert_eq!(buffer.contents(), vec![9, 8]);
        assert_eq!(buffer.take(), vec![9, 8]);
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn pipe_ends_when_writer_dropped() {
        let (mut reader, mut writer) = pipe();
        writer.write_all(&[1, 2, 3]).expect("pipe open");
        drop(writer);

        let mut out = Vec::new();
        reader.read_to_end(&mut out).expect("pipe drained");
        assert_eq!(out, vec![1, 2, 3]);
    }
}
