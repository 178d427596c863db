use std::io::{BufReader, BufWriter, Read, Write};

use super::frame::{Frame, FrameError, FRAME_SIZE};

pub struct FrameReader<I: Read> {
    inner: BufReader<I>,
}
impl<I: Read> FrameReader<I> {
    // Creates a new frame reader with the given input stream.
    pub fn new(input: I) -> Self {
        Self {
            inner: BufReader::new(input),
        }
    }

    /// Reads the next 8 raw bytes.
    pub fn read_raw(&mut self) -> std::io::Result<[u8; FRAME_SIZE]> {
        let mut buffer = [0; FRAME_SIZE];
        self.inner.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Reads a frame.
    pub fn read_frame(&mut self) -> std::io::Result<Result<Frame, FrameError>> {
        Ok(Frame::decode(&self.read_raw()?))
    }
}

pub struct FrameWriter<O: Write> {
    inner: BufWriter<O>,
}
impl<O: Write> FrameWriter<O> {
    // Creates a new frame writer with the given output stream.
    pub fn new(output: O) -> Self {
        Self {
            inner: BufWriter::new(output),
        }
    }

    /// Sends a frame.
    pub fn send_frame(&mut self, frame: Frame) -> std::io::Result<()> {
        self.send_raw(&frame.encode())
    }

    /// Sends raw bytes as they were received.
    pub fn send_raw(&mut self, bytes: &[u8; FRAME_SIZE]) -> std::io::Result<()> {
        self.inner.write_all(bytes)?;
        self.inner.flush()
    }

    /// The underlying output stream.
    pub fn get_ref(&self) -> &O {
        self.inner.get_ref()
    }
}
