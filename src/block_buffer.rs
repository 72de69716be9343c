use std::io::{self, Read, Write};

/// A fixed-capacity buffer that absorbs bytes from a source in one unit size and
/// re-emits them to a sink in a different unit size.
///
/// A buffer is either empty (owned by the pool, contents meaningless) or filled
/// (owned by the copy pipeline, with `valid_len` bytes of real data). Filling
/// simply overwrites whatever the previous use left behind.
pub struct BlockBuffer {
    /// Backing storage, allocated once at `input_capacity` bytes.
    data: Vec<u8>,
    /// How many bytes of `data` were filled by the last read.
    valid_len: usize,
    /// How many bytes each write call to the sink should carry.
    output_unit: usize,
}

impl BlockBuffer {
    pub fn new(input_capacity: usize, output_unit: usize) -> BlockBuffer {
        BlockBuffer {
            data: vec![0; input_capacity],
            valid_len: 0,
            output_unit,
        }
    }

    /// Fills the buffer with a single read call, returning the number of bytes obtained.
    /// Zero means the source is finished - a read that legitimately returns no bytes and
    /// no error is end-of-stream, never "try again".
    pub fn fill_from(&mut self, source: &mut impl Read) -> io::Result<usize> {
        let read = source.read(&mut self.data)?;
        self.valid_len = read;
        Ok(read)
    }

    /// Writes the buffer's valid content to the sink in output-unit-sized slices, in
    /// order, returning the total number of bytes written. The final slice may be
    /// shorter than the unit if the fill didn't land on a unit boundary.
    ///
    /// A write call that accepts fewer bytes than requested is fatal - the sink is
    /// not assumed to support resuming a partial write, so nothing is retried.
    pub fn drain_to(&mut self, sink: &mut impl Write) -> io::Result<usize> {
        for slice in self.data[..self.valid_len].chunks(self.output_unit) {
            let written = sink.write(slice)?;
            if written < slice.len() {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("Short write: sink accepted {} of {} bytes", written, slice.len()),
                ));
            }
        }
        Ok(self.valid_len)
    }
}
