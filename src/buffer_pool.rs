use crossbeam::channel::{Receiver, Sender};

use crate::block_buffer::BlockBuffer;

/// A bounded reservoir of reusable `BlockBuffer`s, shared between the producer and
/// consumer of a copy operation so that sustained throughput doesn't allocate a
/// fresh buffer per block.
///
/// Both operations are non-blocking: `get` falls back to the factory when the
/// reservoir is empty, and `put` silently discards the buffer when the reservoir
/// is full. A full reservoir means the pipeline already has plenty of spare
/// buffers, so dropping one only costs reuse efficiency, never correctness.
///
/// The holding area is a bounded crossbeam channel, which also caps how many
/// buffers can be parked at once. It closes when the pool is dropped, which the
/// orchestrator guarantees happens on every exit path, including early error
/// returns.
pub struct BufferPool {
    factory: Box<dyn Fn() -> BlockBuffer + Send + Sync>,
    slots_tx: Sender<BlockBuffer>,
    slots_rx: Receiver<BlockBuffer>,
}

impl BufferPool {
    /// `capacity` is the maximum number of parked buffers, derived by the caller
    /// from its in-flight memory budget.
    pub fn new(input_capacity: usize, output_unit: usize, capacity: usize) -> BufferPool {
        let (slots_tx, slots_rx) = crossbeam::channel::bounded(capacity);
        BufferPool {
            factory: Box::new(move || BlockBuffer::new(input_capacity, output_unit)),
            slots_tx,
            slots_rx,
        }
    }

    /// Returns a parked buffer if one is available, otherwise allocates a new one.
    /// Never blocks, never fails.
    pub fn get(&self) -> BlockBuffer {
        match self.slots_rx.try_recv() {
            Ok(buffer) => buffer,
            Err(_) => (self.factory)(),
        }
    }

    /// Parks a buffer for reuse if there's room, otherwise lets it drop.
    /// Never blocks.
    pub fn put(&self, buffer: BlockBuffer) {
        let _ = self.slots_tx.try_send(buffer);
    }
}
