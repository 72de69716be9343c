use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use log::debug;

use crate::block_buffer::BlockBuffer;
use crate::buffer_pool::BufferPool;

/// Target for the total number of buffered bytes in flight between the reading and
/// writing sides of a copy.
const IN_FLIGHT_BYTE_BUDGET: u64 = 1 << 30; // 1 GiB
/// Cap on the buffer count derived from the budget, so that tiny unit sizes don't
/// produce an absurdly deep queue.
const MAX_IN_FLIGHT_BUFFERS: usize = 8192;

/// How many buffers the hand-off queue (and the pool's holding area) may hold.
fn queue_depth(input_unit: usize) -> usize {
    let by_budget = IN_FLIGHT_BYTE_BUDGET / input_unit as u64;
    std::cmp::max(1, std::cmp::min(by_budget, MAX_IN_FLIGHT_BUFFERS as u64) as usize)
}

/// Copies `source` to `sink`, reading `input_unit` bytes per read call and writing
/// `output_unit` bytes per write call, until the source reports end-of-stream or
/// either side fails. `bytes_written` is advanced as writes complete, so another
/// thread can watch throughput while the copy runs.
///
/// Reading and writing happen concurrently: a producer thread fills buffers from
/// the source and hands them to this thread over a bounded FIFO queue, and this
/// thread drains them to the sink in arrival order. The queue is sized from the
/// in-flight byte budget, so a slow sink applies backpressure to the producer
/// rather than letting it buffer the whole input.
pub fn copy(
    source: &mut (impl Read + Send),
    sink: &mut impl Write,
    input_unit: usize,
    output_unit: usize,
    bytes_written: &AtomicU64,
) -> io::Result<()> {
    if input_unit == 0 || output_unit == 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "Unit sizes must not be zero"));
    }
    copy_with_depth(source, sink, input_unit, output_unit, queue_depth(input_unit), bytes_written)
}

fn copy_with_depth(
    source: &mut (impl Read + Send),
    sink: &mut impl Write,
    input_unit: usize,
    output_unit: usize,
    depth: usize,
    bytes_written: &AtomicU64,
) -> io::Result<()> {
    // The pool and the hand-off queue are the only state shared between the two
    // sides, and both are internally synchronized. The pool (and any buffers parked
    // in it) is released when this function returns, on every path.
    let pool = BufferPool::new(input_unit, output_unit, depth);
    let (filled_tx, filled_rx) = crossbeam::channel::bounded::<BlockBuffer>(depth);
    // One-shot signal raised by the consumer so the producer stops reading promptly
    // after a sink failure, rather than running on until the queue fills.
    let stop = AtomicBool::new(false);

    crossbeam::scope(|scope| {
        let pool = &pool;
        let stop = &stop;
        let producer = scope
            .builder()
            .name("copy producer".to_string())
            .spawn(move |_| -> io::Result<()> {
                loop {
                    if stop.load(Ordering::Relaxed) {
                        debug!("Producer stopping: shutdown signalled");
                        return Ok(());
                    }
                    let mut buffer = pool.get();
                    match buffer.fill_from(source) {
                        // A read of zero bytes with no error is the end of the stream,
                        // not a hint to try again.
                        Ok(0) => return Ok(()),
                        Ok(_) => {
                            // The only point the producer may block: a full queue means
                            // the sink is behind and the memory budget is spent.
                            // A send error means the consumer dropped its receiver after
                            // a sink failure - that's a stop request, not an error of ours.
                            if filled_tx.send(buffer).is_err() {
                                debug!("Producer stopping: consumer is gone");
                                return Ok(());
                            }
                        }
                        Err(e) => return Err(e),
                    }
                }
                // Returning drops filled_tx, closing the queue so the consumer sees
                // end-of-input once it has drained what's already there.
            })
            .expect("Failed to spawn thread");

        // Consumer runs on this thread: drain buffers to the sink in the order they
        // were read, counting only bytes actually handed to a successful write call.
        let mut consumer_result: io::Result<()> = Ok(());
        while let Ok(mut buffer) = filled_rx.recv() {
            match buffer.drain_to(sink) {
                Ok(written) => {
                    bytes_written.fetch_add(written as u64, Ordering::Relaxed);
                    pool.put(buffer);
                }
                Err(e) => {
                    debug!("Consumer stopping: {e}");
                    consumer_result = Err(e);
                    stop.store(true, Ordering::Relaxed);
                    break;
                }
            }
        }
        // Dropping the receiver unblocks a producer waiting on a full queue. Any
        // buffers still queued are abandoned, not drained - the sink is already
        // known to be broken.
        drop(filled_rx);

        let producer_result = producer.join().expect("Failed to join thread");

        // The producer's error wins; a producer stopped by the shutdown signal or the
        // closed queue reports no error, so a sink failure still surfaces.
        match producer_result {
            Err(e) => Err(e),
            Ok(()) => consumer_result,
        }
    })
    .expect("Producer thread panicked")
}
