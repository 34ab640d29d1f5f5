use sluice_queue::{MpscQueue, RingConfig, StopMarker};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub struct Tick {
    pub producer: usize,
    pub counter: u64,
}

#[derive(Debug)]
pub struct SoakReport {
    /// Last counter the consumer saw from each producer.
    pub last_counter: Vec<u64>,
    pub drained: u64,
    /// Items whose counter did not follow the producer's previous one.
    pub out_of_order: u64,
    /// Items whose slot index did not match their sequence.
    pub misplaced: u64,
    pub stop: StopMarker,
    pub elapsed: Duration,
}

impl SoakReport {
    pub fn is_clean(&self, items_per_producer: u64) -> bool {
        self.out_of_order == 0
            && self.misplaced == 0
            && self.last_counter.iter().all(|&c| c == items_per_producer)
            && self.drained == items_per_producer * self.last_counter.len() as u64
    }
}

/// Runs `producers` threads, each sending counters `1..=items`, and a
/// consumer that records what arrived until the stop marker.
pub fn run(ring: RingConfig, producers: usize, items: u64) -> SoakReport {
    let queue = MpscQueue::<Tick>::new(ring);
    let capacity = queue.config().capacity as u64;
    let start = Instant::now();

    thread::scope(|s| {
        let consumer = thread::Builder::new()
            .name("sluice-consumer".into())
            .spawn_scoped(s, || {
                let mut consumer = queue.consumer().expect("fresh queue has no consumer");
                let mut last_counter = vec![0u64; producers];
                let mut drained = 0u64;
                let mut out_of_order = 0u64;
                let mut misplaced = 0u64;

                let stop = consumer.drain_until_stop(|item| {
                    let Tick { producer, counter } = item.payload;
                    if counter != last_counter[producer] + 1 {
                        out_of_order += 1;
                    }
                    if item.metadata.index as u64 != item.metadata.sequence % capacity {
                        misplaced += 1;
                    }
                    last_counter[producer] = counter;
                    drained += 1;
                });

                SoakReport {
                    last_counter,
                    drained,
                    out_of_order,
                    misplaced,
                    stop,
                    elapsed: Duration::ZERO,
                }
            })
            .expect("failed to spawn consumer thread");

        let handles: Vec<_> = (0..producers)
            .map(|producer| {
                let queue = &queue;
                thread::Builder::new()
                    .name(format!("sluice-producer-{producer}"))
                    .spawn_scoped(s, move || {
                        for counter in 1..=items {
                            queue.enqueue(Tick { producer, counter });
                        }
                        debug!(producer, items, "producer finished");
                    })
                    .expect("failed to spawn producer thread")
            })
            .collect();

        for h in handles {
            h.join().expect("producer panicked");
        }

        let stop = queue.enqueue_stop();
        info!(sequence = stop.sequence, index = stop.index, "stop marker enqueued");

        let mut report = consumer.join().expect("consumer panicked");
        report.elapsed = start.elapsed();
        report
    })
}
