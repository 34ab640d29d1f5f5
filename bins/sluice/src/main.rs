mod soak;

use anyhow::{Context, bail};
use sluice_config::SluiceConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => SluiceConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => SluiceConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .init();

    info!(
        capacity = config.ring.capacity,
        producers = config.producers,
        items_per_producer = config.items_per_producer,
        "SLUICE: starting soak"
    );

    let report = soak::run(config.ring, config.producers, config.items_per_producer);
    let rate = report.drained as f64 / report.elapsed.as_secs_f64();

    info!(
        drained = report.drained,
        elapsed = ?report.elapsed,
        "SLUICE: drained ~ {rate:.0} items/s"
    );
    for (producer, last) in report.last_counter.iter().enumerate() {
        info!(producer, last, "SLUICE: producer final counter");
    }

    if !report.is_clean(config.items_per_producer) {
        bail!(
            "soak failed: out_of_order={} misplaced={} drained={} last_counter={:?}",
            report.out_of_order,
            report.misplaced,
            report.drained,
            report.last_counter
        );
    }

    info!(stop_sequence = report.stop.metadata.sequence, "SLUICE: soak clean");
    Ok(())
}
