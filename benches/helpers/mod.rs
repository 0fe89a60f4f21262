use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::runtime::Runtime;

use stepsort::{CallbackSink, EngineEvent, NoDelay, SortEngine};

pub fn bench_runtime() -> Runtime {
    Runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build runtime")
}

/// Engine with no throttling whose sink drops every event.
pub fn discarding_engine() -> SortEngine {
    let sink = CallbackSink::new(|_event: EngineEvent| Ok(()));
    SortEngine::builder(sink)
        .delay_provider(Arc::new(NoDelay))
        .build()
        .expect("default config is valid")
}

/// Seeded random values in `1..=max`, identical on every bench run.
pub fn scrambled(len: usize, max: u32) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    (0..len).map(|_| rng.gen_range(1..=max)).collect()
}
