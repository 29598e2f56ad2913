use std::sync::Barrier;

use notesapi_core::Who;
use notesapi_engine::RaceWindow;

/// Holds every caller inside the race window until `parties` of them have
/// arrived. With one party per concurrent caller, all reads happen before any
/// write, so the lost update is reproduced without depending on timing.
pub struct BarrierWindow {
    barrier: Barrier,
}

impl BarrierWindow {
    pub fn new(parties: usize) -> Self {
        Self {
            barrier: Barrier::new(parties),
        }
    }
}

impl RaceWindow for BarrierWindow {
    fn open(&self, _who: &Who, _observed: i64) {
        self.barrier.wait();
    }
}

/// Calls `f(0..n)` on `n` threads at once and returns the results in index order.
pub fn run_concurrently<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    let start = Barrier::new(n);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..n)
            .map(|i| {
                let f = &f;
                let start = &start;
                scope.spawn(move || {
                    start.wait();
                    f(i)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(value) => value,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}
