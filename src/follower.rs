//! Progress reporting.
//!
//! Long proofs take minutes; the prover and verifier publish coarse events
//! to a process-global sink so a CLI can render progress. The sink is
//! injectable and defaults to nothing, so library users and tests pay one
//! atomic read per event. The range-proof machinery ticks once per
//! invocation, which doubles as the observability hook test suites use to
//! count range proofs.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

pub trait Follower: Send + Sync {
    /// A named phase with `intermediates` expected ticks has started.
    fn step_start(&self, desc: &str, intermediates: usize);
    /// The current phase finished.
    fn step_done(&self);
    /// One unit of work inside the current phase completed.
    fn tick(&self);
}

static SINK: Lazy<RwLock<Option<Arc<dyn Follower>>>> = Lazy::new(|| RwLock::new(None));

/// Installs the process-global follower. Passing `None` restores the no-op
/// default.
pub fn set_follower(follower: Option<Arc<dyn Follower>>) {
    *SINK.write() = follower;
}

pub fn step_start(desc: &str, intermediates: usize) {
    if let Some(f) = SINK.read().as_ref() {
        f.step_start(desc, intermediates);
    }
}

pub fn step_done() {
    if let Some(f) = SINK.read().as_ref() {
        f.step_done();
    }
}

pub fn tick() {
    if let Some(f) = SINK.read().as_ref() {
        f.tick();
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_reach_installed_sink() {
        let (_guard, follower) = testutil::counting_follower();
        tick();
        tick();
        assert_eq!(follower.count(), 2);
        set_follower(None);
        tick();
        assert_eq!(follower.count(), 2);
    }
}
