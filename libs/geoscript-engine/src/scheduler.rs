//! Cooperative background build scheduler.
//!
//! One document owns one `BuildScheduler`. Submitting a build spawns it
//! onto a `tokio` blocking task (parsing/evaluation/BSP/CSG are CPU-bound
//! and synchronous — there is nothing to `.await` inside them) and bumps
//! a generation counter; the previous generation's cancellation check
//! starts reporting "cancelled" at its next checkpoint, superseding it
//! without needing to kill the task — cancellation is cooperative and
//! idempotent, so a new build simply supersedes any build in flight.
//! Progress is observed through a `tokio::sync::watch` channel carrying
//! the monotonic `waiting → (partial)* → (success | failure | cancelled)`
//! sequence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use geoscript_diagnostics::{Diagnostic, Span};
use geoscript_eval::{eval_source, CompileError, Delegate, EvalError, Scene};
use tokio::sync::watch;

use crate::cache::GeometryCache;

/// One snapshot of build progress. `Partial`/`Success` carry the same
/// `Arc<Scene>` resent as the build progresses — each top-level child's
/// `Geometry::mesh` field (a `OnceLock`) fills in in place as it finishes,
/// so a subscriber holding an old `Partial` can simply look again at the
/// fields it cares about rather than needing a fresh message per node —
/// mesh fields for still-building nodes simply aren't filled in yet.
#[derive(Debug, Clone)]
pub enum BuildStatus {
    Waiting,
    Partial(Arc<Scene>),
    Success(Arc<Scene>),
    Failed(Diagnostic),
    Cancelled,
}

/// Runs at most one build job at a time for one document.
pub struct BuildScheduler {
    cache: Arc<GeometryCache>,
    generation: Arc<AtomicU64>,
    status_tx: watch::Sender<BuildStatus>,
}

impl BuildScheduler {
    pub fn new(cache: Arc<GeometryCache>) -> Self {
        let (status_tx, _rx) = watch::channel(BuildStatus::Waiting);
        BuildScheduler { cache, generation: Arc::new(AtomicU64::new(0)), status_tx }
    }

    /// A fresh receiver observing this scheduler's status sequence from
    /// `Waiting` onward.
    pub fn subscribe(&self) -> watch::Receiver<BuildStatus> {
        self.status_tx.subscribe()
    }

    /// Submits a new build, superseding whatever is in flight. Must be
    /// called from within a tokio runtime context (the caller owns the
    /// runtime; this crate doesn't start one of its own, matching the
    /// teacher's LSP-transport use of `tokio` as a library, not an
    /// application framework).
    pub fn submit(&self, source: String, delegate: Arc<dyn Delegate + Send + Sync>) {
        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = self.generation.clone();
        let cache = self.cache.clone();
        let status_tx = self.status_tx.clone();
        let _ = status_tx.send(BuildStatus::Waiting);

        tokio::task::spawn_blocking(move || {
            let is_superseded = move || generation.load(Ordering::SeqCst) != my_generation;
            let status = run_build(&source, delegate.as_ref(), &cache, &status_tx, &is_superseded);
            let _ = status_tx.send(status);
        });
    }
}

fn run_build<C: Fn() -> bool>(
    source: &str,
    delegate: &dyn Delegate,
    cache: &GeometryCache,
    status_tx: &watch::Sender<BuildStatus>,
    cancel: &C,
) -> BuildStatus {
    let scene = match eval_source(source, cancel, delegate) {
        Ok(scene) => Arc::new(scene),
        Err(CompileError::Cancelled) => return BuildStatus::Cancelled,
        Err(CompileError::Diagnostic(d)) => return BuildStatus::Failed(d),
    };
    let _ = status_tx.send(BuildStatus::Partial(scene.clone()));

    for child in &scene.children {
        if cancel() {
            return BuildStatus::Cancelled;
        }
        match cache.build(child, cancel) {
            Ok(_) => {
                let _ = status_tx.send(BuildStatus::Partial(scene.clone()));
            }
            Err(EvalError::Cancelled) => return BuildStatus::Cancelled,
            Err(other) => return BuildStatus::Failed(other.into_diagnostic(Span::point(0))),
        }
    }
    BuildStatus::Success(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscript_eval::NullDelegate;

    #[tokio::test]
    async fn build_reaches_success() {
        let scheduler = BuildScheduler::new(Arc::new(GeometryCache::new()));
        let mut rx = scheduler.subscribe();
        scheduler.submit("cube { size 2 }".to_string(), Arc::new(NullDelegate));
        loop {
            rx.changed().await.unwrap();
            match &*rx.borrow() {
                BuildStatus::Success(scene) => {
                    assert_eq!(scene.children.len(), 1);
                    break;
                }
                BuildStatus::Failed(d) => panic!("build failed: {d}"),
                BuildStatus::Cancelled => panic!("build unexpectedly cancelled"),
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn new_submission_supersedes_the_previous_one() {
        let scheduler = BuildScheduler::new(Arc::new(GeometryCache::new()));
        let mut rx = scheduler.subscribe();
        scheduler.submit("cube { size 1 }".to_string(), Arc::new(NullDelegate));
        scheduler.submit("cube { size 2 }".to_string(), Arc::new(NullDelegate));

        let mut saw_success = false;
        loop {
            rx.changed().await.unwrap();
            match &*rx.borrow() {
                BuildStatus::Success(_) => {
                    saw_success = true;
                    break;
                }
                BuildStatus::Failed(d) => panic!("build failed: {d}"),
                _ => continue,
            }
        }
        assert!(saw_success);
    }
}
