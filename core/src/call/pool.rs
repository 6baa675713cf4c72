use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crossbeam::queue::ArrayQueue;
use once_cell::sync::Lazy;
use tracing::trace;

use crate::config::{CallConfig, MAX_ARG_POOL_ALLOC, MAX_ARG_POOL_CAPACITY};

use super::Args;

/// Source of argument containers.
///
/// `release` must leave no values behind in the container; implementations may hand a
/// released container to any later, unrelated `checkout`.
pub trait ArgAllocator: Send + Sync + fmt::Debug {
    /// A cleared container with room for at least `min_size` slots.
    fn checkout(&self, min_size: usize) -> Args;

    fn release(&self, args: Args);
}

/// Bounded lock-free pool of argument containers.
///
/// Containers grow on checkout and never shrink; once `capacity` containers are parked,
/// further releases are dropped.
pub struct ArgPool {
    free: ArrayQueue<Args>,
    initial_alloc: usize,
    allocated: AtomicU64,
}

impl ArgPool {
    /// Sizes beyond the configuration limits are clamped.
    pub fn new(initial_alloc: usize, capacity: usize) -> Self {
        Self {
            free: ArrayQueue::new(capacity.clamp(1, MAX_ARG_POOL_CAPACITY)),
            initial_alloc: initial_alloc.min(MAX_ARG_POOL_ALLOC),
            allocated: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &CallConfig) -> Self {
        Self::new(config.arg_pool_alloc, config.arg_pool_capacity)
    }

    /// Containers allocated because the pool was empty.
    pub fn allocated(&self) -> u64 {
        self.allocated.load(Ordering::Relaxed)
    }

    /// Containers currently parked in the pool.
    pub fn pooled(&self) -> usize {
        self.free.len()
    }
}

impl Default for ArgPool {
    fn default() -> Self {
        Self::from_config(&CallConfig::default())
    }
}

impl fmt::Debug for ArgPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgPool")
            .field("pooled", &self.free.len())
            .field("capacity", &self.free.capacity())
            .field("initial_alloc", &self.initial_alloc)
            .field("allocated", &self.allocated())
            .finish()
    }
}

impl ArgAllocator for ArgPool {
    fn checkout(&self, min_size: usize) -> Args {
        match self.free.pop() {
            Some(mut args) => {
                args.grow(min_size);
                args
            }
            None => {
                let total = self.allocated.fetch_add(1, Ordering::Relaxed) + 1;
                trace!(
                    target: "callset::pool",
                    slots = min_size.max(self.initial_alloc),
                    total_allocated = total,
                    "arg_pool.alloc"
                );
                Args::with_capacity(min_size.max(self.initial_alloc))
            }
        }
    }

    fn release(&self, mut args: Args) {
        args.clear();
        if self.free.push(args).is_err() {
            trace!(target: "callset::pool", capacity = self.free.capacity(), "arg_pool.overflow");
        }
    }
}

/// Allocates a fresh container on every checkout; useful to take pooling out of tests and
/// benchmarks.
#[derive(Debug, Default)]
pub struct Unpooled {
    allocated: AtomicU64,
}

impl Unpooled {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocated(&self) -> u64 {
        self.allocated.load(Ordering::Relaxed)
    }
}

impl ArgAllocator for Unpooled {
    fn checkout(&self, min_size: usize) -> Args {
        self.allocated.fetch_add(1, Ordering::Relaxed);
        Args::with_capacity(min_size)
    }

    fn release(&self, mut args: Args) {
        args.clear();
    }
}

static DEFAULT_POOL: Lazy<Arc<ArgPool>> = Lazy::new(|| Arc::new(ArgPool::from_config(&CallConfig::from_env())));

/// Process-wide pool, configured from the environment on first use.
pub fn default_pool() -> &'static ArgPool {
    &DEFAULT_POOL
}

pub fn default_allocator() -> Arc<dyn ArgAllocator> {
    let pool: Arc<ArgPool> = Arc::clone(&DEFAULT_POOL);
    pool
}
