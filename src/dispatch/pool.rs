//! Request context pool.
//!
//! # Responsibilities
//! - Hand out reset contexts to in-flight requests
//! - Take them back when the request finishes, including by panic
//!
//! # Design Decisions
//! - Mutex-guarded free list; the lock is held only to push or pop
//! - Release is tied to `Drop` of the guard, so unwinding still returns the context
//! - Contexts are reset on both acquire and release

use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

use crate::context::Context;

/// Bounded free list of request contexts.
#[derive(Debug)]
pub struct ContextPool {
    idle: Mutex<Vec<Context>>,
    capacity: usize,
}

impl ContextPool {
    /// Pool retaining at most `capacity` idle contexts.
    pub fn new(capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Take a context, allocating one if the pool is empty.
    pub fn acquire(&self) -> PooledContext<'_> {
        let mut ctx = self.idle.lock().pop().unwrap_or_default();
        ctx.reset();
        PooledContext { pool: self, ctx }
    }

    /// Number of contexts waiting for reuse.
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn release(&self, mut ctx: Context) {
        ctx.reset();
        let mut idle = self.idle.lock();
        if idle.len() < self.capacity {
            idle.push(ctx);
        }
    }
}

/// A context on loan from a [`ContextPool`]; returned on drop.
pub struct PooledContext<'p> {
    pool: &'p ContextPool,
    ctx: Context,
}

impl Deref for PooledContext<'_> {
    type Target = Context;

    fn deref(&self) -> &Context {
        &self.ctx
    }
}

impl DerefMut for PooledContext<'_> {
    fn deref_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }
}

impl Drop for PooledContext<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.ctx));
    }
}
