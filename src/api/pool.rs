//! Reusable byte buffers for request serialization
//!
//! Query bodies are serialized into buffers borrowed from a [`BufferPool`].
//! A [`PooledBuffer`] is owned by exactly one request and goes back to the
//! pool, cleared, when it is dropped, whichever way the request ends.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// Buffers larger than this are dropped instead of pooled
const MAX_RETAINED_CAPACITY: usize = 1024 * 1024;

#[derive(Debug)]
pub struct BufferPool {
    buffers: Mutex<Vec<Vec<u8>>>,
    max_pooled: usize,
}

impl BufferPool {
    pub fn new(max_pooled: usize) -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
            max_pooled,
        }
    }

    /// Take an empty buffer, allocating one if the pool is dry
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buffer = self
            .buffers
            .lock()
            .map(|mut buffers| buffers.pop())
            .unwrap_or_default()
            .unwrap_or_default();

        PooledBuffer { buffer, pool: self }
    }

    /// Number of idle buffers
    pub fn idle(&self) -> usize {
        self.buffers.lock().map(|b| b.len()).unwrap_or(0)
    }

    fn release(&self, mut buffer: Vec<u8>) {
        if buffer.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buffer.clear();
        if let Ok(mut buffers) = self.buffers.lock() {
            if buffers.len() < self.max_pooled {
                buffers.push(buffer);
            }
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(32)
    }
}

/// Exclusive handle on a pooled buffer
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    buffer: Vec<u8>,
    pool: &'a BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buffer));
    }
}
