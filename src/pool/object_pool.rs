// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

use crate::errors::PoolError;

/// Fixed set of reusable objects guarded by a semaphore sized to match.
///
/// Objects are handed out through guards that put them back when dropped,
/// on success and failure paths alike.
pub struct ObjectPool<T> {
    items: Mutex<Vec<T>>,
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl<T> ObjectPool<T> {
    pub fn new(items: Vec<T>) -> Arc<Self> {
        let capacity = items.len();
        Arc::new(Self {
            items: Mutex::new(items),
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Objects not currently handed out.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Take one object, waiting while every object is in use.
    pub async fn acquire(self: &Arc<Self>) -> Result<Pooled<T>, PoolError> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::Closed)?;
        self.take_one(permit)
    }

    /// Take every object once the pool is idle, waiting for in-flight holders.
    pub async fn acquire_all(self: &Arc<Self>) -> Result<PooledAll<T>, PoolError> {
        let permit = Arc::clone(&self.permits)
            .acquire_many_owned(self.permit_count())
            .await
            .map_err(|_| PoolError::Closed)?;
        Ok(self.take_all(permit))
    }

    /// Take every object only if the pool is idle right now.
    pub fn try_acquire_all(self: &Arc<Self>) -> Result<PooledAll<T>, PoolError> {
        match Arc::clone(&self.permits).try_acquire_many_owned(self.permit_count()) {
            Ok(permit) => Ok(self.take_all(permit)),
            Err(TryAcquireError::NoPermits) => Err(PoolError::ConfigureBusy {
                in_use: self.capacity - self.available(),
                capacity: self.capacity,
            }),
            Err(TryAcquireError::Closed) => Err(PoolError::Closed),
        }
    }

    /// [`acquire_all`](Self::acquire_all) bounded by `timeout`.
    pub async fn acquire_all_timeout(self: &Arc<Self>, timeout: Duration) -> Result<PooledAll<T>, PoolError> {
        tokio::time::timeout(timeout, self.acquire_all())
            .await
            .map_err(|_| PoolError::PoolExhaustionTimeout { timeout })?
    }

    /// Refuse further acquisitions. Waiting callers fail with
    /// [`PoolError::Closed`]; objects already out are still returned.
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    fn permit_count(&self) -> u32 {
        u32::try_from(self.capacity).unwrap_or(u32::MAX)
    }

    fn take_one(self: &Arc<Self>, permit: OwnedSemaphorePermit) -> Result<Pooled<T>, PoolError> {
        let item = self.items.lock().pop().ok_or(PoolError::Closed)?;
        Ok(Pooled {
            pool: Arc::clone(self),
            item: Some(item),
            _permit: permit,
        })
    }

    fn take_all(self: &Arc<Self>, permit: OwnedSemaphorePermit) -> PooledAll<T> {
        let items = std::mem::take(&mut *self.items.lock());
        PooledAll {
            pool: Arc::clone(self),
            items,
            _permit: permit,
        }
    }
}

/// One object on loan from an [`ObjectPool`].
pub struct Pooled<T> {
    pool: Arc<ObjectPool<T>>,
    item: Option<T>,
    _permit: OwnedSemaphorePermit,
}

impl<T> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `Drop` takes the item out.
        match self.item.as_ref() {
            Some(item) => item,
            None => unreachable!("pooled item already returned"),
        }
    }
}

impl<T> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        match self.item.as_mut() {
            Some(item) => item,
            None => unreachable!("pooled item already returned"),
        }
    }
}

impl<T> Drop for Pooled<T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.items.lock().push(item);
        }
    }
}

/// Every object of an [`ObjectPool`], held while the pool is idle.
pub struct PooledAll<T> {
    pool: Arc<ObjectPool<T>>,
    items: Vec<T>,
    _permit: OwnedSemaphorePermit,
}

impl<T> Deref for PooledAll<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> DerefMut for PooledAll<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.items
    }
}

impl<T> Drop for PooledAll<T> {
    fn drop(&mut self) {
        self.pool.items.lock().append(&mut self.items);
    }
}
