//! Share the toolkit with worker threads.
//!
//! The UI thread may hold the global lock while it runs; it releases it
//! only while blocked in the native wait. Worker threads take the lock to
//! touch state shared with the UI thread and wake it with
//! [`ThreadHandle::awake`].
use crate::driver::Waker;

use parking_lot::{ArcMutexGuard, Mutex, MutexGuard, RawMutex};
use std::any::Any;
use std::sync::Arc;

/// The guard of the global lock held by the UI thread.
pub(crate) type Guard = ArcMutexGuard<RawMutex, ()>;

/// A message sent to the UI thread.
pub(crate) type Message = Box<dyn Any + Send>;

/// A handle to the toolkit for other threads.
#[derive(Debug, Clone)]
pub struct ThreadHandle {
    pub(crate) lock: Arc<Mutex<()>>,
    pub(crate) waker: Waker,
    pub(crate) messages: Arc<Mutex<Vec<Message>>>,
}

impl ThreadHandle {
    /// Takes the global lock.
    ///
    /// This blocks while the UI thread is running and returns once it
    /// waits for native events.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock()
    }

    /// Wakes the UI thread from its native wait.
    pub fn awake(&self) {
        self.waker.wake();
    }

    /// Sends a message to the UI thread and wakes it.
    ///
    /// Messages are collected by the next wait and can be taken with
    /// `Toolkit::take_messages`.
    pub fn awake_with<T: Any + Send>(&self, message: T) {
        self.messages.lock().push(Box::new(message));
        self.awake();
    }
}
