use flint_runtime::core::time::Duration;
use flint_runtime::driver::Waker;
use flint_runtime::native;

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;

/// Feeds scripted native events to the headless backend, from any thread.
#[derive(Debug, Clone, Default)]
pub struct Injector {
    queue: Arc<Queue>,
}

#[derive(Debug, Default)]
struct Queue {
    inbox: Mutex<Inbox>,
    ready: Condvar,
}

#[derive(Debug, Default)]
struct Inbox {
    events: VecDeque<native::Event>,
    woken: bool,
}

impl Inbox {
    fn is_idle(&self) -> bool {
        self.events.is_empty() && !self.woken
    }
}

impl Injector {
    /// Queues a native event.
    pub fn push(&self, event: native::Event) {
        self.queue.inbox.lock().events.push_back(event);
        let _ = self.queue.ready.notify_one();
    }

    /// Queues several native events at once; one wait drains all of them.
    pub fn push_all(&self, events: impl IntoIterator<Item = native::Event>) {
        self.queue.inbox.lock().events.extend(events);
        let _ = self.queue.ready.notify_one();
    }

    /// Wakes a blocked wait without any event.
    pub fn wake(&self) {
        self.queue.inbox.lock().woken = true;
        let _ = self.queue.ready.notify_one();
    }

    /// Returns the number of queued events.
    pub fn pending(&self) -> usize {
        self.queue.inbox.lock().events.len()
    }

    pub(crate) fn waker(&self) -> Waker {
        let injector = self.clone();

        Waker::new(move || injector.wake())
    }

    pub(crate) fn wait(&self, timeout: Option<Duration>, events: &mut Vec<native::Event>) {
        let mut inbox = self.queue.inbox.lock();

        match timeout {
            Some(timeout) => {
                let _ = self
                    .queue
                    .ready
                    .wait_while_for(&mut inbox, |inbox| inbox.is_idle(), timeout);
            }
            None => self.queue.ready.wait_while(&mut inbox, |inbox| inbox.is_idle()),
        }

        inbox.woken = false;
        events.extend(inbox.events.drain(..));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flint_runtime::core::time::Instant;
    use flint_runtime::native::{Event, Kind, NativeId};

    #[test]
    fn a_wait_drains_every_queued_event() {
        let injector = Injector::default();
        injector.push_all([
            Event::new(NativeId(1), Kind::Exposed),
            Event::new(NativeId(1), Kind::CloseRequested),
        ]);

        let mut events = Vec::new();
        injector.wait(None, &mut events);

        assert_eq!(events.len(), 2);
        assert_eq!(injector.pending(), 0);
    }

    #[test]
    fn a_waker_ends_the_wait_from_another_thread() {
        let injector = Injector::default();
        let waker = injector.waker();

        let worker = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            waker.wake();
        });

        let start = Instant::now();
        let mut events = Vec::new();
        injector.wait(Some(Duration::from_secs(10)), &mut events);

        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(events.is_empty());

        worker.join().expect("worker");
    }
}
