use flint_headless::Headless;
use flint_runtime::Toolkit;
use flint_runtime::core::Settings;
use flint_runtime::core::time::{self, Duration, Instant};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

#[test]
fn a_worker_wakes_the_ui_thread_with_a_message() {
    let mut toolkit = Toolkit::new(Headless::new(), Settings::default()).expect("toolkit");
    let handle = toolkit.thread_handle();

    let worker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        handle.awake_with(42_u32);
    });

    let start = Instant::now();
    let handled = toolkit.wait(time::FOREVER);

    assert!(handled);
    assert!(start.elapsed() < Duration::from_secs(5));

    let messages = toolkit.take_messages();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].downcast_ref::<u32>(), Some(&42));

    worker.join().expect("worker");
}

#[test]
fn workers_take_the_lock_while_the_ui_thread_waits() {
    let mut toolkit = Toolkit::new(Headless::new(), Settings::default()).expect("toolkit");
    toolkit.lock();

    let handle = toolkit.thread_handle();
    let touched = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&touched);

    let worker = thread::spawn(move || {
        {
            let _guard = handle.lock();
            flag.store(true, Ordering::SeqCst);
        }

        handle.awake();
    });

    let start = Instant::now();

    while !touched.load(Ordering::SeqCst) && start.elapsed() < Duration::from_secs(5) {
        let _ = toolkit.wait(Duration::from_millis(100));
    }

    assert!(touched.load(Ordering::SeqCst));

    toolkit.unlock();
    worker.join().expect("worker");
}
