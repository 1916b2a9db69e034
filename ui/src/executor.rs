use std::future::Future;

use iced::executor::Executor;
use iced::futures;
use tokio::runtime::{Builder, Runtime};

const WORKER_THREADS: usize = 2;
const WORKER_STACK_SIZE_BYTES: usize = 2 * 1024 * 1024;

/// Small tokio runtime for the kiosk timers; nothing here is CPU bound.
#[derive(Debug)]
pub struct KioskExecutor {
    runtime: Runtime,
}

impl Executor for KioskExecutor {
    fn new() -> Result<Self, futures::io::Error> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(WORKER_THREADS)
            .thread_name("bottleprint-worker")
            .thread_stack_size(WORKER_STACK_SIZE_BYTES)
            .enable_time()
            .build()?;
        Ok(Self { runtime })
    }

    fn spawn(&self, future: impl Future<Output = ()> + Send + 'static) {
        let _ = self.runtime.spawn(future);
    }

    fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.runtime.enter();
        f()
    }
}
