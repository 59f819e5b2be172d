use std::future::Future;

use tokio::task::JoinHandle;

/// Background task that is aborted when its guard is dropped.
///
/// All timers and subscriptions in this crate are owned through guards, so
/// dropping a session tears the whole machinery down with it; nothing can
/// outlive its owner.
pub struct TaskGuard {
    handle: JoinHandle<()>,
}

impl TaskGuard {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn dropping_the_guard_stops_the_task() {
        let fired = Arc::new(AtomicBool::new(false));
        let guard = {
            let fired = fired.clone();
            TaskGuard::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                fired.store(true, Ordering::SeqCst);
            })
        };

        drop(guard);
        tokio::time::sleep(std::time::Duration::from_secs(120)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
