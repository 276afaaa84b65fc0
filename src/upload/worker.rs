use std::sync::mpsc::Sender;

pub type WorkerTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs blocking blob-store calls away from the editing surface.
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, task: WorkerTask);
}

/// One OS thread per request; uploads are rare and short-lived.
#[derive(Debug, Default)]
pub struct ThreadSpawner;

impl TaskSpawner for ThreadSpawner {
    fn spawn(&self, task: WorkerTask) {
        std::thread::spawn(task);
    }
}

/// Runs the task on the calling thread. The result still goes through the
/// channel, so it is only observed when the owner drains its events.
#[derive(Debug, Default)]
pub struct InlineSpawner;

impl TaskSpawner for InlineSpawner {
    fn spawn(&self, task: WorkerTask) {
        task();
    }
}

pub(super) fn spawn_worker_action<T, W>(spawner: &dyn TaskSpawner, work: W, results: Sender<T>)
where
    T: Send + 'static,
    W: FnOnce() -> T + Send + 'static,
{
    spawner.spawn(Box::new(move || {
        let result = work();
        if results.send(result).is_err() {
            tracing::debug!("worker result dropped; editor session already unmounted");
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn inline_spawner_delivers_result_through_channel() {
        let (tx, rx) = mpsc::channel();
        spawn_worker_action(&InlineSpawner, || 41 + 1, tx);
        assert_eq!(rx.try_recv(), Ok(42));
    }

    #[test]
    fn thread_spawner_delivers_result_through_channel() {
        let (tx, rx) = mpsc::channel();
        spawn_worker_action(&ThreadSpawner, || "done", tx);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("done"));
    }
}
