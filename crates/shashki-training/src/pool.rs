//! Fixed-size worker pool.
//!
//! Workers pull tasks from a shared FIFO queue guarded by one mutex and two
//! condition variables: one wakes workers when a task arrives or shutdown
//! begins, the other wakes `wait_all` callers when the pool drains. A task
//! may be canceled before it starts; once running it either completes or its
//! panic is captured and re-raised to whoever waits on its handle. Nothing
//! here suspends cooperatively: concurrency is plain threads with blocking
//! waits at the pool-empty barrier between trainer rounds.

use std::{
    collections::VecDeque,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Condvar, Mutex},
    thread,
};

/// Returned by [`WorkerPool::submit`] once shutdown has begun; submissions
/// are rejected, never silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("worker pool is shutting down")]
pub struct PoolShutdownError;

/// A task body panicked; carried to every waiter on the task's handle.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("task failed: {message}")]
pub struct TaskFailedError {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TaskStatus {
    Pending,
    /// Marked completed without running its body.
    Canceled,
    Completed,
    Failed(String),
}

#[derive(Debug)]
struct TaskState {
    status: Mutex<TaskStatus>,
    done: Condvar,
}

impl TaskState {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(TaskStatus::Pending),
            done: Condvar::new(),
        })
    }

    fn finish(&self, status: TaskStatus) {
        *self.status.lock().unwrap() = status;
        self.done.notify_all();
    }
}

/// Handle to a submitted task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    state: Arc<TaskState>,
}

impl TaskHandle {
    /// Marks the task completed without running it. A no-op once the task
    /// has started.
    pub fn cancel(&self) {
        let mut status = self.state.status.lock().unwrap();
        if *status == TaskStatus::Pending {
            *status = TaskStatus::Canceled;
            self.state.done.notify_all();
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        *self.state.status.lock().unwrap() != TaskStatus::Pending
    }

    /// Blocks until the task completes; a captured panic is re-raised here
    /// as an error.
    pub fn wait(&self) -> Result<(), TaskFailedError> {
        let mut status = self.state.status.lock().unwrap();
        while *status == TaskStatus::Pending {
            status = self.state.done.wait(status).unwrap();
        }
        match &*status {
            TaskStatus::Failed(message) => Err(TaskFailedError {
                message: message.clone(),
            }),
            _ => Ok(()),
        }
    }
}

struct QueuedTask {
    state: Arc<TaskState>,
    body: Box<dyn FnOnce() + Send + 'static>,
}

struct PoolState {
    queue: VecDeque<QueuedTask>,
    in_flight: usize,
    shutdown: bool,
}

struct PoolShared {
    state: Mutex<PoolState>,
    task_available: Condvar,
    pool_idle: Condvar,
}

/// Fixed-size thread pool executing arbitrary tasks.
pub struct WorkerPool {
    shared: Arc<PoolShared>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `threads` workers.
    ///
    /// # Panics
    ///
    /// Panics if `threads` is zero or a worker thread cannot be spawned.
    #[must_use]
    pub fn new(threads: usize) -> Self {
        assert!(threads > 0, "worker pool needs at least one thread");
        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                in_flight: 0,
                shutdown: false,
            }),
            task_available: Condvar::new(),
            pool_idle: Condvar::new(),
        });
        let workers = (0..threads)
            .map(|i| {
                let shared = Arc::clone(&shared);
                thread::Builder::new()
                    .name(format!("shashki-worker-{i}"))
                    .spawn(move || worker_loop(&shared))
                    .expect("failed to spawn worker thread")
            })
            .collect();
        Self { shared, workers }
    }

    /// Enqueues a task; errors if shutdown has begun.
    pub fn submit<F>(&self, body: F) -> Result<TaskHandle, PoolShutdownError>
    where
        F: FnOnce() + Send + 'static,
    {
        let state = TaskState::new();
        {
            let mut pool = self.shared.state.lock().unwrap();
            if pool.shutdown {
                return Err(PoolShutdownError);
            }
            pool.queue.push_back(QueuedTask {
                state: Arc::clone(&state),
                body: Box::new(body),
            });
        }
        self.shared.task_available.notify_one();
        Ok(TaskHandle { state })
    }

    /// Blocks until the queue is empty and no task is executing.
    pub fn wait_all(&self) {
        let mut pool = self.shared.state.lock().unwrap();
        while pool.in_flight > 0 || !pool.queue.is_empty() {
            pool = self.shared.pool_idle.wait(pool).unwrap();
        }
    }

    /// Cancels every queued task and begins shutdown. Running tasks finish.
    pub fn kill(&self) {
        let drained: Vec<QueuedTask> = {
            let mut pool = self.shared.state.lock().unwrap();
            pool.shutdown = true;
            pool.queue.drain(..).collect()
        };
        self.shared.task_available.notify_all();
        log::debug!("worker pool killed, {} queued tasks canceled", drained.len());
        for task in drained {
            task.state.finish(TaskStatus::Canceled);
        }
    }

    fn shutdown(&self) {
        let mut pool = self.shared.state.lock().unwrap();
        pool.shutdown = true;
        drop(pool);
        self.shared.task_available.notify_all();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(shared: &PoolShared) {
    let mut pool = shared.state.lock().unwrap();
    loop {
        while let Some(task) = pool.queue.pop_front() {
            pool.in_flight += 1;
            drop(pool);
            run_task(task);
            pool = shared.state.lock().unwrap();
            pool.in_flight -= 1;
            if pool.in_flight == 0 && pool.queue.is_empty() {
                shared.pool_idle.notify_all();
            }
        }
        if pool.in_flight == 0 {
            shared.pool_idle.notify_all();
        }
        if pool.shutdown {
            return;
        }
        pool = shared.task_available.wait(pool).unwrap();
    }
}

fn run_task(task: QueuedTask) {
    // Canceled before start: completed without running the body.
    if *task.state.status.lock().unwrap() != TaskStatus::Pending {
        return;
    }
    match panic::catch_unwind(AssertUnwindSafe(task.body)) {
        Ok(()) => task.state.finish(TaskStatus::Completed),
        Err(payload) => {
            let message = panic_message(&payload);
            log::error!("pool task panicked: {message}");
            task.state.finish(TaskStatus::Failed(message));
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_owned()
    }
}
