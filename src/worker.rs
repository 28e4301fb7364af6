//! Background threads fed through a channel.

use std::{
    io,
    panic::resume_unwind,
    thread::{self, JoinHandle},
};

use crossbeam::channel::{Sender, TrySendError};

/// Configures and spawns a [`Worker`].
#[derive(Clone)]
pub struct WorkerBuilder {
    name: Option<String>,
    capacity: usize,
}

impl WorkerBuilder {
    /// Sets the name of the worker thread.
    pub fn name<N: Into<String>>(self, name: N) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    /// Sets how many messages can be queued while the worker is busy.
    ///
    /// Defaults to 0: [`Worker::try_send`] only succeeds while the worker is idle.
    pub fn capacity(self, capacity: usize) -> Self {
        Self { capacity, ..self }
    }

    /// Spawns a thread that passes every message to `handler`.
    pub fn spawn<I, F>(self, mut handler: F) -> io::Result<Worker<I>>
    where
        I: Send + 'static,
        F: FnMut(I) + Send + 'static,
    {
        let (sender, recv) = crossbeam::channel::bounded(self.capacity);
        let name = self.name.unwrap_or_else(|| "worker".into());
        let handle = thread::Builder::new().name(name.clone()).spawn(move || {
            log::trace!("worker '{name}' starting");
            for message in recv {
                handler(message);
            }
            log::trace!("worker '{name}' exiting");
        })?;

        Ok(Worker {
            sender: Some(sender),
            handle: Some(handle),
        })
    }
}

/// Handle to a thread processing messages of type `I`.
///
/// Dropping the handle closes the channel and joins the thread. A panic in the thread is
/// forwarded to the thread that drops or sends to the `Worker`.
pub struct Worker<I: Send + 'static> {
    sender: Option<Sender<I>>,
    handle: Option<JoinHandle<()>>,
}

impl Worker<()> {
    #[inline]
    pub fn builder() -> WorkerBuilder {
        WorkerBuilder {
            name: None,
            capacity: 0,
        }
    }
}

impl<I: Send + 'static> Worker<I> {
    fn wait_for_exit(&mut self) {
        drop(self.sender.take());
        if let Some(handle) = self.handle.take() {
            if let Err(payload) = handle.join() {
                if !thread::panicking() {
                    resume_unwind(payload);
                }
            }
        }
    }

    /// Sends a message if the worker has room for it, and drops it otherwise.
    ///
    /// Returns whether the message was accepted.
    pub fn try_send(&mut self, msg: I) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        match sender.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Disconnected(_)) => {
                self.wait_for_exit();
                false
            }
        }
    }
}

impl<I: Send + 'static> Drop for Worker<I> {
    fn drop(&mut self) {
        self.wait_for_exit();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        panic::{catch_unwind, AssertUnwindSafe},
        sync::mpsc,
        time::Duration,
    };

    use super::*;

    fn silent_panic(payload: String) {
        resume_unwind(Box::new(payload));
    }

    #[test]
    fn processes_messages_in_order() {
        let (tx, rx) = mpsc::channel();
        let mut worker = Worker::builder()
            .name("echo")
            .capacity(16)
            .spawn(move |n: u32| tx.send(n).unwrap())
            .unwrap();
        for n in 0..3 {
            assert!(worker.try_send(n));
        }
        drop(worker);
        assert_eq!(rx.iter().collect::<Vec<_>>(), [0, 1, 2]);
    }

    #[test]
    fn try_send_drops_when_busy() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let mut worker = Worker::builder()
            .capacity(1)
            .spawn(move |_: ()| {
                started_tx.send(()).ok();
                release_rx.recv().ok();
            })
            .unwrap();

        assert!(worker.try_send(()));
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        // The worker is blocked, so only one more message fits into the queue.
        assert!(worker.try_send(()));
        assert!(!worker.try_send(()));

        drop(release_tx);
        drop(worker);
    }

    #[test]
    fn propagates_panic_on_drop() {
        let mut worker = Worker::builder()
            .capacity(1)
            .spawn(|_: ()| silent_panic("worker panic".into()))
            .unwrap();
        assert!(worker.try_send(()));
        catch_unwind(AssertUnwindSafe(|| drop(worker))).unwrap_err();
    }

    #[test]
    fn propagates_panic_on_try_send() {
        let mut worker = Worker::builder()
            .capacity(1)
            .spawn(|_: ()| silent_panic("worker panic".into()))
            .unwrap();
        assert!(worker.try_send(()));
        catch_unwind(AssertUnwindSafe(|| {
            // Keeps sending until the channel is disconnected by the panicking thread.
            for _ in 0..500 {
                worker.try_send(());
                thread::sleep(Duration::from_millis(10));
            }
        }))
        .unwrap_err();
        catch_unwind(AssertUnwindSafe(|| drop(worker))).unwrap();
    }
}
