//! Fan-out of encoded frames to stream clients.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam::channel::{Receiver, Sender, TrySendError};

/// An encoded JPEG frame, shared between all clients.
pub type Frame = Arc<[u8]>;

#[derive(Default)]
struct Clients {
    senders: Vec<Sender<Frame>>,
    latest: Option<Frame>,
}

/// Distributes the most recent frame to every subscribed client.
///
/// Each client has room for a single pending frame. Clients that fall behind skip frames
/// instead of slowing down the publisher.
#[derive(Clone, Default)]
pub struct FrameHub {
    clients: Arc<Mutex<Clients>>,
}

impl FrameHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Clients> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new client.
    ///
    /// If a frame was published before, the client receives it right away.
    pub fn subscribe(&self) -> Receiver<Frame> {
        let (sender, recv) = crossbeam::channel::bounded(1);
        let mut clients = self.lock();
        if let Some(latest) = &clients.latest {
            // Can't fail, the channel is empty and `recv` is alive.
            let _ = sender.try_send(latest.clone());
        }
        clients.senders.push(sender);
        recv
    }

    /// Sends `frame` to all clients, dropping it for those that haven't taken the last one.
    ///
    /// Clients whose receiver was dropped are removed.
    pub fn publish(&self, frame: Frame) {
        let mut clients = self.lock();
        let before = clients.senders.len();
        clients
            .senders
            .retain(|sender| match sender.try_send(frame.clone()) {
                Ok(()) | Err(TrySendError::Full(_)) => true,
                Err(TrySendError::Disconnected(_)) => false,
            });
        let removed = before - clients.senders.len();
        if removed != 0 {
            log::debug!("{removed} stream client(s) disconnected");
        }
        clients.latest = Some(frame);
    }

    pub fn client_count(&self) -> usize {
        self.lock().senders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(byte: u8) -> Frame {
        Arc::from(vec![byte; 4])
    }

    #[test]
    fn slow_clients_skip_frames() {
        let hub = FrameHub::new();
        let client = hub.subscribe();
        hub.publish(frame(1));
        hub.publish(frame(2));
        assert_eq!(client.try_recv().unwrap()[0], 1);
        assert!(client.try_recv().is_err());
        hub.publish(frame(3));
        assert_eq!(client.try_recv().unwrap()[0], 3);
    }

    #[test]
    fn late_subscribers_get_latest_frame() {
        let hub = FrameHub::new();
        hub.publish(frame(1));
        hub.publish(frame(2));
        let client = hub.subscribe();
        assert_eq!(client.try_recv().unwrap()[0], 2);
    }

    #[test]
    fn disconnected_clients_are_pruned() {
        let hub = FrameHub::new();
        let a = hub.subscribe();
        let b = hub.subscribe();
        assert_eq!(hub.client_count(), 2);
        drop(a);
        hub.publish(frame(0));
        assert_eq!(hub.client_count(), 1);
        assert_eq!(b.try_recv().unwrap()[0], 0);
    }
}
