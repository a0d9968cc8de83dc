//! Shutdown signalling from inside request handling.

use tokio::sync::mpsc;

/// Reason the process is asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

/// Sending half of the shutdown channel, cloned into every route.
///
/// The channel holds a single pending signal. Sending never blocks: when a
/// signal is already pending the new one is dropped.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: mpsc::Sender<ShutdownSignal>,
}

impl Shutdown {
    /// Creates the sink and the receiver the hosting process waits on.
    pub fn channel() -> (Self, mpsc::Receiver<ShutdownSignal>) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, rx)
    }

    /// Returns `true` if this call queued the signal.
    pub fn signal(&self, sig: ShutdownSignal) -> bool {
        self.tx.try_send(sig).is_ok()
    }
}
