use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};

// value of the latest-key slot when nothing is held down
const NO_KEY: u8 = 0xFF;

// how long a blocked wait sleeps before checking for cancellation
const WAIT_SLICE: Duration = Duration::from_millis(10);

/// What the CPU needs to know about the keypad.
pub trait KeyInput {
    /// The most recently pressed key (0x0 - 0xF), if it is still held.
    fn last_key(&self) -> Option<u8>;

    /// Block until the next key press and return it.
    fn wait_for_key(&self, cancel: &CancelToken) -> Result<u8>;
}

/// Lets a host abort a CPU blocked on `FX0A`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn rearm(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Create a connected producer/consumer pair for key events.
///
/// The sender lives with whatever polls the physical keyboard; the receiver
/// is handed to the [`Platform`](crate::Platform).
pub fn key_channel() -> (KeySender, KeyReceiver) {
    let last = Arc::new(AtomicU8::new(NO_KEY));
    let (tx, rx) = mpsc::channel();

    let sender = KeySender {
        last: Arc::clone(&last),
        events: tx,
    };
    let receiver = KeyReceiver { last, events: rx };
    (sender, receiver)
}

/// Producer side of [`key_channel`].
#[derive(Clone)]
pub struct KeySender {
    last: Arc<AtomicU8>,
    events: Sender<u8>,
}

impl KeySender {
    pub fn press(&self, key: u8) {
        let key = key & 0xF;
        self.last.store(key, Ordering::SeqCst);
        if self.events.send(key).is_err() {
            log::debug!("key {:X} pressed, but nobody is listening", key);
        }
    }

    /// Releasing a key only clears the slot when it is the latest one.
    pub fn release(&self, key: u8) {
        let _ = self
            .last
            .compare_exchange(key & 0xF, NO_KEY, Ordering::SeqCst, Ordering::SeqCst);
    }
}

/// Consumer side of [`key_channel`].
pub struct KeyReceiver {
    last: Arc<AtomicU8>,
    events: Receiver<u8>,
}

impl KeyInput for KeyReceiver {
    fn last_key(&self) -> Option<u8> {
        match self.last.load(Ordering::SeqCst) {
            NO_KEY => None,
            key => Some(key),
        }
    }

    fn wait_for_key(&self, cancel: &CancelToken) -> Result<u8> {
        // presses from before the wait started do not count
        loop {
            match self.events.try_recv() {
                Ok(_) => continue,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Err(Error::InputDisconnected),
            }
        }

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            match self.events.recv_timeout(WAIT_SLICE) {
                Ok(key) => return Ok(key),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Err(Error::InputDisconnected),
            }
        }
    }
}
