//! Halt signaling: a host thread can request cancellation, polled by the
//! Trampoline at Level boundaries (spec.md §4.F "Cancellation/timeouts").
//!
//! Grounded on `core-input::async_service`'s channel-based stop signal.

/// Host-held handle to request a halt.
#[derive(Debug, Clone)]
pub struct HaltSwitch {
    sender: crossbeam_channel::Sender<()>,
}

impl HaltSwitch {
    pub fn halt(&self) {
        let _ = self.sender.try_send(());
    }
}

/// Trampoline-held handle polled between executor steps. Once tripped, it
/// stays tripped — a halt is not cancelable mid-unwind.
#[derive(Debug)]
pub struct HaltSignal {
    receiver: crossbeam_channel::Receiver<()>,
    tripped: bool,
}

impl HaltSignal {
    pub fn channel() -> (HaltSwitch, HaltSignal) {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        (HaltSwitch { sender }, HaltSignal { receiver, tripped: false })
    }

    /// A signal that never trips, for contexts with no host-halt wiring
    /// (e.g. unit tests).
    pub fn never() -> HaltSignal {
        let (_switch, signal) = Self::channel();
        signal
    }

    pub fn poll(&mut self) -> bool {
        if !self.tripped && self.receiver.try_recv().is_ok() {
            self.tripped = true;
        }
        self.tripped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halt_request_is_observed_on_next_poll() {
        let (switch, mut signal) = HaltSignal::channel();
        assert!(!signal.poll());
        switch.halt();
        assert!(signal.poll());
    }

    #[test]
    fn never_signal_never_trips() {
        let mut signal = HaltSignal::never();
        assert!(!signal.poll());
        assert!(!signal.poll());
    }
}
