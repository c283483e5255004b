//! Recurring one-second tick source.
//!
//! A ticker is a background thread that sends [`Tick`]s into a channel until
//! its handle is stopped or dropped. [`TickSource`] keeps at most one ticker
//! alive: starting a new one stops the previous one first.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub epoch: u64,
}

pub struct Ticker {
    epoch: u64,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn(epoch: u64, period: Duration, ticks: Sender<Tick>) -> io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name(format!("ticker-{epoch}"))
            .spawn(move || loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        trace!(epoch, "tick");
                        if ticks.send(Tick { epoch }).is_err() {
                            break;
                        }
                    }
                    // Explicit stop or the handle went away.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        debug!(epoch, ?period, "ticker started");
        Ok(Self {
            epoch,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Stops the thread and waits for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            debug!(epoch = self.epoch, "ticker stopped");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub struct TickSource {
    period: Duration,
    ticks: Sender<Tick>,
    current: Option<Ticker>,
}

impl TickSource {
    pub fn new(period: Duration, ticks: Sender<Tick>) -> Self {
        Self {
            period,
            ticks,
            current: None,
        }
    }

    /// Replaces the running ticker, if any, with one tagged `epoch`.
    pub fn start(&mut self, epoch: u64) -> io::Result<()> {
        self.stop();
        self.current = Some(Ticker::spawn(epoch, self.period, self.ticks.clone())?);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(ticker) = self.current.take() {
            ticker.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn epoch(&self) -> Option<u64> {
        self.current.as_ref().map(Ticker::epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    const PERIOD: Duration = Duration::from_millis(5);

    #[test]
    fn ticker_sends_tagged_ticks() {
        let (tx, rx) = mpsc::channel();
        let ticker = Ticker::spawn(3, PERIOD, tx).unwrap();

        let tick = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(tick, Tick { epoch: 3 });
        ticker.stop();
    }

    #[test]
    fn stopped_ticker_goes_quiet() {
        let (tx, rx) = mpsc::channel();
        let ticker = Ticker::spawn(1, PERIOD, tx).unwrap();
        rx.recv_timeout(Duration::from_secs(2)).unwrap();
        ticker.stop();

        // Everything sent before the join is already queued; nothing after.
        while rx.try_recv().is_ok() {}
        thread::sleep(PERIOD * 4);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn restart_keeps_a_single_ticker() {
        let (tx, rx) = mpsc::channel();
        let mut source = TickSource::new(PERIOD, tx);

        source.start(1).unwrap();
        rx.recv_timeout(Duration::from_secs(2)).unwrap();
        source.start(2).unwrap();
        assert_eq!(source.epoch(), Some(2));

        // Drain whatever the first ticker queued before it was joined.
        while let Ok(tick) = rx.try_recv() {
            assert!(tick.epoch <= 2);
        }

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut seen = 0;
        while seen < 3 && Instant::now() < deadline {
            if let Ok(tick) = rx.recv_timeout(Duration::from_millis(100)) {
                assert_eq!(tick.epoch, 2);
                seen += 1;
            }
        }
        assert_eq!(seen, 3);

        source.stop();
        assert!(!source.is_running());
    }
}
