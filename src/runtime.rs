use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tracing::debug;

/// Countdown resolution: one tick per elapsed second.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum EssayEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EssayEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<EssayEvent, RecvTimeoutError>;
}

/// Production event source using crossterm. Ticks from a [`TickTimer`] are
/// fed into the same channel through [`CrosstermEventSource::sender`], so the
/// consumer sees input and ticks strictly one after another.
pub struct CrosstermEventSource {
    tx: Sender<EssayEvent>,
    rx: Receiver<EssayEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        thread::spawn(move || loop {
            match event::read() {
                // Windows reports releases too; only presses edit text
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    if input_tx.send(EssayEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if input_tx.send(EssayEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<EssayEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EssayEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<EssayEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Handle to the periodic countdown tick.
///
/// A worker thread sends [`EssayEvent::Tick`] every interval until the handle
/// is cancelled or dropped. Cancelling joins the worker, so once `cancel`
/// returns no further tick will be sent.
#[derive(Debug)]
pub struct TickTimer {
    cancel_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl TickTimer {
    pub fn start<T: Ticker>(tx: Sender<EssayEvent>, ticker: T) -> Self {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let interval = ticker.interval();

        let worker = thread::spawn(move || {
            // a cancel message or a dropped handle both end the loop
            while let Err(RecvTimeoutError::Timeout) = cancel_rx.recv_timeout(interval) {
                if tx.send(EssayEvent::Tick).is_err() {
                    break;
                }
            }
        });

        debug!(interval_ms = interval.as_millis() as u64, "tick timer started");
        Self {
            cancel_tx: Some(cancel_tx),
            worker: Some(worker),
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn cancel(&mut self) {
        // dropping the sender wakes the worker with Disconnected
        self.cancel_tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
            debug!("tick timer cancelled");
        }
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<EssayEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<EssayEvent>) -> Self {
        Self { rx }
    }
}

impl EssayEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<EssayEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: EssayEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EssayEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to the poll interval and returns the next event, or None
    /// when nothing arrived in time.
    pub fn step(&self) -> Option<EssayEvent> {
        self.event_source.recv_timeout(self.ticker.interval()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn step_returns_none_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        assert!(runner.step().is_none());
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(EssayEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            Some(EssayEvent::Resize) => {}
            other => panic!("expected Resize event, got {other:?}"),
        }
    }

    #[test]
    fn tick_timer_delivers_ticks() {
        let (tx, rx) = mpsc::channel();
        let _timer = TickTimer::start(tx, FixedTicker::new(Duration::from_millis(5)));

        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(EssayEvent::Tick) => {}
            other => panic!("expected Tick, got {other:?}"),
        }
    }

    #[test]
    fn tick_timer_cancel_stops_ticks() {
        let (tx, rx) = mpsc::channel();
        let mut timer = TickTimer::start(tx, FixedTicker::new(Duration::from_millis(2)));
        assert!(timer.is_running());

        timer.cancel();
        assert!(!timer.is_running());

        // drain anything sent before cancellation
        let _ = rx.try_iter().count();
        assert!(rx.recv_timeout(Duration::from_millis(30)).is_err());

        // cancelling twice is harmless
        timer.cancel();
    }

    #[test]
    fn dropping_tick_timer_cancels_it() {
        let (tx, rx) = mpsc::channel();
        {
            let _timer = TickTimer::start(tx, FixedTicker::new(Duration::from_millis(2)));
        }
        let _ = rx.try_iter().count();
        assert!(matches!(
            rx.recv_timeout(Duration::from_millis(30)),
            Err(RecvTimeoutError::Disconnected)
        ));
    }
}
