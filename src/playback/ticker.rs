use super::FrameScheduler;
use crate::app::events::Event;
use anyhow::Context;
use std::time::{Duration, Instant};
use tokio::{sync::mpsc, task::JoinHandle, time::MissedTickBehavior};

/// Millisecond timestamps relative to a fixed epoch.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    epoch: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Sends `Event::Frame` into the app loop at a fixed period.
///
/// Each frame is a message; the app handles it to completion before it
/// receives the next one, so two frames never run at once.
pub struct FrameTicker {
    tx: mpsc::Sender<Event>,
    clock: FrameClock,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl FrameTicker {
    pub fn new(tx: mpsc::Sender<Event>, clock: FrameClock, period: Duration) -> Self {
        Self {
            tx,
            clock,
            period: period.max(Duration::from_millis(1)),
            task: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }
}

impl FrameScheduler for FrameTicker {
    fn start(&mut self) -> anyhow::Result<()> {
        if self.is_active() {
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current().context("no runtime for frame ticker")?;
        let tx = self.tx.clone();
        let clock = self.clock;
        let period = self.period;

        self.task = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let frame = Event::Frame {
                    now_ms: clock.now_ms(),
                };
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
        }));
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for FrameTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_without_runtime_fails() {
        let (tx, _rx) = mpsc::channel(4);
        let mut ticker = FrameTicker::new(tx, FrameClock::new(), Duration::from_millis(16));
        assert!(ticker.start().is_err());
        assert!(!ticker.is_active());
        ticker.cancel();
    }

    #[tokio::test]
    async fn test_delivers_frames_until_cancelled() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut ticker = FrameTicker::new(tx, FrameClock::new(), Duration::from_millis(5));
        ticker.start().unwrap();
        ticker.start().unwrap();

        let first = rx.recv().await;
        let second = rx.recv().await;
        match (first, second) {
            (Some(Event::Frame { now_ms: a }), Some(Event::Frame { now_ms: b })) => assert!(b >= a),
            other => panic!("expected two frames, got {other:?}"),
        }

        ticker.cancel();
        ticker.cancel();
        assert!(!ticker.is_active());
        drop(ticker);

        // Once the aborted task and the ticker have dropped their senders the channel closes.
        while let Some(ev) = rx.recv().await {
            assert!(matches!(ev, Event::Frame { .. }));
        }
    }
}
