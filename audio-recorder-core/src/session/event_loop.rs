use std::time::{Duration, Instant};

use crossbeam_channel::{never, select, tick, Receiver};

use crate::models::event::EngineEvent;

/// Returned by an event handler to keep or cancel the periodic tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Continue,
    /// Do not reschedule the tick.
    RemoveTimer,
}

/// Single-threaded cooperative loop delivering bus events and timer ticks.
///
/// Runs on one worker thread until the quit channel fires, the event
/// channel disconnects, or `is_active` reports false after a handler.
pub struct EventLoop {
    events: Receiver<EngineEvent>,
    quit: Receiver<()>,
    tick_interval: Option<Duration>,
}

impl EventLoop {
    pub fn new(events: Receiver<EngineEvent>, quit: Receiver<()>, tick_interval: Option<Duration>) -> Self {
        Self {
            events,
            quit,
            tick_interval,
        }
    }

    pub fn run<A, H>(&self, is_active: A, mut handle: H)
    where
        A: Fn() -> bool,
        H: FnMut(EngineEvent) -> Continuation,
    {
        let mut ticker: Receiver<Instant> = match self.tick_interval {
            Some(interval) => tick(interval),
            None => never(),
        };

        while is_active() {
            let next = select! {
                recv(self.events) -> event => event.ok().map(&mut handle),
                recv(ticker) -> _ => Some(handle(EngineEvent::Tick)),
                recv(self.quit) -> _ => None,
            };
            match next {
                Some(Continuation::Continue) => {}
                Some(Continuation::RemoveTimer) => ticker = never(),
                None => break,
            }
        }
        log::debug!("Event loop finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::BusMessage;
    use crossbeam_channel::{bounded, unbounded};
    use std::cell::Cell;

    #[test]
    fn delivers_events_until_quit() {
        let (events_tx, events_rx) = unbounded();
        let (quit_tx, quit_rx) = bounded(1);
        let event_loop = EventLoop::new(events_rx, quit_rx, None);

        events_tx.send(EngineEvent::Message(BusMessage::other("a", "tag"))).unwrap();
        events_tx.send(EngineEvent::Message(BusMessage::other("b", "tag"))).unwrap();

        let mut seen = Vec::new();
        event_loop.run(
            || true,
            |event| {
                seen.push(event);
                if seen.len() == 2 {
                    quit_tx.try_send(()).unwrap();
                }
                Continuation::Continue
            },
        );

        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn removed_timer_stops_ticking() {
        let (_events_tx, events_rx) = unbounded();
        let (quit_tx, quit_rx) = bounded(1);
        let event_loop = EventLoop::new(events_rx, quit_rx, Some(Duration::from_millis(5)));
        let ticks = Cell::new(0);

        let quitter = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            quit_tx.send(()).unwrap();
        });
        event_loop.run(
            || true,
            |event| {
                assert_eq!(event, EngineEvent::Tick);
                ticks.set(ticks.get() + 1);
                if ticks.get() == 3 {
                    Continuation::RemoveTimer
                } else {
                    Continuation::Continue
                }
            },
        );
        quitter.join().unwrap();

        assert_eq!(ticks.get(), 3);
    }

    #[test]
    fn exits_when_deactivated() {
        let (events_tx, events_rx) = unbounded();
        let (_quit_tx, quit_rx) = bounded::<()>(1);
        let event_loop = EventLoop::new(events_rx, quit_rx, None);
        let active = Cell::new(true);

        events_tx.send(EngineEvent::Message(BusMessage::eos("sink"))).unwrap();
        event_loop.run(
            || active.get(),
            |_| {
                active.set(false);
                Continuation::Continue
            },
        );

        assert!(!active.get());
    }
}
