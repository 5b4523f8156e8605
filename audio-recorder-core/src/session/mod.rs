pub mod dispatcher;
pub mod event_loop;
pub mod lifecycle;
pub mod recorder;
pub mod shutdown;
pub mod watchdog;
