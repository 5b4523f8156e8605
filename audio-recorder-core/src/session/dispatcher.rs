use crate::models::event::{BusMessage, MessageKind};
use crate::models::recording_result::ShutdownReason;

/// What the recorder should do after a bus message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Continue,
    Shutdown(ShutdownReason),
}

/// Routes bus messages: end-of-stream and errors end the session,
/// everything else is ignored.
pub struct EventDispatcher;

impl EventDispatcher {
    pub fn dispatch(message: &BusMessage) -> Dispatch {
        match &message.kind {
            MessageKind::EndOfStream => {
                log::info!("End-of-stream reached");
                Dispatch::Shutdown(ShutdownReason::EndOfStream)
            }
            MessageKind::Error { description, debug } => {
                log::error!(
                    "Error received from node '{}': {}",
                    message.source,
                    description
                );
                if let Some(debug) = debug {
                    log::error!("Debug info: {}", debug);
                }
                Dispatch::Shutdown(ShutdownReason::StreamError {
                    node: message.source.clone(),
                    description: description.clone(),
                    debug: debug.clone(),
                })
            }
            MessageKind::Other(_) => Dispatch::Continue,
        }
    }
}
