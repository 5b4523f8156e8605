use super::node::PadRef;

/// Anything the engine (or the event loop) tells the recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A node announced a new output connection point.
    PadAdded(PadRef),
    /// A message posted on the pipeline's bus.
    Message(BusMessage),
    /// Periodic timer tick from the event loop.
    Tick,
}

/// Message posted by a node on the pipeline's message stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// Name of the node that posted the message.
    pub source: String,
    pub kind: MessageKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    EndOfStream,
    Error {
        description: String,
        debug: Option<String>,
    },
    /// Any other message type, by name. Ignored by the recorder.
    Other(String),
}

impl BusMessage {
    pub fn eos(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind: MessageKind::EndOfStream,
        }
    }

    pub fn error(source: impl Into<String>, description: impl Into<String>, debug: Option<String>) -> Self {
        Self {
            source: source.into(),
            kind: MessageKind::Error {
                description: description.into(),
                debug,
            },
        }
    }

    pub fn other(source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind: MessageKind::Other(name.into()),
        }
    }
}
