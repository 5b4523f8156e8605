use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Capability kind of a processing node.
///
/// Engines map each kind to a concrete implementation (a GStreamer element
/// factory, a simulated node, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Source,
    Decoder,
    Converter,
    Resampler,
    Splitter,
    Queue,
    WavEncoder,
    VorbisEncoder,
    OggMuxer,
    Mp3Encoder,
    FlacEncoder,
    FileSink,
    DiscardSink,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Decoder => "decoder",
            Self::Converter => "converter",
            Self::Resampler => "resampler",
            Self::Splitter => "splitter",
            Self::Queue => "queue",
            Self::WavEncoder => "wav-encoder",
            Self::VorbisEncoder => "vorbis-encoder",
            Self::OggMuxer => "ogg-muxer",
            Self::Mp3Encoder => "mp3-encoder",
            Self::FlacEncoder => "flac-encoder",
            Self::FileSink => "file-sink",
            Self::DiscardSink => "discard-sink",
        }
    }

    /// Whether nodes of this kind accept an input connection point.
    pub fn has_input(&self) -> bool {
        !matches!(self, Self::Source)
    }

    /// Whether nodes of this kind expose their output at creation time.
    ///
    /// The decoder only announces its output once the stream format is known.
    pub fn has_static_output(&self) -> bool {
        !matches!(self, Self::Decoder | Self::FileSink | Self::DiscardSink)
    }

    /// Whether one output may feed several downstream nodes.
    pub fn is_branching(&self) -> bool {
        matches!(self, Self::Splitter)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration property applied to a node after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeProperty {
    /// Output file path of a file sink.
    Location(PathBuf),
}

impl NodeProperty {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Location(_) => "location",
        }
    }
}

/// Description of a node to instantiate: unique name, kind and properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub name: String,
    pub kind: NodeKind,
    pub properties: Vec<NodeProperty>,
}

impl NodeSpec {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: NodeProperty) -> Self {
        self.properties.push(property);
        self
    }
}

/// A named connection point ("pad") on a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PadRef {
    pub node: String,
    pub pad: String,
}

impl PadRef {
    pub fn new(node: impl Into<String>, pad: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            pad: pad.into(),
        }
    }
}

impl fmt::Display for PadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node, self.pad)
    }
}
