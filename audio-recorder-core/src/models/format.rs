use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::RecorderError;
use super::node::NodeKind;

/// Output file format.
///
/// Selects the encoder/container nodes inserted between the recording
/// queue and the file sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Raw,
    Wav,
    Ogg,
    Mp3,
    Flac,
}

impl Format {
    pub const ALL: [Format; 5] = [Self::Raw, Self::Wav, Self::Ogg, Self::Mp3, Self::Flac];

    /// File extension used for the produced recording.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Wav => "wav",
            Self::Ogg => "ogg",
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
        }
    }

    /// Ordered encoder/container kinds appended before the file sink.
    pub fn encoder_chain(&self) -> &'static [NodeKind] {
        match self {
            Self::Raw => &[],
            Self::Wav => &[NodeKind::WavEncoder],
            Self::Ogg => &[NodeKind::VorbisEncoder, NodeKind::OggMuxer],
            Self::Mp3 => &[NodeKind::Mp3Encoder],
            Self::Flac => &[NodeKind::FlacEncoder],
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = RecorderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(s))
            .ok_or_else(|| RecorderError::Configuration(format!("unsupported format: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("ogg".parse::<Format>().unwrap(), Format::Ogg);
        assert_eq!("FLAC".parse::<Format>().unwrap(), Format::Flac);
        assert!("aac".parse::<Format>().is_err());
    }

    #[test]
    fn raw_has_no_encoder() {
        assert!(Format::Raw.encoder_chain().is_empty());
        assert_eq!(Format::Raw.extension(), "raw");
    }

    #[test]
    fn ogg_needs_encoder_and_muxer() {
        assert_eq!(
            Format::Ogg.encoder_chain(),
            &[NodeKind::VorbisEncoder, NodeKind::OggMuxer]
        );
    }
}
