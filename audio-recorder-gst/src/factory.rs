use audio_recorder_core::models::node::NodeKind;

/// GStreamer element factory that provides `kind`.
pub fn factory_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Source => "alsasrc",
        NodeKind::Decoder => "decodebin",
        NodeKind::Converter => "audioconvert",
        NodeKind::Resampler => "audioresample",
        NodeKind::Splitter => "tee",
        NodeKind::Queue => "queue",
        NodeKind::WavEncoder => "wavenc",
        NodeKind::VorbisEncoder => "vorbisenc",
        NodeKind::OggMuxer => "oggmux",
        NodeKind::Mp3Encoder => "lame",
        NodeKind::FlacEncoder => "flacenc",
        NodeKind::FileSink => "filesink",
        NodeKind::DiscardSink => "fakesink",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audio_recorder_core::models::format::Format;

    #[test]
    fn encoder_chains_map_to_plugins() {
        let factories = |format: Format| -> Vec<&str> {
            format.encoder_chain().iter().map(|&k| factory_name(k)).collect()
        };

        assert!(factories(Format::Raw).is_empty());
        assert_eq!(factories(Format::Wav), vec!["wavenc"]);
        assert_eq!(factories(Format::Ogg), vec!["vorbisenc", "oggmux"]);
        assert_eq!(factories(Format::Mp3), vec!["lame"]);
        assert_eq!(factories(Format::Flac), vec!["flacenc"]);
    }

    #[test]
    fn decoder_is_autoplugging() {
        assert_eq!(factory_name(NodeKind::Decoder), "decodebin");
        assert_eq!(factory_name(NodeKind::DiscardSink), "fakesink");
    }
}
