use crate::models::error::RecorderError;
use crate::models::format::Format;
use crate::models::node::{NodeKind, NodeProperty, NodeSpec, PadRef};
use crate::models::output::OutputTarget;
use crate::traits::engine::MediaEngine;

use super::registry::NodeRegistry;

pub const SOURCE: &str = "source";
pub const DECODER: &str = "decoder";
pub const CONVERTER: &str = "converter";
pub const RESAMPLER: &str = "resampler";
pub const SPLITTER: &str = "splitter";
pub const RECORD_QUEUE: &str = "queue-a";
pub const FILE_SINK: &str = "file-sink";
pub const MONITOR_QUEUE: &str = "queue-b";
pub const DISCARD_SINK: &str = "discard-sink";

/// Input connection point of the converter, fed by the decoder once it
/// knows the stream format.
pub const CONVERTER_INPUT: &str = "sink";

/// The single link that cannot be made at assembly time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLink {
    /// Node that will announce the output connection point.
    pub src_node: String,
    pub dst: PadRef,
}

/// Complete topology of a recording pipeline, built before anything is
/// instantiated.
///
/// ```text
/// source → decoder ⇢ converter → resampler → splitter → queue-a → [encoder chain] → file-sink
///                                                  └──→ queue-b → discard-sink
/// ```
/// `⇢` is the dynamic link completed by `PadLinker`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphPlan {
    pub nodes: Vec<NodeSpec>,
    /// Static links in the order they are made.
    pub links: Vec<(String, String)>,
    pub dynamic: PendingLink,
}

impl GraphPlan {
    pub fn for_format(format: Format, target: &OutputTarget) -> Self {
        let mut nodes = vec![
            NodeSpec::new(NodeKind::Source, SOURCE),
            NodeSpec::new(NodeKind::Decoder, DECODER),
        ];
        let mut links = vec![(SOURCE.to_string(), DECODER.to_string())];

        let mut chain = vec![
            NodeSpec::new(NodeKind::Converter, CONVERTER),
            NodeSpec::new(NodeKind::Resampler, RESAMPLER),
            NodeSpec::new(NodeKind::Splitter, SPLITTER),
            NodeSpec::new(NodeKind::Queue, RECORD_QUEUE),
        ];
        chain.extend(
            format
                .encoder_chain()
                .iter()
                .map(|&kind| NodeSpec::new(kind, kind.as_str())),
        );
        chain.push(
            NodeSpec::new(NodeKind::FileSink, FILE_SINK)
                .with_property(NodeProperty::Location(target.path())),
        );
        links.extend(sequential_links(&chain));
        nodes.extend(chain);

        // The splitter needs a live consumer on every branch.
        nodes.push(NodeSpec::new(NodeKind::Queue, MONITOR_QUEUE));
        nodes.push(NodeSpec::new(NodeKind::DiscardSink, DISCARD_SINK));
        links.push((SPLITTER.to_string(), MONITOR_QUEUE.to_string()));
        links.push((MONITOR_QUEUE.to_string(), DISCARD_SINK.to_string()));

        Self {
            nodes,
            links,
            dynamic: PendingLink {
                src_node: DECODER.to_string(),
                dst: PadRef::new(CONVERTER, CONVERTER_INPUT),
            },
        }
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    pub fn node(&self, name: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Every static link must start at a node with a static output and
    /// end at a node with an input, and node names must be unique.
    pub fn validate(&self) -> Result<(), RecorderError> {
        for (i, spec) in self.nodes.iter().enumerate() {
            if self.nodes[..i].iter().any(|other| other.name == spec.name) {
                return Err(RecorderError::NodeCreation {
                    kind: spec.kind,
                    name: spec.name.clone(),
                });
            }
        }
        for (src, dst) in &self.links {
            let src_spec = self
                .node(src)
                .ok_or_else(|| RecorderError::UnknownNode(src.clone()))?;
            let dst_spec = self
                .node(dst)
                .ok_or_else(|| RecorderError::UnknownNode(dst.clone()))?;
            if !src_spec.kind.has_static_output() || !dst_spec.kind.has_input() {
                return Err(RecorderError::Link {
                    src: src.clone(),
                    dst: dst.clone(),
                });
            }
        }
        Ok(())
    }
}

fn sequential_links(chain: &[NodeSpec]) -> Vec<(String, String)> {
    chain
        .windows(2)
        .map(|pair| (pair[0].name.clone(), pair[1].name.clone()))
        .collect()
}

/// Instantiates a `GraphPlan` on an engine: create every node, then add
/// them all to the pipeline, then make every static link.
pub struct GraphAssembler;

impl GraphAssembler {
    pub fn assemble<E: MediaEngine + ?Sized>(engine: &E, plan: &GraphPlan) -> Result<(), RecorderError> {
        plan.validate()?;

        let mut registry = NodeRegistry::new(engine);
        for spec in &plan.nodes {
            registry.create(spec)?;
        }

        for spec in &plan.nodes {
            engine.add_node(&spec.name)?;
            log::info!("Added '{}'", spec.name);
        }

        for (src, dst) in &plan.links {
            engine.link_nodes(src, dst).map_err(|e| {
                log::error!("Could not link '{}' to '{}': {}", src, dst, e);
                RecorderError::Link {
                    src: src.clone(),
                    dst: dst.clone(),
                }
            })?;
            log::info!("Linked {} to {}", src, dst);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::output::OutputTarget;
    use crate::simulated::SimulatedEngine;
    use chrono::Local;

    fn target(format: Format) -> (tempfile::TempDir, OutputTarget) {
        let dir = tempfile::tempdir().unwrap();
        let target = OutputTarget::prepare(dir.path(), format, Local::now()).unwrap();
        (dir, target)
    }

    #[test]
    fn wav_plan_nodes() {
        let (_dir, target) = target(Format::Wav);
        let plan = GraphPlan::for_format(Format::Wav, &target);

        let names: Vec<&str> = plan.node_names().collect();
        assert_eq!(
            names,
            [
                "source",
                "decoder",
                "converter",
                "resampler",
                "splitter",
                "queue-a",
                "wav-encoder",
                "file-sink",
                "queue-b",
                "discard-sink"
            ]
        );
    }

    #[test]
    fn ogg_chain_links_in_order() {
        let (_dir, target) = target(Format::Ogg);
        let plan = GraphPlan::for_format(Format::Ogg, &target);

        let expected: Vec<(String, String)> = [
            ("source", "decoder"),
            ("converter", "resampler"),
            ("resampler", "splitter"),
            ("splitter", "queue-a"),
            ("queue-a", "vorbis-encoder"),
            ("vorbis-encoder", "ogg-muxer"),
            ("ogg-muxer", "file-sink"),
            ("splitter", "queue-b"),
            ("queue-b", "discard-sink"),
        ]
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();
        assert_eq!(plan.links, expected);
    }

    #[test]
    fn decoder_output_is_left_dynamic() {
        let (_dir, target) = target(Format::Raw);
        let plan = GraphPlan::for_format(Format::Raw, &target);

        assert!(plan.links.iter().all(|(src, _)| src != DECODER));
        assert_eq!(plan.dynamic.src_node, DECODER);
        assert_eq!(plan.dynamic.dst, PadRef::new(CONVERTER, "sink"));
    }

    #[test]
    fn file_sink_points_at_target() {
        let (_dir, target) = target(Format::Flac);
        let plan = GraphPlan::for_format(Format::Flac, &target);

        let sink = plan.node(FILE_SINK).unwrap();
        assert_eq!(sink.properties, vec![NodeProperty::Location(target.path())]);
    }

    #[test]
    fn every_format_assembles_with_one_pending_link() {
        for format in Format::ALL {
            let (_dir, target) = target(format);
            let plan = GraphPlan::for_format(format, &target);
            let engine = SimulatedEngine::new();

            GraphAssembler::assemble(&engine, &plan).unwrap();

            assert_eq!(engine.added_nodes().len(), plan.nodes.len());
            assert_eq!(engine.links().len(), plan.links.len());
            assert_eq!(engine.unlinked_inputs(), vec![PadRef::new(CONVERTER, "sink")]);
        }
    }

    #[test]
    fn creation_failure_stops_before_adding() {
        let (_dir, target) = target(Format::Mp3);
        let plan = GraphPlan::for_format(Format::Mp3, &target);
        let engine = SimulatedEngine::new();
        engine.fail_node_creation(NodeKind::Mp3Encoder);

        let err = GraphAssembler::assemble(&engine, &plan).unwrap_err();

        assert!(matches!(err, RecorderError::NodeCreation { ref name, .. } if name == "mp3-encoder"));
        assert!(engine.added_nodes().is_empty());
        assert!(engine.links().is_empty());
    }

    #[test]
    fn link_failure_names_both_nodes() {
        let (_dir, target) = target(Format::Wav);
        let plan = GraphPlan::for_format(Format::Wav, &target);
        let engine = SimulatedEngine::new();
        engine.fail_link("queue-a", "wav-encoder");

        let err = GraphAssembler::assemble(&engine, &plan).unwrap_err();

        assert_eq!(
            err,
            RecorderError::Link {
                src: "queue-a".into(),
                dst: "wav-encoder".into()
            }
        );
        assert_eq!(err.to_string(), "could not link 'queue-a' to 'wav-encoder'");
    }

    #[test]
    fn validate_rejects_link_from_decoder() {
        let (_dir, target) = target(Format::Raw);
        let mut plan = GraphPlan::for_format(Format::Raw, &target);
        plan.links.push((DECODER.into(), CONVERTER.into()));

        assert!(plan.validate().is_err());
    }
}
