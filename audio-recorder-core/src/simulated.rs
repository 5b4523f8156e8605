//! In-memory engine for tests and dry runs.
//!
//! `SimulatedEngine` implements [`MediaEngine`] without moving any audio.
//! It keeps the node graph, enforces the same linking rules as a real
//! engine (one incoming link per input, no static output on the decoder,
//! request pads on the splitter) and lets tests script failures, state
//! change outcomes, playback positions and bus traffic.
//!
//! ```ignore
//! let engine = Arc::new(SimulatedEngine::new());
//! engine.script_positions([Some(Duration::from_secs(1)), None]);
//! let recorder = Recorder::new(Arc::clone(&engine), config)?;
//! engine.announce_pad("decoder", "src_0");
//! engine.post(BusMessage::eos("file-sink"));
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::error::RecorderError;
use crate::models::event::{BusMessage, EngineEvent};
use crate::models::node::{NodeKind, NodeProperty, PadRef};
use crate::models::state::{PipelineState, StateChangeOutcome};
use crate::traits::engine::{EventCallback, MediaEngine};

const INPUT_PAD: &str = "sink";
const OUTPUT_PAD: &str = "src";

#[derive(Debug)]
struct SimNode {
    kind: NodeKind,
    properties: HashMap<String, String>,
    dynamic_pads: Vec<String>,
    request_pads: usize,
    added: bool,
}

#[derive(Debug, Default)]
struct SimState {
    nodes: HashMap<String, SimNode>,
    added: Vec<String>,
    links: Vec<(PadRef, PadRef)>,

    fail_create: HashSet<NodeKind>,
    fail_links: HashSet<(String, String)>,
    fail_states: HashSet<PipelineState>,
    async_transitions: bool,

    state: Option<PipelineState>,
    pending: Option<PipelineState>,
    requested: Vec<PipelineState>,
    confirmations: Vec<PipelineState>,

    positions: VecDeque<Option<Duration>>,
    position_queries: usize,
    graph_dumps: usize,
}

impl SimState {
    fn current(&self) -> PipelineState {
        self.state.unwrap_or(PipelineState::Idle)
    }

    fn node(&self, name: &str) -> Result<&SimNode, RecorderError> {
        self.nodes
            .get(name)
            .ok_or_else(|| RecorderError::UnknownNode(name.to_string()))
    }

    fn is_linked(&self, pad: &PadRef) -> bool {
        self.links.iter().any(|(src, dst)| src == pad || dst == pad)
    }
}

/// Scriptable in-memory [`MediaEngine`].
#[derive(Default)]
pub struct SimulatedEngine {
    state: Mutex<SimState>,
    callback: Mutex<Option<EventCallback>>,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Scripting ---

    /// Make every creation of `kind` fail, as if its plugin were missing.
    pub fn fail_node_creation(&self, kind: NodeKind) {
        self.state.lock().fail_create.insert(kind);
    }

    /// Make any link from node `src` to node `dst` fail.
    pub fn fail_link(&self, src: &str, dst: &str) {
        self.state
            .lock()
            .fail_links
            .insert((src.to_string(), dst.to_string()));
    }

    /// Make requests for `target` return `StateChangeOutcome::Failure`.
    pub fn fail_transition(&self, target: PipelineState) {
        self.state.lock().fail_states.insert(target);
    }

    /// Report state changes as `Async` until `wait_for_state` confirms them.
    pub fn set_async_transitions(&self, enabled: bool) {
        self.state.lock().async_transitions = enabled;
    }

    /// Positions returned by successive `query_position` calls. Once the
    /// script runs out, queries return `None`.
    pub fn script_positions<I>(&self, positions: I)
    where
        I: IntoIterator<Item = Option<Duration>>,
    {
        self.state.lock().positions.extend(positions);
    }

    /// Give `node` a new output connection point without announcing it.
    pub fn add_dynamic_pad(&self, node: &str, pad: &str) -> PadRef {
        if let Some(n) = self.state.lock().nodes.get_mut(node) {
            n.dynamic_pads.push(pad.to_string());
        }
        PadRef::new(node, pad)
    }

    /// Add a dynamic pad and announce it, as a decoder does after probing.
    pub fn announce_pad(&self, node: &str, pad: &str) {
        let pad = self.add_dynamic_pad(node, pad);
        self.emit(EngineEvent::PadAdded(pad));
    }

    /// Post a message on the bus.
    pub fn post(&self, message: BusMessage) {
        self.emit(EngineEvent::Message(message));
    }

    /// Deliver an event to the connected callback, if any.
    pub fn emit(&self, event: EngineEvent) {
        let callback = self.callback.lock().clone();
        match callback {
            Some(callback) => callback(event),
            None => log::warn!("Dropping {:?}: no event receiver connected", event),
        }
    }

    // --- Inspection ---

    pub fn created_nodes(&self) -> Vec<String> {
        let state = self.state.lock();
        let mut names: Vec<String> = state.nodes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Nodes in the pipeline, in the order they were added.
    pub fn added_nodes(&self) -> Vec<String> {
        self.state.lock().added.clone()
    }

    pub fn node_kind(&self, name: &str) -> Option<NodeKind> {
        self.state.lock().nodes.get(name).map(|n| n.kind)
    }

    pub fn property(&self, node: &str, key: &str) -> Option<String> {
        self.state
            .lock()
            .nodes
            .get(node)
            .and_then(|n| n.properties.get(key).cloned())
    }

    pub fn links(&self) -> Vec<(PadRef, PadRef)> {
        self.state.lock().links.clone()
    }

    pub fn incoming_links(&self, pad: &PadRef) -> usize {
        self.state
            .lock()
            .links
            .iter()
            .filter(|(_, dst)| dst == pad)
            .count()
    }

    /// Inputs of pipeline nodes that have no incoming link.
    pub fn unlinked_inputs(&self) -> Vec<PadRef> {
        let state = self.state.lock();
        state
            .added
            .iter()
            .filter(|name| state.nodes.get(*name).is_some_and(|n| n.kind.has_input()))
            .map(|name| PadRef::new(name.as_str(), INPUT_PAD))
            .filter(|pad| !state.is_linked(pad))
            .collect()
    }

    pub fn state(&self) -> PipelineState {
        self.state.lock().current()
    }

    /// Every state passed to `request_state`, in order.
    pub fn requested_states(&self) -> Vec<PipelineState> {
        self.state.lock().requested.clone()
    }

    /// Every state returned by `wait_for_state`, in order.
    pub fn confirmations(&self) -> Vec<PipelineState> {
        self.state.lock().confirmations.clone()
    }

    pub fn position_queries(&self) -> usize {
        self.state.lock().position_queries
    }

    pub fn graph_dumps(&self) -> usize {
        self.state.lock().graph_dumps
    }
}

impl MediaEngine for SimulatedEngine {
    fn create_node(&self, kind: NodeKind, name: &str) -> Result<(), RecorderError> {
        let mut state = self.state.lock();
        if state.fail_create.contains(&kind) || state.nodes.contains_key(name) {
            return Err(RecorderError::NodeCreation {
                kind,
                name: name.to_string(),
            });
        }
        state.nodes.insert(
            name.to_string(),
            SimNode {
                kind,
                properties: HashMap::new(),
                dynamic_pads: Vec::new(),
                request_pads: 0,
                added: false,
            },
        );
        Ok(())
    }

    fn set_property(&self, node: &str, property: &NodeProperty) -> Result<(), RecorderError> {
        let mut state = self.state.lock();
        let sim = state
            .nodes
            .get_mut(node)
            .ok_or_else(|| RecorderError::UnknownNode(node.to_string()))?;
        let value = match property {
            NodeProperty::Location(path) => {
                if sim.kind != NodeKind::FileSink {
                    return Err(RecorderError::Property {
                        node: node.to_string(),
                        message: format!("{} has no property '{}'", sim.kind, property.key()),
                    });
                }
                path.to_string_lossy().into_owned()
            }
        };
        sim.properties.insert(property.key().to_string(), value);
        Ok(())
    }

    fn add_node(&self, name: &str) -> Result<(), RecorderError> {
        let mut state = self.state.lock();
        let sim = state
            .nodes
            .get_mut(name)
            .ok_or_else(|| RecorderError::UnknownNode(name.to_string()))?;
        if sim.added {
            return Err(RecorderError::AddNode {
                name: name.to_string(),
            });
        }
        sim.added = true;
        state.added.push(name.to_string());
        Ok(())
    }

    fn link_nodes(&self, src: &str, dst: &str) -> Result<(), RecorderError> {
        let mut state = self.state.lock();
        let link_error = || RecorderError::Link {
            src: src.to_string(),
            dst: dst.to_string(),
        };

        if state.fail_links.contains(&(src.to_string(), dst.to_string())) {
            return Err(link_error());
        }
        let src_node = state.node(src)?;
        let dst_node = state.node(dst)?;
        if !src_node.added || !dst_node.added {
            return Err(link_error());
        }
        if !src_node.kind.has_static_output() || !dst_node.kind.has_input() {
            return Err(link_error());
        }

        let src_pad = if src_node.kind.is_branching() {
            PadRef::new(src, format!("{}_{}", OUTPUT_PAD, src_node.request_pads))
        } else {
            PadRef::new(src, OUTPUT_PAD)
        };
        let dst_pad = PadRef::new(dst, INPUT_PAD);
        if state.is_linked(&src_pad) || state.is_linked(&dst_pad) {
            return Err(link_error());
        }

        if let Some(n) = state.nodes.get_mut(src) {
            if n.kind.is_branching() {
                n.request_pads += 1;
            }
        }
        state.links.push((src_pad, dst_pad));
        Ok(())
    }

    fn link_pads(&self, src: &PadRef, dst: &PadRef) -> Result<(), RecorderError> {
        let mut state = self.state.lock();
        let link_error = || RecorderError::PadLink {
            src: src.node.clone(),
            dst: dst.node.clone(),
        };

        if state.fail_links.contains(&(src.node.clone(), dst.node.clone())) {
            return Err(link_error());
        }
        let src_node = state.node(&src.node)?;
        let dst_node = state.node(&dst.node)?;
        let src_exists = src_node.dynamic_pads.contains(&src.pad)
            || (src_node.kind.has_static_output() && src.pad == OUTPUT_PAD);
        let dst_exists = dst_node.kind.has_input() && dst.pad == INPUT_PAD;
        if !src_exists || !dst_exists {
            return Err(link_error());
        }
        if state.is_linked(src) || state.is_linked(dst) {
            return Err(link_error());
        }

        state.links.push((src.clone(), dst.clone()));
        Ok(())
    }

    fn is_pad_linked(&self, pad: &PadRef) -> bool {
        self.state.lock().is_linked(pad)
    }

    fn request_state(&self, target: PipelineState) -> StateChangeOutcome {
        let mut state = self.state.lock();
        state.requested.push(target);

        if state.fail_states.contains(&target) {
            return StateChangeOutcome::Failure;
        }
        if state.current() == target && state.pending.is_none() {
            return StateChangeOutcome::Success;
        }
        if state.async_transitions {
            state.pending = Some(target);
            StateChangeOutcome::Async
        } else {
            state.pending = None;
            state.state = Some(target);
            StateChangeOutcome::Success
        }
    }

    fn wait_for_state(&self) -> PipelineState {
        let mut state = self.state.lock();
        if let Some(pending) = state.pending.take() {
            state.state = Some(pending);
        }
        let current = state.current();
        state.confirmations.push(current);
        current
    }

    fn query_position(&self) -> Option<Duration> {
        let mut state = self.state.lock();
        state.position_queries += 1;
        state.positions.pop_front().flatten()
    }

    fn connect_events(&self, callback: EventCallback) {
        *self.callback.lock() = Some(callback);
    }

    fn dump_graph(&self, _label: &str) {
        self.state.lock().graph_dumps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(nodes: &[(NodeKind, &str)]) -> SimulatedEngine {
        let engine = SimulatedEngine::new();
        for (kind, name) in nodes {
            engine.create_node(*kind, name).unwrap();
            engine.add_node(name).unwrap();
        }
        engine
    }

    #[test]
    fn second_link_into_same_input_fails() {
        let engine = engine_with(&[
            (NodeKind::Source, "a"),
            (NodeKind::Queue, "b"),
            (NodeKind::Queue, "c"),
        ]);

        engine.link_nodes("a", "c").unwrap();
        assert!(engine.link_nodes("b", "c").is_err());
        assert_eq!(engine.incoming_links(&PadRef::new("c", "sink")), 1);
    }

    #[test]
    fn splitter_feeds_several_branches() {
        let engine = engine_with(&[
            (NodeKind::Splitter, "tee"),
            (NodeKind::Queue, "q1"),
            (NodeKind::Queue, "q2"),
        ]);

        engine.link_nodes("tee", "q1").unwrap();
        engine.link_nodes("tee", "q2").unwrap();
        assert_eq!(engine.links().len(), 2);
    }

    #[test]
    fn decoder_has_no_static_output() {
        let engine = engine_with(&[(NodeKind::Decoder, "dec"), (NodeKind::Converter, "conv")]);
        assert!(engine.link_nodes("dec", "conv").is_err());

        let pad = engine.add_dynamic_pad("dec", "src_0");
        engine.link_pads(&pad, &PadRef::new("conv", "sink")).unwrap();
    }

    #[test]
    fn nodes_must_be_added_before_linking() {
        let engine = SimulatedEngine::new();
        engine.create_node(NodeKind::Source, "a").unwrap();
        engine.create_node(NodeKind::Queue, "b").unwrap();
        assert!(engine.link_nodes("a", "b").is_err());
    }

    #[test]
    fn async_transition_confirmed_by_wait() {
        let engine = SimulatedEngine::new();
        engine.set_async_transitions(true);

        assert_eq!(engine.request_state(PipelineState::Prepared), StateChangeOutcome::Async);
        assert_eq!(engine.state(), PipelineState::Idle);
        assert_eq!(engine.wait_for_state(), PipelineState::Prepared);
        assert_eq!(engine.confirmations(), vec![PipelineState::Prepared]);
    }

    #[test]
    fn scripted_positions_then_none() {
        let engine = SimulatedEngine::new();
        engine.script_positions([None, Some(Duration::from_secs(1))]);

        assert_eq!(engine.query_position(), None);
        assert_eq!(engine.query_position(), Some(Duration::from_secs(1)));
        assert_eq!(engine.query_position(), None);
        assert_eq!(engine.position_queries(), 3);
    }
}
