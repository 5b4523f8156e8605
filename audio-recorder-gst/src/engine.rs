//! GStreamer implementation of `MediaEngine`.
//!
//! Nodes are `gst::Element`s inside one `gst::Pipeline`, addressed by the
//! element name. Pad notifications come from `pad-added` on the element's
//! streaming thread; bus messages are taken synchronously by a bus sync
//! handler and forwarded to the recorder, so no GLib main loop is needed.

use std::collections::HashMap;
use std::time::Duration;

use gst::prelude::*;
use gstreamer as gst;
use parking_lot::Mutex;

use audio_recorder_core::models::error::RecorderError;
use audio_recorder_core::models::event::{BusMessage, EngineEvent};
use audio_recorder_core::models::node::{NodeKind, NodeProperty, PadRef};
use audio_recorder_core::models::state::{PipelineState, StateChangeOutcome};
use audio_recorder_core::traits::engine::{EventCallback, MediaEngine};

use crate::error::GstEngineError;
use crate::factory::factory_name;

pub struct GstEngine {
    pipeline: gst::Pipeline,
    elements: Mutex<HashMap<String, gst::Element>>,
}

impl GstEngine {
    /// Initialise GStreamer and create an empty pipeline named `name`.
    pub fn new(name: &str) -> Result<Self, GstEngineError> {
        gst::init().map_err(|e| GstEngineError::Init(e.to_string()))?;
        Ok(Self {
            pipeline: gst::Pipeline::with_name(name),
            elements: Mutex::new(HashMap::new()),
        })
    }

    pub fn pipeline(&self) -> &gst::Pipeline {
        &self.pipeline
    }

    fn element(&self, name: &str) -> Result<gst::Element, RecorderError> {
        self.elements
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| RecorderError::UnknownNode(name.to_string()))
    }

    fn pad(&self, pad: &PadRef) -> Result<gst::Pad, GstEngineError> {
        self.element(&pad.node)
            .ok()
            .and_then(|element| element.static_pad(&pad.pad))
            .ok_or_else(|| GstEngineError::MissingPad {
                node: pad.node.clone(),
                pad: pad.pad.clone(),
            })
    }
}

fn gst_state(state: PipelineState) -> gst::State {
    match state {
        PipelineState::Idle | PipelineState::Stopped => gst::State::Null,
        PipelineState::Prepared => gst::State::Ready,
        PipelineState::Running => gst::State::Playing,
    }
}

fn pipeline_state(state: gst::State) -> PipelineState {
    match state {
        gst::State::Ready | gst::State::Paused => PipelineState::Prepared,
        gst::State::Playing => PipelineState::Running,
        gst::State::Null => PipelineState::Stopped,
        _ => PipelineState::Idle,
    }
}

fn bus_message(message: &gst::Message) -> BusMessage {
    let source = message
        .src()
        .map(|src| src.name().to_string())
        .unwrap_or_default();
    match message.view() {
        gst::MessageView::Eos(_) => BusMessage::eos(source),
        gst::MessageView::Error(err) => BusMessage::error(
            source,
            err.error().to_string(),
            err.debug().map(|d| d.to_string()),
        ),
        _ => BusMessage::other(source, format!("{:?}", message.type_())),
    }
}

impl MediaEngine for GstEngine {
    fn create_node(&self, kind: NodeKind, name: &str) -> Result<(), RecorderError> {
        let factory = factory_name(kind);
        let element = gst::ElementFactory::make(factory)
            .name(name)
            .build()
            .map_err(|e| {
                log::error!(
                    "{}",
                    GstEngineError::Factory {
                        factory,
                        node: name.to_string(),
                        message: e.to_string(),
                    }
                );
                RecorderError::NodeCreation {
                    kind,
                    name: name.to_string(),
                }
            })?;
        self.elements.lock().insert(name.to_string(), element);
        Ok(())
    }

    fn set_property(&self, node: &str, property: &NodeProperty) -> Result<(), RecorderError> {
        let element = self.element(node)?;
        let key = property.key();
        if element.find_property(key).is_none() {
            return Err(RecorderError::Property {
                node: node.to_string(),
                message: format!("no property '{}'", key),
            });
        }
        match property {
            NodeProperty::Location(path) => {
                let location = path.to_string_lossy().into_owned();
                element.set_property(key, location);
            }
        }
        Ok(())
    }

    fn add_node(&self, name: &str) -> Result<(), RecorderError> {
        let element = self.element(name)?;
        self.pipeline.add(&element).map_err(|e| {
            log::debug!("{}", e);
            RecorderError::AddNode {
                name: name.to_string(),
            }
        })
    }

    fn link_nodes(&self, src: &str, dst: &str) -> Result<(), RecorderError> {
        let src_element = self.element(src)?;
        let dst_element = self.element(dst)?;
        src_element.link(&dst_element).map_err(|e| {
            log::debug!("{}", e);
            RecorderError::Link {
                src: src.to_string(),
                dst: dst.to_string(),
            }
        })
    }

    fn link_pads(&self, src: &PadRef, dst: &PadRef) -> Result<(), RecorderError> {
        let link_error = || RecorderError::PadLink {
            src: src.node.clone(),
            dst: dst.node.clone(),
        };
        let (src_pad, dst_pad) = match (self.pad(src), self.pad(dst)) {
            (Ok(s), Ok(d)) => (s, d),
            (Err(e), _) | (_, Err(e)) => {
                log::error!("{}", e);
                return Err(link_error());
            }
        };
        src_pad.link(&dst_pad).map(|_| ()).map_err(|e| {
            log::error!("Linking {} to {}: {:?}", src, dst, e);
            link_error()
        })
    }

    fn is_pad_linked(&self, pad: &PadRef) -> bool {
        self.pad(pad).is_ok_and(|p| p.is_linked())
    }

    fn request_state(&self, target: PipelineState) -> StateChangeOutcome {
        match self.pipeline.set_state(gst_state(target)) {
            Ok(gst::StateChangeSuccess::Success) => StateChangeOutcome::Success,
            Ok(gst::StateChangeSuccess::Async) => StateChangeOutcome::Async,
            Ok(gst::StateChangeSuccess::NoPreroll) => StateChangeOutcome::NoPreroll,
            Err(_) => StateChangeOutcome::Failure,
        }
    }

    fn wait_for_state(&self) -> PipelineState {
        let (result, current, _pending) = self.pipeline.state(gst::ClockTime::NONE);
        if let Err(e) = result {
            log::warn!("State change did not complete: {:?}", e);
        }
        pipeline_state(current)
    }

    fn query_position(&self) -> Option<Duration> {
        self.pipeline
            .query_position::<gst::ClockTime>()
            .map(|position| Duration::from_nanos(position.nseconds()))
    }

    fn connect_events(&self, callback: EventCallback) {
        for element in self.elements.lock().values() {
            let callback = callback.clone();
            element.connect_pad_added(move |element, pad| {
                callback(EngineEvent::PadAdded(PadRef::new(
                    element.name().as_str(),
                    pad.name().as_str(),
                )));
            });
        }

        match self.pipeline.bus() {
            Some(bus) => bus.set_sync_handler(move |_, message| {
                callback(EngineEvent::Message(bus_message(message)));
                gst::BusSyncReply::Drop
            }),
            None => log::error!("{}", GstEngineError::NoBus),
        }
    }

    fn dump_graph(&self, label: &str) {
        self.pipeline
            .debug_to_dot_file_with_ts(gst::DebugGraphDetails::all(), label);
    }
}

impl Drop for GstEngine {
    fn drop(&mut self) {
        if let Some(bus) = self.pipeline.bus() {
            bus.unset_sync_handler();
        }
        if self.pipeline.set_state(gst::State::Null).is_err() {
            log::warn!("Failed to reset pipeline on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_mapping_round_trips_through_gstreamer_states() {
        for state in [PipelineState::Prepared, PipelineState::Running, PipelineState::Stopped] {
            assert_eq!(pipeline_state(gst_state(state)), state);
        }
    }

    #[test]
    fn creates_and_links_core_elements() {
        let engine = GstEngine::new("test").unwrap();
        engine.create_node(NodeKind::Converter, "converter").unwrap();
        engine.create_node(NodeKind::DiscardSink, "discard-sink").unwrap();
        engine.add_node("converter").unwrap();
        engine.add_node("discard-sink").unwrap();

        engine.link_nodes("converter", "discard-sink").unwrap();

        assert!(engine.is_pad_linked(&PadRef::new("discard-sink", "sink")));
        assert!(matches!(
            engine.set_property("converter", &NodeProperty::Location("x".into())),
            Err(RecorderError::Property { .. })
        ));
    }
}
