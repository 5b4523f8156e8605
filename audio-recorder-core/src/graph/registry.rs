use crate::models::error::RecorderError;
use crate::models::node::NodeSpec;
use crate::traits::engine::MediaEngine;

/// Creates named processing nodes through the engine.
///
/// A creation failure means the runtime lacks a capability (a missing
/// plugin, no capture device), so it is reported once and never retried.
pub struct NodeRegistry<'a, E: MediaEngine + ?Sized> {
    engine: &'a E,
    created: Vec<String>,
}

impl<'a, E: MediaEngine + ?Sized> NodeRegistry<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self {
            engine,
            created: Vec::new(),
        }
    }

    /// Instantiate `spec` and apply its properties.
    pub fn create(&mut self, spec: &NodeSpec) -> Result<(), RecorderError> {
        if self.created.contains(&spec.name) {
            return Err(RecorderError::NodeCreation {
                kind: spec.kind,
                name: spec.name.clone(),
            });
        }

        self.engine.create_node(spec.kind, &spec.name).map_err(|e| {
            log::error!("Could not create '{}' ({}): {}", spec.name, spec.kind, e);
            RecorderError::NodeCreation {
                kind: spec.kind,
                name: spec.name.clone(),
            }
        })?;

        for property in &spec.properties {
            self.engine.set_property(&spec.name, property)?;
        }

        log::debug!("Created '{}' ({})", spec.name, spec.kind);
        self.created.push(spec.name.clone());
        Ok(())
    }

    /// Names of the nodes created so far, in creation order.
    pub fn created(&self) -> &[String] {
        &self.created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::node::{NodeKind, NodeProperty};
    use crate::simulated::SimulatedEngine;

    #[test]
    fn creates_and_configures() {
        let engine = SimulatedEngine::new();
        let mut registry = NodeRegistry::new(&engine);

        let spec = NodeSpec::new(NodeKind::FileSink, "file-sink")
            .with_property(NodeProperty::Location("/tmp/out.wav".into()));
        registry.create(&spec).unwrap();

        assert_eq!(registry.created(), ["file-sink".to_string()]);
        assert_eq!(
            engine.property("file-sink", "location").as_deref(),
            Some("/tmp/out.wav")
        );
    }

    #[test]
    fn missing_capability_names_the_node() {
        let engine = SimulatedEngine::new();
        engine.fail_node_creation(NodeKind::Mp3Encoder);
        let mut registry = NodeRegistry::new(&engine);

        let err = registry
            .create(&NodeSpec::new(NodeKind::Mp3Encoder, "mp3-encoder"))
            .unwrap_err();

        assert_eq!(
            err,
            RecorderError::NodeCreation {
                kind: NodeKind::Mp3Encoder,
                name: "mp3-encoder".into()
            }
        );
        assert!(registry.created().is_empty());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let engine = SimulatedEngine::new();
        let mut registry = NodeRegistry::new(&engine);
        let spec = NodeSpec::new(NodeKind::Queue, "queue-a");

        registry.create(&spec).unwrap();
        assert!(registry.create(&spec).is_err());
    }
}
