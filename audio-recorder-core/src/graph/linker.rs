use std::sync::atomic::{AtomicBool, Ordering};

use crate::models::error::RecorderError;
use crate::models::node::PadRef;
use crate::traits::engine::MediaEngine;

use super::assembler::PendingLink;

/// What happened to a "connection point added" notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadLinkOutcome {
    Linked,
    /// The pad belongs to some other node.
    Ignored,
    /// The destination already has its link; duplicates are expected.
    AlreadyLinked,
}

/// Completes the decoder → converter link once the decoder announces its
/// output.
///
/// May be called concurrently from engine streaming threads. The first
/// caller claims the link with an atomic flag; the engine enforces the
/// one-incoming-link rule on the destination as well.
pub struct PadLinker {
    pending: PendingLink,
    claimed: AtomicBool,
}

impl PadLinker {
    pub fn new(pending: PendingLink) -> Self {
        Self {
            pending,
            claimed: AtomicBool::new(false),
        }
    }

    pub fn on_pad_added<E: MediaEngine + ?Sized>(
        &self,
        engine: &E,
        pad: &PadRef,
    ) -> Result<PadLinkOutcome, RecorderError> {
        if pad.node != self.pending.src_node {
            return Ok(PadLinkOutcome::Ignored);
        }

        if engine.is_pad_linked(&self.pending.dst)
            || self
                .claimed
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            log::warn!("{}'s {} pad is already linked", self.pending.dst.node, self.pending.dst.pad);
            return Ok(PadLinkOutcome::AlreadyLinked);
        }

        engine.link_pads(pad, &self.pending.dst).map_err(|e| {
            log::error!(
                "'{}' and '{}' could not be linked: {}",
                self.pending.src_node,
                self.pending.dst.node,
                e
            );
            RecorderError::PadLink {
                src: self.pending.src_node.clone(),
                dst: self.pending.dst.node.clone(),
            }
        })?;

        log::info!("Linked '{}' to '{}'", self.pending.src_node, self.pending.dst.node);
        engine.dump_graph("pipeline");
        Ok(PadLinkOutcome::Linked)
    }

    /// Whether a link has been claimed (successfully or not).
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::assembler::{CONVERTER, DECODER};
    use crate::models::node::NodeKind;
    use crate::simulated::SimulatedEngine;
    use std::sync::Arc;
    use std::thread;

    fn engine_with_decoder() -> SimulatedEngine {
        let engine = SimulatedEngine::new();
        for (kind, name) in [(NodeKind::Decoder, DECODER), (NodeKind::Converter, CONVERTER)] {
            engine.create_node(kind, name).unwrap();
            engine.add_node(name).unwrap();
        }
        engine
    }

    fn linker() -> PadLinker {
        PadLinker::new(PendingLink {
            src_node: DECODER.into(),
            dst: PadRef::new(CONVERTER, "sink"),
        })
    }

    #[test]
    fn links_decoder_pad() {
        let engine = engine_with_decoder();
        let pad = engine.add_dynamic_pad(DECODER, "src_0");

        let outcome = linker().on_pad_added(&engine, &pad).unwrap();

        assert_eq!(outcome, PadLinkOutcome::Linked);
        assert!(engine.is_pad_linked(&PadRef::new(CONVERTER, "sink")));
        assert_eq!(engine.graph_dumps(), 1);
    }

    #[test]
    fn ignores_other_nodes() {
        let engine = engine_with_decoder();
        let pad = PadRef::new("splitter", "src_1");

        assert_eq!(linker().on_pad_added(&engine, &pad).unwrap(), PadLinkOutcome::Ignored);
        assert!(!engine.is_pad_linked(&PadRef::new(CONVERTER, "sink")));
    }

    #[test]
    fn repeated_notifications_link_once() {
        let engine = engine_with_decoder();
        let linker = linker();
        let first = engine.add_dynamic_pad(DECODER, "src_0");
        let second = engine.add_dynamic_pad(DECODER, "src_1");

        assert_eq!(linker.on_pad_added(&engine, &first).unwrap(), PadLinkOutcome::Linked);
        assert_eq!(
            linker.on_pad_added(&engine, &second).unwrap(),
            PadLinkOutcome::AlreadyLinked
        );
        assert_eq!(
            linker.on_pad_added(&engine, &first).unwrap(),
            PadLinkOutcome::AlreadyLinked
        );
        assert_eq!(engine.incoming_links(&PadRef::new(CONVERTER, "sink")), 1);
    }

    #[test]
    fn concurrent_notifications_link_once() {
        let engine = Arc::new(engine_with_decoder());
        let linker = Arc::new(linker());
        let pads: Vec<PadRef> = (0..8)
            .map(|i| engine.add_dynamic_pad(DECODER, &format!("src_{}", i)))
            .collect();

        let handles: Vec<_> = pads
            .into_iter()
            .map(|pad| {
                let engine = Arc::clone(&engine);
                let linker = Arc::clone(&linker);
                thread::spawn(move || linker.on_pad_added(&*engine, &pad).unwrap())
            })
            .collect();
        let outcomes: Vec<PadLinkOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(outcomes.iter().filter(|o| **o == PadLinkOutcome::Linked).count(), 1);
        assert_eq!(
            outcomes.iter().filter(|o| **o == PadLinkOutcome::AlreadyLinked).count(),
            7
        );
        assert_eq!(engine.incoming_links(&PadRef::new(CONVERTER, "sink")), 1);
    }

    #[test]
    fn link_failure_is_reported() {
        let engine = engine_with_decoder();
        engine.fail_link(DECODER, CONVERTER);
        let pad = engine.add_dynamic_pad(DECODER, "src_0");

        let err = linker().on_pad_added(&engine, &pad).unwrap_err();

        assert_eq!(
            err,
            RecorderError::PadLink {
                src: DECODER.into(),
                dst: CONVERTER.into()
            }
        );
    }
}
