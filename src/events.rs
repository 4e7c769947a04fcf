//! Typed training notifications.
//!
//! Per-epoch progress and per-layer completion are two distinct channels
//! with distinct payloads, delivered synchronously on the training thread.
//! Observers are plain `&mut` handles passed into the training calls; the
//! core keeps no event state of its own.

/// One epoch of CD-1 training finished: `(layer, epoch, error)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochEvent {
    pub layer: usize,
    pub epoch: usize,
    pub error: f32,
}

/// One layer of greedy pretraining finished: `(layer, final_error)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerEvent {
    pub layer: usize,
    pub final_error: f32,
}

/// Observer for a single engine's training loop.
///
/// [`crate::Rbm::train`] invokes this once per epoch with that epoch's
/// reconstruction error. Default implementation ignores the event.
pub trait EpochObserver {
    fn on_epoch_complete(&mut self, epoch: usize, error: f32) {
        let _ = (epoch, error);
    }
}

/// Observer for layer-wise pretraining of a whole network.
///
/// [`crate::DeepBeliefNetwork::train_all`] forwards each engine's epoch
/// events tagged with the owning layer index, and additionally reports
/// each layer's final error when that layer finishes. Both methods default
/// to no-ops so implementors can subscribe to either channel alone.
pub trait TrainingObserver {
    fn on_epoch_complete(&mut self, layer: usize, epoch: usize, error: f32) {
        let _ = (layer, epoch, error);
    }

    fn on_layer_complete(&mut self, layer: usize, final_error: f32) {
        let _ = (layer, final_error);
    }
}

/// Observer that discards all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl EpochObserver for NullObserver {}
impl TrainingObserver for NullObserver {}

/// Records every epoch error from a single engine, in order.
#[derive(Debug, Default, Clone)]
pub struct EpochRecorder {
    pub epochs: Vec<(usize, f32)>,
}

impl EpochObserver for EpochRecorder {
    fn on_epoch_complete(&mut self, epoch: usize, error: f32) {
        self.epochs.push((epoch, error));
    }
}

/// Records the full event stream of a layer-wise pretraining run.
#[derive(Debug, Default, Clone)]
pub struct PretrainRecorder {
    pub epochs: Vec<EpochEvent>,
    pub layers: Vec<LayerEvent>,
}

impl PretrainRecorder {
    /// Number of epoch events recorded for a given layer.
    pub fn epochs_for_layer(&self, layer: usize) -> usize {
        self.epochs.iter().filter(|e| e.layer == layer).count()
    }
}

impl TrainingObserver for PretrainRecorder {
    fn on_epoch_complete(&mut self, layer: usize, epoch: usize, error: f32) {
        self.epochs.push(EpochEvent {
            layer,
            epoch,
            error,
        });
    }

    fn on_layer_complete(&mut self, layer: usize, final_error: f32) {
        self.layers.push(LayerEvent { layer, final_error });
    }
}
