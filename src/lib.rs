//! # DBN (Deep Belief Networks)
//!
//! Restricted Boltzmann Machines trained by single-step contrastive
//! divergence (CD-1), and Deep Belief Networks that stack them for greedy
//! layer-wise pretraining and generative ("daydream") sampling.
//!
//! ## Overview
//!
//! An RBM is a two-layer stochastic network with symmetric weights and no
//! intra-layer connections. Training clamps the visible layer to data,
//! samples the hidden layer, runs one Gibbs step to produce a
//! reconstruction, and nudges the weights toward the data statistics and
//! away from the model statistics. A DBN trains a stack of RBMs bottom-up,
//! each layer learning to model the stochastic hidden code of the layer
//! below it.
//!
//! ## Structure
//!
//! - [`core`] — the RBM engine: CD-1 training, stochastic inference, Gibbs
//!   daydreaming
//! - [`dbn`] — the composer: layer chain construction, multi-layer
//!   encode/decode, greedy pretraining
//! - [`events`] — typed per-epoch and per-layer training notifications
//! - [`utils`] — logistic activation, Bernoulli sampling, bias-column
//!   handling, random-matrix constructors
//!
//! ## Randomness
//!
//! There is no ambient random source. Every stochastic operation takes an
//! explicit [`rand::Rng`] handle, so a seeded generator makes training and
//! sampling bit-reproducible.

pub mod core;
pub mod dbn;
pub mod events;
pub mod utils;

pub use crate::core::{DbnError, DbnResult, Rbm};
pub use crate::dbn::DeepBeliefNetwork;
pub use crate::events::{
    EpochEvent, EpochObserver, EpochRecorder, LayerEvent, NullObserver, PretrainRecorder,
    TrainingObserver,
};

/// Epoch budget for greedy layer-wise pretraining.
///
/// Used by [`DeepBeliefNetwork::train_all`]. The first engine trains for
/// `epochs` epochs; each deeper engine's budget is the previous budget
/// multiplied by `epoch_multiplier`, so deeper layers receive progressively
/// more training on the increasingly abstract codes they model.
#[derive(Debug, Clone)]
pub struct PretrainConfig {
    pub epochs: usize,
    pub epoch_multiplier: usize,
}

impl Default for PretrainConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            epoch_multiplier: 2,
        }
    }
}
