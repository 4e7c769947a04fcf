//! The DBN composer: an ordered stack of RBM engines.
//!
//! Engine i's hidden units are engine i+1's visible units. Encoding runs
//! bottom-up through the stochastic hidden passes; decoding runs top-down
//! through the visible passes. Pretraining is greedy and layer-wise: each
//! engine trains to completion before its hidden samples become the next
//! engine's training data.

use ndarray::Array2;
use rand::Rng;

use crate::core::{DbnError, DbnResult, Rbm};
use crate::events::{EpochObserver, TrainingObserver};
use crate::utils::uniform_random_bool;
use crate::PretrainConfig;

/// Forwards one engine's epoch notifications to a network-level observer,
/// tagged with the owning layer index.
struct LayerEpochs<'a> {
    layer: usize,
    inner: &'a mut dyn TrainingObserver,
}

impl EpochObserver for LayerEpochs<'_> {
    fn on_epoch_complete(&mut self, epoch: usize, error: f32) {
        self.inner.on_epoch_complete(self.layer, epoch, error);
    }
}

/// A stack of RBM engines trained greedily, layer by layer.
///
/// The composer holds no mutable state of its own; training mutates the
/// engines in place, in strict layer order. Inference calls must not
/// overlap a running `train_all` — the caller serializes them.
#[derive(Debug, Clone)]
pub struct DeepBeliefNetwork {
    rbms: Vec<Rbm>,
}

impl DeepBeliefNetwork {
    /// Build a network from a layer-size sequence.
    ///
    /// `layer_sizes` lists the unit counts of every layer, visible first;
    /// each adjacent pair becomes one engine, so `[v0, v1, v2]` yields two
    /// engines with `engine0.hidden == v1 == engine1.visible` by
    /// construction.
    ///
    /// # Errors
    ///
    /// `InvalidArchitecture` if fewer than two sizes are given, any size
    /// is zero, or the learning rate is invalid.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        learning_rate: f32,
        rng: &mut R,
    ) -> DbnResult<Self> {
        if layer_sizes.len() < 2 {
            return Err(DbnError::InvalidArchitecture(format!(
                "a network needs at least two layer sizes (got {})",
                layer_sizes.len()
            )));
        }

        let mut rbms = Vec::with_capacity(layer_sizes.len() - 1);
        for pair in layer_sizes.windows(2) {
            rbms.push(Rbm::new(pair[0], pair[1], learning_rate, rng)?);
        }
        Ok(Self { rbms })
    }

    /// Build a network from pre-constructed engines, validating the chain.
    ///
    /// # Errors
    ///
    /// `InvalidArchitecture` if the sequence is empty or any engine's
    /// hidden unit count differs from the next engine's visible count.
    pub fn from_engines(rbms: Vec<Rbm>) -> DbnResult<Self> {
        if rbms.is_empty() {
            return Err(DbnError::InvalidArchitecture(
                "a network needs at least one engine".to_string(),
            ));
        }
        for (i, pair) in rbms.windows(2).enumerate() {
            if pair[0].num_hidden() != pair[1].num_visible() {
                return Err(DbnError::InvalidArchitecture(format!(
                    "engine {} has {} hidden units but engine {} expects {} visible units",
                    i,
                    pair[0].num_hidden(),
                    i + 1,
                    pair[1].num_visible()
                )));
            }
        }
        Ok(Self { rbms })
    }

    /// The engines, in visible-to-deepest order.
    pub fn engines(&self) -> &[Rbm] {
        &self.rbms
    }

    pub fn num_layers(&self) -> usize {
        self.rbms.len()
    }

    /// Encode data bottom-up into the deepest hidden representation.
    pub fn encode<R: Rng + ?Sized>(
        &self,
        data: &Array2<f32>,
        rng: &mut R,
    ) -> DbnResult<Array2<f32>> {
        let mut current = data.clone();
        for rbm in &self.rbms {
            current = rbm.hidden_layer(&current, rng)?;
        }
        Ok(current)
    }

    /// Decode a deepest-layer representation top-down into visible states.
    pub fn decode<R: Rng + ?Sized>(
        &self,
        data: &Array2<f32>,
        rng: &mut R,
    ) -> DbnResult<Array2<f32>> {
        let mut current = data.clone();
        for rbm in self.rbms.iter().rev() {
            current = rbm.visible_layer(&current, rng)?;
        }
        Ok(current)
    }

    /// Encode then decode: a full round trip through the stack.
    pub fn reconstruct<R: Rng + ?Sized>(
        &self,
        data: &Array2<f32>,
        rng: &mut R,
    ) -> DbnResult<Array2<f32>> {
        let encoded = self.encode(data, rng)?;
        self.decode(&encoded, rng)
    }

    /// Reconstruct random noise to surface the strongest learned features.
    ///
    /// Draws a `number_of_dreams × visible` Bernoulli(0.5) matrix and runs
    /// it through the full encode/decode round trip.
    pub fn day_dream<R: Rng + ?Sized>(
        &self,
        number_of_dreams: usize,
        rng: &mut R,
    ) -> DbnResult<Array2<f32>> {
        let noise = uniform_random_bool(number_of_dreams, self.rbms[0].num_visible(), rng);
        self.reconstruct(&noise, rng)
    }

    /// Greedy layer-wise pretraining.
    ///
    /// Trains each engine in ascending order with the current epoch
    /// budget, then replaces the training data with that engine's
    /// stochastic hidden samples and multiplies the budget by
    /// `epoch_multiplier` before moving on. Deeper layers thus train on
    /// learned codes, not raw input, and receive progressively larger
    /// budgets. Each finished layer emits `on_layer_complete` with its
    /// final epoch error.
    ///
    /// Returns the per-layer final errors, in layer order.
    pub fn train_all<R: Rng + ?Sized>(
        &mut self,
        visible: &Array2<f32>,
        config: &PretrainConfig,
        rng: &mut R,
        observer: &mut dyn TrainingObserver,
    ) -> DbnResult<Vec<f32>> {
        let mut data = visible.clone();
        let mut epochs = config.epochs;
        let mut final_errors = Vec::with_capacity(self.rbms.len());

        for (layer, rbm) in self.rbms.iter_mut().enumerate() {
            let error = {
                let mut forwarder = LayerEpochs {
                    layer,
                    inner: &mut *observer,
                };
                rbm.train(&data, epochs, rng, &mut forwarder)?
            };
            data = rbm.hidden_layer(&data, rng)?;
            epochs *= config.epoch_multiplier;

            observer.on_layer_complete(layer, error);
            final_errors.push(error);
        }

        Ok(final_errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PretrainRecorder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn network(seed: u64) -> DeepBeliefNetwork {
        let mut rng = StdRng::seed_from_u64(seed);
        DeepBeliefNetwork::new(&[4, 3, 2], 0.1, &mut rng).expect("valid network")
    }

    fn all_ones(rows: usize, cols: usize) -> Array2<f32> {
        Array2::from_elem((rows, cols), 1.0)
    }

    #[test]
    fn test_layer_chain_from_sizes() {
        let net = network(1);
        assert_eq!(net.num_layers(), 2);
        assert_eq!(net.engines()[0].num_visible(), 4);
        assert_eq!(net.engines()[0].num_hidden(), 3);
        assert_eq!(net.engines()[1].num_visible(), 3);
        assert_eq!(net.engines()[1].num_hidden(), 2);
    }

    #[test]
    fn test_too_short_size_sequence_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            DeepBeliefNetwork::new(&[4], 0.1, &mut rng),
            Err(DbnError::InvalidArchitecture(_))
        ));
        assert!(matches!(
            DeepBeliefNetwork::new(&[], 0.1, &mut rng),
            Err(DbnError::InvalidArchitecture(_))
        ));
        assert!(matches!(
            DeepBeliefNetwork::new(&[4, 0, 2], 0.1, &mut rng),
            Err(DbnError::InvalidArchitecture(_))
        ));
    }

    #[test]
    fn test_inconsistent_engine_chain_rejected() {
        let mut rng = StdRng::seed_from_u64(2);
        let a = Rbm::new(4, 3, 0.1, &mut rng).expect("rbm");
        let b = Rbm::new(5, 2, 0.1, &mut rng).expect("rbm");
        assert!(matches!(
            DeepBeliefNetwork::from_engines(vec![a, b]),
            Err(DbnError::InvalidArchitecture(_))
        ));
        assert!(matches!(
            DeepBeliefNetwork::from_engines(Vec::new()),
            Err(DbnError::InvalidArchitecture(_))
        ));

        let a = Rbm::new(4, 3, 0.1, &mut rng).expect("rbm");
        let b = Rbm::new(3, 2, 0.1, &mut rng).expect("rbm");
        assert!(DeepBeliefNetwork::from_engines(vec![a, b]).is_ok());
    }

    #[test]
    fn test_encode_decode_shapes() {
        let net = network(3);
        let mut rng = StdRng::seed_from_u64(10);
        let data = all_ones(5, 4);

        let code = net.encode(&data, &mut rng).expect("encode");
        assert_eq!(code.dim(), (5, 2));
        assert!(code.iter().all(|&v| v == 0.0 || v == 1.0));

        let decoded = net.decode(&code, &mut rng).expect("decode");
        assert_eq!(decoded.dim(), (5, 4));

        let recon = net.reconstruct(&data, &mut rng).expect("reconstruct");
        assert_eq!(recon.dim(), (5, 4));
        assert!(recon.iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_epoch_budget_grows_per_layer() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut net = DeepBeliefNetwork::new(&[4, 3, 3, 2], 0.1, &mut rng).expect("network");

        let config = PretrainConfig {
            epochs: 2,
            epoch_multiplier: 3,
        };
        let mut rec = PretrainRecorder::default();
        let errors = net
            .train_all(&all_ones(5, 4), &config, &mut rng, &mut rec)
            .expect("train_all");

        assert_eq!(rec.epochs_for_layer(0), 2);
        assert_eq!(rec.epochs_for_layer(1), 6);
        assert_eq!(rec.epochs_for_layer(2), 18);
        assert_eq!(errors.len(), 3);

        // One completion event per layer, carrying that layer's final error.
        assert_eq!(rec.layers.len(), 3);
        for (layer, event) in rec.layers.iter().enumerate() {
            assert_eq!(event.layer, layer);
            assert_eq!(event.final_error, errors[layer]);
        }
    }

    #[test]
    fn test_train_all_is_deterministic_under_fixed_seed() {
        let data = all_ones(6, 4);
        let config = PretrainConfig {
            epochs: 3,
            epoch_multiplier: 2,
        };

        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut net = DeepBeliefNetwork::new(&[4, 3, 2], 0.1, &mut rng).expect("network");
            let mut rec = PretrainRecorder::default();
            let errors = net
                .train_all(&data, &config, &mut rng, &mut rec)
                .expect("train_all");
            (errors, rec.epochs, net)
        };

        let (errors_a, epochs_a, net_a) = run(7);
        let (errors_b, epochs_b, net_b) = run(7);

        assert_eq!(errors_a, errors_b);
        assert_eq!(epochs_a, epochs_b);
        for (a, b) in net_a.engines().iter().zip(net_b.engines()) {
            assert_eq!(a.weights(), b.weights());
        }
    }

    #[test]
    fn test_train_all_shape_error_propagates() {
        let mut net = network(5);
        let mut rng = StdRng::seed_from_u64(11);
        let config = PretrainConfig::default();

        let wrong = all_ones(5, 3);
        assert!(matches!(
            net.train_all(&wrong, &config, &mut rng, &mut crate::NullObserver),
            Err(DbnError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_day_dream_shape() {
        let net = network(6);
        let mut rng = StdRng::seed_from_u64(12);

        let dreams = net.day_dream(10, &mut rng).expect("day_dream");
        assert_eq!(dreams.dim(), (10, 4));
        assert!(dreams.iter().all(|&v| v == 0.0 || v == 1.0));
    }
}
