//! The RBM engine: CD-1 training, stochastic inference, Gibbs daydreaming.
//!
//! A Restricted Boltzmann Machine is a two-layer stochastic network. The
//! weight matrix carries an extra leading row and column for the bias
//! unit, which is treated as a fixed input of 1 during every forward and
//! backward pass.
//!
//! ## Contrastive divergence (CD-1)
//!
//! Per epoch, with `data` the bias-augmented input of N examples:
//! ```text
//! posProbs  = logistic(data · W)            (bias column forced to 1)
//! posStates = bernoulli(posProbs)
//! posAssoc  = dataᵀ · posProbs
//! negProbs  = logistic(posStates · Wᵀ)      (bias column forced to 1)
//! negAssoc  = negProbsᵀ · logistic(negProbs · W)
//! W += learningRate · (posAssoc − negAssoc) / N
//! ```
//! Associations use probabilities rather than sampled states for a
//! lower-variance gradient estimate (Hinton's practical guide, section 3).

use ndarray::{s, Array2};
use rand::Rng;
use std::error::Error;
use std::fmt;

use crate::events::EpochObserver;
use crate::utils::{
    bernoulli_sample, gaussian_random, insert_bias_column, logistic_matrix, strip_bias_column,
    uniform_random_bool,
};

/// Error type for RBM and DBN operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbnError {
    /// Invalid network configuration, detected at construction.
    InvalidArchitecture(String),
    /// Input dimensions disagree with the configured unit counts.
    ShapeMismatch(String),
}

impl fmt::Display for DbnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbnError::InvalidArchitecture(msg) => write!(f, "Invalid architecture: {}", msg),
            DbnError::ShapeMismatch(msg) => write!(f, "Shape mismatch: {}", msg),
        }
    }
}

impl Error for DbnError {}

pub type DbnResult<T> = Result<T, DbnError>;

/// A Restricted Boltzmann Machine with an explicit bias unit.
///
/// # Weight layout
///
/// `weights` has shape `(num_visible + 1, num_hidden + 1)`. Row 0 and
/// column 0 hold the bias connections; the remaining block holds the
/// visible↔hidden couplings. The interior is initialized from
/// `0.1 · N(0, 1)` to break symmetry without saturating the logistic,
/// and the bias row/column start at zero.
///
/// # Mutability
///
/// Only [`Rbm::train`] writes the weight matrix. Inference operations
/// borrow the engine immutably; their randomness comes from the caller's
/// RNG handle, never from hidden state.
#[derive(Debug, Clone)]
pub struct Rbm {
    num_visible: usize,
    num_hidden: usize,
    learning_rate: f32,
    weights: Array2<f32>,
}

impl Rbm {
    /// Create a new engine with freshly initialized weights.
    ///
    /// # Errors
    ///
    /// `InvalidArchitecture` if either unit count is zero or the learning
    /// rate is not a positive finite number.
    pub fn new<R: Rng + ?Sized>(
        num_visible: usize,
        num_hidden: usize,
        learning_rate: f32,
        rng: &mut R,
    ) -> DbnResult<Self> {
        if num_visible == 0 || num_hidden == 0 {
            return Err(DbnError::InvalidArchitecture(format!(
                "unit counts must be non-zero (visible: {}, hidden: {})",
                num_visible, num_hidden
            )));
        }
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(DbnError::InvalidArchitecture(format!(
                "learning rate must be a positive finite number (got {})",
                learning_rate
            )));
        }

        let mut weights = Array2::zeros((num_visible + 1, num_hidden + 1));
        let interior = gaussian_random(num_visible, num_hidden, rng).mapv(|w| 0.1 * w);
        weights.slice_mut(s![1.., 1..]).assign(&interior);

        Ok(Self {
            num_visible,
            num_hidden,
            learning_rate,
            weights,
        })
    }

    /// Number of visible units, excluding the bias unit.
    pub fn num_visible(&self) -> usize {
        self.num_visible
    }

    /// Number of hidden units, excluding the bias unit.
    pub fn num_hidden(&self) -> usize {
        self.num_hidden
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// The full weight matrix, including the bias row and column.
    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    /// Train with CD-1 for exactly `max_epochs` epochs.
    ///
    /// `visible` holds one example per row, values in [0, 1] (binary
    /// states or activation probabilities). The observer receives one
    /// `(epoch, error)` notification per epoch, synchronously; the error
    /// is the mean squared difference between the data and its one-step
    /// reconstruction, further divided by the example count.
    ///
    /// Returns the final epoch's error (0.0 when `max_epochs` is 0). There
    /// is no convergence check and no gradient clamping: with a learning
    /// rate set too high the weights can grow without bound across epochs,
    /// even though each logistic activation stays in (0, 1).
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the row length differs from the visible unit
    /// count or the input has no rows; the weights are left untouched.
    pub fn train<R: Rng + ?Sized>(
        &mut self,
        visible: &Array2<f32>,
        max_epochs: usize,
        rng: &mut R,
        observer: &mut dyn EpochObserver,
    ) -> DbnResult<f32> {
        self.check_visible_shape(visible, "train")?;
        if visible.nrows() == 0 {
            return Err(DbnError::ShapeMismatch(
                "train: input must contain at least one example".to_string(),
            ));
        }

        let num_examples = visible.nrows() as f32;
        let data = insert_bias_column(visible);
        let mut error = 0.0;

        for epoch in 0..max_epochs {
            // Positive phase: clamp to the data and sample the hidden units.
            let pos_hidden_probs = self.hidden_probs(&data);
            let pos_hidden_states = bernoulli_sample(&pos_hidden_probs, rng);
            let pos_associations = data.t().dot(&pos_hidden_probs);

            // Negative phase: one Gibbs step back to the visible layer and
            // up again. The reconstructed hidden probabilities are used
            // as-is; only the visible bias column is re-fixed.
            let neg_visible_probs = self.visible_probs(&pos_hidden_states);
            let neg_hidden_probs = logistic_matrix(&neg_visible_probs.dot(&self.weights));
            let neg_associations = neg_visible_probs.t().dot(&neg_hidden_probs);

            let delta =
                (&pos_associations - &neg_associations) * (self.learning_rate / num_examples);
            self.weights += &delta;

            let diff = &data - &neg_visible_probs;
            error = diff.mapv(|v| v * v).mean().unwrap_or(0.0) / num_examples;
            observer.on_epoch_complete(epoch, error);
        }

        Ok(error)
    }

    /// Sample hidden unit states from visible data.
    ///
    /// This is a stochastic pass: each hidden unit is Bernoulli-sampled
    /// from its activation probability, so two calls on identical input
    /// yield different samples unless the RNG state matches. The bias
    /// column is stripped from the result.
    pub fn hidden_layer<R: Rng + ?Sized>(
        &self,
        visible: &Array2<f32>,
        rng: &mut R,
    ) -> DbnResult<Array2<f32>> {
        self.check_visible_shape(visible, "hidden_layer")?;
        let data = insert_bias_column(visible);
        let probs = self.hidden_probs(&data);
        let states = bernoulli_sample(&probs, rng);
        Ok(strip_bias_column(&states))
    }

    /// Sample visible unit states from hidden data. Symmetric to
    /// [`Rbm::hidden_layer`], using the transposed weight matrix.
    pub fn visible_layer<R: Rng + ?Sized>(
        &self,
        hidden: &Array2<f32>,
        rng: &mut R,
    ) -> DbnResult<Array2<f32>> {
        if hidden.ncols() != self.num_hidden {
            return Err(DbnError::ShapeMismatch(format!(
                "visible_layer: input has {} columns but the engine has {} hidden units",
                hidden.ncols(),
                self.num_hidden
            )));
        }
        let data = insert_bias_column(hidden);
        let probs = self.visible_probs(&data);
        let states = bernoulli_sample(&probs, rng);
        Ok(strip_bias_column(&states))
    }

    /// One up-down pass: sample hidden states, then reconstruct the
    /// visible layer from them.
    pub fn reconstruct<R: Rng + ?Sized>(
        &self,
        visible: &Array2<f32>,
        rng: &mut R,
    ) -> DbnResult<Array2<f32>> {
        let hidden = self.hidden_layer(visible, rng)?;
        self.visible_layer(&hidden, rng)
    }

    /// Generate samples by running a single alternating Gibbs chain.
    ///
    /// The chain starts from one random binary visible vector and is
    /// carried forward: each step samples the hidden units from the
    /// current visible row (hidden bias forced on), samples a new visible
    /// row from those hidden states, and writes it into the next chain
    /// slot. Successive samples are therefore autocorrelated — a property
    /// of Gibbs sampling, not a defect. Returns `number_of_samples` rows
    /// of visible states, bias column stripped.
    pub fn day_dream<R: Rng + ?Sized>(
        &self,
        number_of_samples: usize,
        rng: &mut R,
    ) -> DbnResult<Array2<f32>> {
        let mut chain = Array2::ones((number_of_samples, self.num_visible + 1));
        if number_of_samples == 0 {
            return Ok(strip_bias_column(&chain));
        }

        let seed = uniform_random_bool(1, self.num_visible, rng);
        chain.slice_mut(s![0..1, 1..]).assign(&seed);

        for i in 0..number_of_samples {
            let visible = chain.slice(s![i..i + 1, ..]).to_owned();

            let hidden_probs = logistic_matrix(&visible.dot(&self.weights));
            let mut hidden_states = bernoulli_sample(&hidden_probs, rng);
            hidden_states[[0, 0]] = 1.0;

            let visible_probs = logistic_matrix(&hidden_states.dot(&self.weights.t()));
            let visible_states = bernoulli_sample(&visible_probs, rng);
            if i + 1 < number_of_samples {
                chain.slice_mut(s![i + 1..i + 2, ..]).assign(&visible_states);
            }
        }

        Ok(strip_bias_column(&chain))
    }

    /// Hidden activation probabilities for bias-augmented input, with the
    /// bias unit's probability pinned to 1.
    fn hidden_probs(&self, data_with_bias: &Array2<f32>) -> Array2<f32> {
        let mut probs = logistic_matrix(&data_with_bias.dot(&self.weights));
        probs.column_mut(0).fill(1.0);
        probs
    }

    /// Visible activation probabilities for bias-augmented hidden input,
    /// with the bias unit's probability pinned to 1.
    fn visible_probs(&self, hidden_with_bias: &Array2<f32>) -> Array2<f32> {
        let mut probs = logistic_matrix(&hidden_with_bias.dot(&self.weights.t()));
        probs.column_mut(0).fill(1.0);
        probs
    }

    fn check_visible_shape(&self, data: &Array2<f32>, op: &str) -> DbnResult<()> {
        if data.ncols() != self.num_visible {
            return Err(DbnError::ShapeMismatch(format!(
                "{}: input has {} columns but the engine has {} visible units",
                op,
                data.ncols(),
                self.num_visible
            )));
        }
        Ok(())
    }
}
