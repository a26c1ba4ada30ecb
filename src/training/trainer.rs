//! Fixed-length Adam optimisation of the dream image
//!
//! The optimizer is built over the dream layer's own variable store, so the
//! backbone weights never receive updates even though gradients flow through
//! them. There is no early stopping or divergence check: every run performs
//! exactly the configured number of steps.

use crate::io::configuration::{
    DEFAULT_ITERATIONS, DEFAULT_LEARNING_RATE, DEFAULT_LOG_EVERY, DEFAULT_MOMENTUM,
    DEFAULT_VARIANCE_DECAY,
};
use crate::io::error::{Result, invalid_parameter, tensor_error};
use crate::loss::objective::StyleObjective;
use crate::network::backbone::Backbone;
use crate::network::dream::DreamLayer;
use crate::network::taps::LayerTaps;
use std::time::{Duration, Instant};
use tch::nn::{self, OptimizerConfig};

/// Optimizer hyperparameters and logging cadence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainerConfig {
    /// Number of optimizer steps
    pub iterations: usize,
    /// Adam learning rate, in pixel units per step
    pub learning_rate: f64,
    /// Adam first moment decay
    pub beta1: f64,
    /// Adam second moment decay
    pub beta2: f64,
    /// Log the loss on steps divisible by this
    pub log_every: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            learning_rate: DEFAULT_LEARNING_RATE,
            beta1: DEFAULT_MOMENTUM,
            beta2: DEFAULT_VARIANCE_DECAY,
            log_every: DEFAULT_LOG_EVERY,
        }
    }
}

impl TrainerConfig {
    /// Check the hyperparameters are usable
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `iterations` or `log_every` is zero
    /// - `learning_rate` is not a positive finite number
    /// - A decay rate lies outside `[0, 1)`
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(invalid_parameter(
                "iterations",
                &self.iterations,
                &"must be at least 1",
            ));
        }
        if self.log_every == 0 {
            return Err(invalid_parameter(
                "log_every",
                &self.log_every,
                &"must be at least 1",
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(invalid_parameter(
                "learning_rate",
                &self.learning_rate,
                &"must be positive and finite",
            ));
        }
        for (name, beta) in [("beta1", self.beta1), ("beta2", self.beta2)] {
            if !(0.0..1.0).contains(&beta) {
                return Err(invalid_parameter(name, &beta, &"must lie in [0, 1)"));
            }
        }
        Ok(())
    }
}

/// Lifecycle of a [`Trainer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    /// Optimizer built, no step taken
    Initialized,
    /// Currently computing the given 0-indexed step
    Training {
        /// Step in progress
        step: usize,
    },
    /// All steps done
    Stopped,
}

/// Loss recorded on a logging step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossSample {
    /// 0-indexed step the loss was computed on, before that step's update
    pub step: usize,
    /// Weighted total loss
    pub total: f64,
    /// Unweighted content term
    pub content: f64,
    /// Style term before the style multiplier
    pub style: f64,
}

/// Outcome of a full training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Samples from the logging steps, in order
    pub logged: Vec<LossSample>,
    /// Loss of the last step
    pub final_loss: f64,
    /// Steps performed
    pub iterations: usize,
    /// Wall time spent training
    pub elapsed: Duration,
}

/// Receives training progress, e.g. to drive a progress bar
pub trait TrainingObserver {
    /// Called after each step with the number of completed steps
    fn on_step(&mut self, completed: usize, total: usize);

    /// Called when a loss sample is logged
    fn on_log(&mut self, _sample: &LossSample) {}
}

impl TrainingObserver for () {
    fn on_step(&mut self, _completed: usize, _total: usize) {}
}

/// Runs the optimisation loop for one dream image
pub struct Trainer {
    config: TrainerConfig,
    optimizer: nn::Optimizer,
    state: TrainerState,
}

impl std::fmt::Debug for Trainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trainer")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Trainer {
    /// Build an Adam optimizer over the dream variable only
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the optimizer
    /// cannot be created
    pub fn new(config: TrainerConfig, dream: &DreamLayer) -> Result<Self> {
        config.validate()?;
        let optimizer = nn::Adam::default()
            .beta1(config.beta1)
            .beta2(config.beta2)
            .build(dream.var_store(), config.learning_rate)
            .map_err(|source| tensor_error("build optimizer", source))?;

        Ok(Self {
            config,
            optimizer,
            state: TrainerState::Initialized,
        })
    }

    /// Current lifecycle state
    pub const fn state(&self) -> TrainerState {
        self.state
    }

    /// Perform every configured step
    ///
    /// # Errors
    ///
    /// Returns an error if the trainer has already run, or a forward pass or
    /// loss evaluation fails
    pub fn run(
        &mut self,
        backbone: &Backbone,
        taps: &LayerTaps,
        objective: &StyleObjective,
        dream: &DreamLayer,
        observer: &mut impl TrainingObserver,
    ) -> Result<TrainingReport> {
        if self.state != TrainerState::Initialized {
            return Err(invalid_parameter(
                "trainer_state",
                &format!("{:?}", self.state),
                &"a trainer runs exactly once",
            ));
        }

        let start = Instant::now();
        let total_steps = self.config.iterations;
        let mut logged = Vec::with_capacity(total_steps / self.config.log_every + 1);
        let mut final_loss = f64::NAN;

        for step in 0..total_steps {
            self.state = TrainerState::Training { step };

            let activations = backbone.forward_taps(dream.image(), taps)?;
            let terms = objective.loss(&activations)?;
            self.optimizer.backward_step(&terms.total);

            let is_last = step + 1 == total_steps;
            if step % self.config.log_every == 0 || is_last {
                let (total, content, style) = terms.values();
                if step % self.config.log_every == 0 {
                    tracing::info!(step, loss = total, content, style, "training loss");
                    let sample = LossSample {
                        step,
                        total,
                        content,
                        style,
                    };
                    observer.on_log(&sample);
                    logged.push(sample);
                }
                if is_last {
                    final_loss = total;
                }
            }

            observer.on_step(step + 1, total_steps);
        }

        self.state = TrainerState::Stopped;
        let elapsed = start.elapsed();
        tracing::debug!(?elapsed, final_loss, "training finished");

        Ok(TrainingReport {
            logged,
            final_loss,
            iterations: total_steps,
            elapsed,
        })
    }
}
