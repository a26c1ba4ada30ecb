//! Weighted content + style loss

use crate::io::configuration::{
    DEFAULT_CONTENT_WEIGHT, DEFAULT_STYLE_LAYER_WEIGHT, DEFAULT_STYLE_WEIGHT,
};
use crate::io::error::{Result, TransferError, invalid_parameter};
use crate::loss::gram::gram_matrix;
use crate::loss::targets::ReferenceActivations;
use crate::network::backbone::TappedActivations;
use crate::network::taps::LayerTaps;
use tch::{Reduction, Tensor};

/// Relative importance of the loss terms
#[derive(Debug, Clone, PartialEq)]
pub struct LossWeights {
    /// Multiplier of the content term
    pub content: f64,
    /// Multiplier of the summed style term
    pub style: f64,
    /// Per style tap multiplier, same order as [`LayerTaps::style`]
    pub style_layers: Vec<f64>,
}

impl LossWeights {
    /// Default weights sized for `taps`
    pub fn for_taps(taps: &LayerTaps) -> Self {
        Self {
            content: DEFAULT_CONTENT_WEIGHT,
            style: DEFAULT_STYLE_WEIGHT,
            style_layers: vec![DEFAULT_STYLE_LAYER_WEIGHT; taps.style().len()],
        }
    }

    /// Check the weights can be used with `taps`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any weight is negative or not finite
    /// - The number of layer weights differs from the number of style taps
    pub fn validate(&self, taps: &LayerTaps) -> Result<()> {
        check_weight("content_weight", self.content)?;
        check_weight("style_weight", self.style)?;
        for &weight in &self.style_layers {
            check_weight("style_layer_weight", weight)?;
        }
        if self.style_layers.len() != taps.style().len() {
            return Err(invalid_parameter(
                "style_layer_weights",
                &self.style_layers.len(),
                &format!("expected one weight per style layer ({})", taps.style().len()),
            ));
        }
        Ok(())
    }
}

fn check_weight(parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid_parameter(
            parameter,
            &value,
            &"must be finite and non-negative",
        ))
    }
}

/// Loss of one step, split into its parts
#[derive(Debug)]
pub struct LossTerms {
    /// Weighted sum, the value being minimised
    pub total: Tensor,
    /// Unweighted content MSE
    pub content: Tensor,
    /// Layer-weighted style MSE before the style multiplier
    pub style: Tensor,
}

impl LossTerms {
    /// Scalar values as `(total, content, style)`
    pub fn values(&self) -> (f64, f64, f64) {
        (
            self.total.double_value(&[]),
            self.content.double_value(&[]),
            self.style.double_value(&[]),
        )
    }
}

/// Differentiable loss against fixed reference activations
#[derive(Debug)]
pub struct StyleObjective {
    targets: ReferenceActivations,
    weights: LossWeights,
}

impl StyleObjective {
    /// Pair targets with their weighting
    ///
    /// # Errors
    ///
    /// Returns an error if the number of layer weights differs from the number
    /// of style targets
    pub fn new(targets: ReferenceActivations, weights: LossWeights) -> Result<Self> {
        let expected = targets.style_grams().len();
        if weights.style_layers.len() != expected {
            return Err(invalid_parameter(
                "style_layer_weights",
                &weights.style_layers.len(),
                &format!("expected one weight per style target ({expected})"),
            ));
        }
        Ok(Self { targets, weights })
    }

    /// Loss of the current dream activations
    ///
    /// # Errors
    ///
    /// Returns an error if the activations do not line up with the targets
    pub fn loss(&self, activations: &TappedActivations) -> Result<LossTerms> {
        let grams = self.targets.style_grams();
        if activations.style.len() != grams.len() {
            return Err(TransferError::ShapeMismatch {
                what: "style activations",
                expected: vec![grams.len() as i64],
                actual: vec![activations.style.len() as i64],
            });
        }

        let content = activations
            .content
            .mse_loss(self.targets.content(), Reduction::Mean);

        let style_terms = activations
            .style
            .iter()
            .zip(grams)
            .zip(&self.weights.style_layers)
            .map(|((features, target), &weight)| {
                gram_matrix(features).map(|g| g.mse_loss(target, Reduction::Mean) * weight)
            })
            .collect::<Result<Vec<_>>>()?;
        let style = style_terms
            .into_iter()
            .reduce(|acc, term| acc + term)
            .ok_or_else(|| TransferError::ShapeMismatch {
                what: "style activations",
                expected: vec![1],
                actual: vec![0],
            })?;

        let total = &content * self.weights.content + &style * self.weights.style;
        Ok(LossTerms {
            total,
            content,
            style,
        })
    }
}
