//! Fixed reference activations for the content and style images

use crate::io::error::Result;
use crate::io::image::ImageTensor;
use crate::loss::gram::gram_matrix;
use crate::network::backbone::Backbone;
use crate::network::taps::LayerTaps;

/// Detached targets the loss compares against
#[derive(Debug)]
pub struct ReferenceActivations {
    content: tch::Tensor,
    style_grams: Vec<tch::Tensor>,
}

impl ReferenceActivations {
    /// Run the frozen backbone once on each image and keep the tapped outputs
    ///
    /// Style targets are stored as Gram matrices since that is all the loss
    /// ever reads from them.
    ///
    /// # Errors
    ///
    /// Returns an error if the forward pass or a Gram matrix fails
    pub fn compute(
        backbone: &Backbone,
        taps: &LayerTaps,
        content: &ImageTensor,
        style: &ImageTensor,
    ) -> Result<Self> {
        let device = backbone.device();
        tch::no_grad(|| {
            let content_layers = backbone.forward_taps(&content.to_network_input(device), taps)?;
            let style_layers = backbone.forward_taps(&style.to_network_input(device), taps)?;

            let style_grams = style_layers
                .style
                .iter()
                .map(|features| gram_matrix(features).map(|g| g.detach()))
                .collect::<Result<Vec<_>>>()?;

            Ok(Self {
                content: content_layers.content.detach(),
                style_grams,
            })
        })
    }

    /// Content layer activation of the content image
    pub const fn content(&self) -> &tch::Tensor {
        &self.content
    }

    /// Gram matrices of the style image, one per style tap
    pub fn style_grams(&self) -> &[tch::Tensor] {
        &self.style_grams
    }
}
