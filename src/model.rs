use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Linear, LinearConfig, Relu,
    },
    prelude::*,
};

use crate::error::SketchError;

#[derive(Config, Debug)]
pub struct CifarCnnConfig {
    #[config(default = 10)]
    pub num_classes: usize,
    #[config(default = 32)]
    pub input_size: usize,
    #[config(default = 128)]
    pub channels: usize,
    #[config(default = 64)]
    pub hidden_size: usize,
}

/// Three 3x3 convolutions, two 2x2 max-pools and a two-layer classifier head.
///
/// Takes channels-last images `[batch, height, width, 3]` and returns logits
/// `[batch, num_classes]`.
#[derive(Module, Debug)]
pub struct CifarCnn<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    conv3: Conv2d<B>,
    pool: MaxPool2d,
    hidden: Linear<B>,
    output: Linear<B>,
    activation: Relu,
}

impl CifarCnnConfig {
    /// Side of the feature map left after the convolution stack, or `None` when the
    /// input is too small to survive it.
    pub fn feature_size(&self) -> Option<usize> {
        let after_conv1 = self.input_size.checked_sub(2)? / 2;
        let after_conv2 = after_conv1.checked_sub(2)? / 2;
        after_conv2.checked_sub(2).filter(|size| *size > 0)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> crate::error::Result<CifarCnn<B>> {
        let feature_size = self
            .feature_size()
            .ok_or(SketchError::ModelInputSize(self.input_size))?;
        let features = self.channels * feature_size * feature_size;

        Ok(CifarCnn {
            conv1: Conv2dConfig::new([3, self.channels], [3, 3]).init(device),
            conv2: Conv2dConfig::new([self.channels, self.channels], [3, 3]).init(device),
            conv3: Conv2dConfig::new([self.channels, self.channels], [3, 3]).init(device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            hidden: LinearConfig::new(features, self.hidden_size).init(device),
            output: LinearConfig::new(self.hidden_size, self.num_classes).init(device),
            activation: Relu::new(),
        })
    }
}

impl<B: Backend> CifarCnn<B> {
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        // [batch, height, width, channel] -> [batch, channel, height, width]
        let x = images.permute([0, 3, 1, 2]);

        let x = self.activation.forward(self.conv1.forward(x));
        let x = self.pool.forward(x);
        let x = self.activation.forward(self.conv2.forward(x));
        let x = self.pool.forward(x);
        let x = self.activation.forward(self.conv3.forward(x));

        let x: Tensor<B, 2> = x.flatten(1, 3);
        let x = self.activation.forward(self.hidden.forward(x));

        self.output.forward(x)
    }

    /// Class probabilities for a batch of images.
    pub fn probabilities(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        burn::tensor::activation::softmax(self.forward(images), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::NUM_CLASSES;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn feature_map_matches_keras_layout() {
        assert_eq!(CifarCnnConfig::new().feature_size(), Some(4));
        assert_eq!(CifarCnnConfig::new().with_input_size(18).feature_size(), Some(1));
    }

    #[test]
    fn too_small_input_is_rejected() {
        let device = Default::default();
        for input_size in [0, 1, 8, 12, 16] {
            let config = CifarCnnConfig::new().with_input_size(input_size);
            assert_eq!(config.feature_size(), None);
            assert!(matches!(
                config.init::<TestBackend>(&device),
                Err(SketchError::ModelInputSize(size)) if size == input_size
            ));
        }
    }

    #[test]
    fn forward_produces_one_logit_per_class() {
        let device = Default::default();
        let model = CifarCnnConfig::new()
            .with_channels(8)
            .with_hidden_size(16)
            .init::<TestBackend>(&device)
            .unwrap();

        let images = Tensor::<TestBackend, 4>::ones([2, 32, 32, 3], &device);
        assert_eq!(model.forward(images).dims(), [2, NUM_CLASSES]);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let device = Default::default();
        let model = CifarCnnConfig::new()
            .with_channels(4)
            .with_hidden_size(8)
            .init::<TestBackend>(&device)
            .unwrap();

        let images = Tensor::<TestBackend, 4>::zeros([1, 32, 32, 3], &device);
        let probabilities = model
            .probabilities(images)
            .into_data()
            .to_vec::<f32>()
            .unwrap();

        assert_eq!(probabilities.len(), NUM_CLASSES);
        assert!(probabilities.iter().all(|p| *p >= 0.0));
        assert!((probabilities.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    }
}
