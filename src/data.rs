use burn::{
    data::{
        dataloader::batcher::Batcher,
        dataset::vision::{Annotation, ImageDatasetItem, PixelDepth},
    },
    prelude::*,
};
use image::{imageops::FilterType, RgbImage};

pub const CHANNELS: usize = 3;
/// Side of the square image the CIFAR-10 network is trained on.
pub const INPUT_SIZE: usize = 32;

/// Turns a rendered canvas into classifier input.
///
/// The output is a `[1, size, size, 3]` tensor (batch, height, width, channel) holding
/// the resized pixel values scaled into `[0, 1]`.
#[derive(Clone, Debug)]
pub struct SketchNormalizer {
    size: u32,
}

impl SketchNormalizer {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Downsamples the canvas with a Lanczos filter, which averages the covered area.
    pub fn resize(&self, bitmap: &RgbImage) -> RgbImage {
        image::imageops::resize(bitmap, self.size, self.size, FilterType::Lanczos3)
    }

    pub fn normalize<B: Backend>(&self, bitmap: &RgbImage, device: &B::Device) -> Tensor<B, 4> {
        let size = self.size as usize;
        let pixels = self.resize(bitmap).into_raw();
        let data = TensorData::new(pixels, Shape::new([1, size, size, CHANNELS]));

        Tensor::<B, 4>::from_data(data.convert::<B::FloatElem>(), device).div_scalar(255.0)
    }
}

/// Batches image-folder items into `[N, size, size, 3]` images in `[0, 1]` and class ids.
#[derive(Clone)]
pub struct CifarBatcher {
    size: usize,
}

#[derive(Clone, Debug)]
pub struct CifarBatch<B: Backend> {
    pub images: Tensor<B, 4>,
    pub targets: Tensor<B, 1, Int>,
}

impl CifarBatcher {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

fn pixel_as_u8(pixel: PixelDepth) -> u8 {
    match pixel {
        PixelDepth::U8(value) => value,
        PixelDepth::U16(value) => (value >> 8) as u8,
        PixelDepth::F32(value) => (value.clamp(0.0, 1.0) * 255.0).round() as u8,
    }
}

impl<B: Backend> Batcher<B, ImageDatasetItem, CifarBatch<B>> for CifarBatcher {
    fn batch(&self, items: Vec<ImageDatasetItem>, device: &B::Device) -> CifarBatch<B> {
        let targets = items
            .iter()
            .map(|item| match item.annotation {
                Annotation::Label(class) => Tensor::<B, 1, Int>::from_data(
                    TensorData::from([(class as i64).elem::<B::IntElem>()]),
                    device,
                ),
                _ => panic!("Image folder items must carry a single class label"),
            })
            .collect();

        let images = items
            .into_iter()
            .map(|item| item.image.into_iter().map(pixel_as_u8).collect::<Vec<u8>>())
            .map(|pixels| TensorData::new(pixels, Shape::new([self.size, self.size, CHANNELS])))
            .map(|data| Tensor::<B, 3>::from_data(data.convert::<B::FloatElem>(), device))
            .map(|tensor| tensor / 255)
            .collect();

        let images = Tensor::stack(images, 0);
        let targets = Tensor::cat(targets, 0);

        CifarBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::data::dataset::{vision::ImageFolderDataset, Dataset};
    use image::Rgb;

    type TestBackend = NdArray;

    fn values(tensor: Tensor<TestBackend, 4>) -> Vec<f32> {
        tensor.into_data().to_vec::<f32>().unwrap()
    }

    #[test]
    fn normalized_shape_and_range() {
        let device = Default::default();
        let normalizer = SketchNormalizer::new(32);

        let mut bitmap = RgbImage::from_pixel(448, 448, Rgb([255, 255, 255]));
        for x in 0..448 {
            bitmap.put_pixel(x, 200, Rgb([0, 0, 0]));
            bitmap.put_pixel(x, 201, Rgb([255, 0, 0]));
        }

        let tensor = normalizer.normalize::<TestBackend>(&bitmap, &device);
        assert_eq!(tensor.dims(), [1, 32, 32, 3]);
        assert!(values(tensor).iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn tiny_and_non_square_bitmaps_are_resized() {
        let device = Default::default();
        let normalizer = SketchNormalizer::new(INPUT_SIZE as u32);

        for (width, height) in [(1, 1), (7, 500), (31, 33)] {
            let mut bitmap = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
            bitmap.put_pixel(0, 0, Rgb([0, 0, 255]));

            let tensor = normalizer.normalize::<TestBackend>(&bitmap, &device);
            assert_eq!(tensor.dims(), [1, INPUT_SIZE, INPUT_SIZE, CHANNELS]);
            assert!(values(tensor).iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn blank_canvas_normalizes_to_ones() {
        let device = Default::default();
        let bitmap = RgbImage::from_pixel(448, 448, Rgb([255, 255, 255]));

        let tensor = SketchNormalizer::new(32).normalize::<TestBackend>(&bitmap, &device);
        assert!(values(tensor).iter().all(|v| (*v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn channel_is_the_last_axis() {
        let device = Default::default();
        let bitmap = RgbImage::from_pixel(64, 64, Rgb([255, 0, 0]));

        let values = values(SketchNormalizer::new(32).normalize::<TestBackend>(&bitmap, &device));
        assert!((values[0] - 1.0).abs() < 1e-6);
        assert!(values[1].abs() < 1e-6);
        assert!(values[2].abs() < 1e-6);
    }

    #[test]
    fn normalize_is_deterministic() {
        let device = Default::default();
        let mut bitmap = RgbImage::from_pixel(448, 448, Rgb([255, 255, 255]));
        for i in 0..448 {
            bitmap.put_pixel(i, i, Rgb([128, 0, 128]));
        }
        let normalizer = SketchNormalizer::new(32);

        assert_eq!(
            values(normalizer.normalize::<TestBackend>(&bitmap, &device)),
            values(normalizer.normalize::<TestBackend>(&bitmap, &device))
        );
    }

    #[test]
    fn batcher_stacks_image_folder_items() {
        let device = Default::default();
        let root = tempfile::tempdir().unwrap();
        for (class, value) in [("bird", 255u8), ("cat", 0u8)] {
            let dir = root.path().join(class);
            std::fs::create_dir_all(&dir).unwrap();
            RgbImage::from_pixel(2, 2, Rgb([value, value, value]))
                .save(dir.join("sample.png"))
                .unwrap();
        }

        let dataset = ImageFolderDataset::new_classification(root.path()).unwrap();
        let items: Vec<ImageDatasetItem> = dataset.iter().collect();
        let batch: CifarBatch<TestBackend> = CifarBatcher::new(2).batch(items, &device);

        assert_eq!(batch.images.dims(), [2, 2, 2, 3]);
        let targets = batch.targets.into_data().to_vec::<i64>().unwrap();
        let images = batch.images.into_data().to_vec::<f32>().unwrap();
        for (index, target) in targets.iter().enumerate() {
            let expected = if *target == 0 { 1.0 } else { 0.0 };
            let image = &images[index * 12..(index + 1) * 12];
            assert!(image.iter().all(|v| (*v - expected).abs() < 1e-6));
        }
        let mut sorted = targets.clone();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1]);
    }

    #[test]
    fn wide_pixels_are_narrowed() {
        assert_eq!(pixel_as_u8(PixelDepth::U8(17)), 17);
        assert_eq!(pixel_as_u8(PixelDepth::U16(u16::MAX)), 255);
        assert_eq!(pixel_as_u8(PixelDepth::F32(1.0)), 255);
        assert_eq!(pixel_as_u8(PixelDepth::F32(-3.0)), 0);
    }
}
