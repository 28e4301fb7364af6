//! Neural network inference on the CPU, via `tract-onnx`.

pub mod tensor;

use std::{
    ops::{Index, RangeInclusive},
    path::Path,
    sync::Arc,
};

use anyhow::{bail, Context};
use tract_onnx::prelude::{
    Framework, Graph, InferenceModelExt, SimplePlan, TValue, TVec, TypedFact, TypedOp,
};

use crate::{
    image::{AsImageView, Color, ImageView},
    resolution::Resolution,
};
use tensor::Tensor;

type Model = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A convolutional neural network that takes a single image as its input.
///
/// Cloning is cheap and shares the loaded model.
#[derive(Clone)]
pub struct Cnn {
    nn: NeuralNetwork,
    input_res: Resolution,
    image_map: Arc<dyn Fn(ImageView<'_>) -> Tensor + Send + Sync>,
}

impl Cnn {
    /// Wraps `nn`, which must have exactly one input of the given [`CnnInputShape`].
    pub fn new(
        nn: NeuralNetwork,
        shape: CnnInputShape,
        color_mapper: ColorMapper,
    ) -> anyhow::Result<Self> {
        let input_res = Self::input_res(&nn, shape)?;
        let (w, h) = (input_res.width() as usize, input_res.height() as usize);

        // Samples the view at the center of input pixel (x, y).
        fn sample(view: &ImageView<'_>, x: usize, y: usize, w: usize, h: usize) -> Color {
            let u = (x as f32 + 0.5) / w as f32 * view.width();
            let v = (y as f32 + 0.5) / h as f32 * view.height();
            view.sample(u, v)
        }

        let image_map: Arc<dyn Fn(ImageView<'_>) -> Tensor + Send + Sync> = match shape {
            CnnInputShape::NCHW => Arc::new(move |view| {
                Tensor::from_array_shape_fn([1, 3, h, w], |[_, c, y, x]| {
                    color_mapper.map(sample(&view, x, y, w, h))[c]
                })
            }),
            CnnInputShape::NHWC => Arc::new(move |view| {
                Tensor::from_array_shape_fn([1, h, w, 3], |[_, y, x, c]| {
                    color_mapper.map(sample(&view, x, y, w, h))[c]
                })
            }),
        };

        Ok(Self {
            nn,
            input_res,
            image_map,
        })
    }

    fn input_res(nn: &NeuralNetwork, shape: CnnInputShape) -> anyhow::Result<Resolution> {
        if nn.num_inputs() != 1 {
            bail!("CNN must take exactly 1 input, this one takes {}", nn.num_inputs());
        }
        let (w, h) = match (shape, nn.input_shape(0)?.as_slice()) {
            (CnnInputShape::NCHW, &[1, 3, h, w]) | (CnnInputShape::NHWC, &[1, h, w, 3]) => (w, h),
            (_, other) => bail!("invalid input shape {other:?} for {shape:?} CNN"),
        };
        Ok(Resolution::new(w.try_into()?, h.try_into()?))
    }

    /// The size images are sampled to.
    #[inline]
    pub fn input_resolution(&self) -> Resolution {
        self.input_res
    }

    /// Samples `image` into the input tensor and runs the network.
    ///
    /// If the aspect ratio of `image` differs from the network's, the image is stretched.
    pub fn estimate<V: AsImageView>(&self, image: &V) -> anyhow::Result<Outputs> {
        let tensor = (self.image_map)(image.as_view());
        self.nn.estimate([tensor])
    }
}

/// Maps 8-bit sRGB colors to network input values.
#[derive(Debug, Clone)]
pub struct ColorMapper {
    start: f32,
    end: f32,
}

impl ColorMapper {
    /// Maps channel values `0..=255` uniformly onto `target_range`.
    pub fn linear(target_range: RangeInclusive<f32>) -> Self {
        let (start, end) = target_range.into_inner();
        assert!(end > start, "empty color range {start}..={end}");
        Self { start, end }
    }

    fn map(&self, color: Color) -> [f32; 3] {
        let scale = (self.end - self.start) / 255.0;
        [color.r(), color.g(), color.b()].map(|c| f32::from(c) * scale + self.start)
    }
}

/// Memory layout of a CNN's image input.
///
/// `N` is the batch size (1), `C` the 3 color channels, `H` and `W` the input height and width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CnnInputShape {
    NCHW,
    NHWC,
}

/// Loads and optimizes a network. Created by [`NeuralNetwork::from_path`].
pub struct Loader {
    data: Vec<u8>,
    outputs: Option<Vec<usize>>,
}

impl Loader {
    /// Keeps only the given output tensors, by index, and skips computing the rest.
    pub fn with_output_selection<O: Into<Vec<usize>>>(mut self, outputs: O) -> Self {
        self.outputs = Some(outputs.into());
        self
    }

    pub fn load(self) -> anyhow::Result<NeuralNetwork> {
        let graph = tract_onnx::onnx()
            .model_for_read(&mut &*self.data)?
            .into_optimized()?;
        let all = graph.output_outlets()?;
        let selected = match &self.outputs {
            Some(indices) => indices
                .iter()
                .map(|&i| {
                    all.get(i)
                        .copied()
                        .with_context(|| format!("network has no output #{i}"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?,
            None => all.to_vec(),
        };
        let plan = SimplePlan::new_for_outputs(graph, &selected)?;
        Ok(NeuralNetwork(Arc::new(plan)))
    }
}

/// A loaded ONNX network. Cloning is cheap.
#[derive(Clone)]
pub struct NeuralNetwork(Arc<Model>);

impl NeuralNetwork {
    /// Reads an `.onnx` file. Call [`Loader::load`] on the result to build the network.
    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Loader> {
        let path = path.as_ref();
        if path.extension().map_or(true, |ext| ext != "onnx") {
            bail!(
                "network file '{}' must have the `.onnx` extension",
                path.display()
            );
        }
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read network file '{}'", path.display()))?;
        Ok(Loader {
            data,
            outputs: None,
        })
    }

    pub fn num_inputs(&self) -> usize {
        self.0.model().inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.0.model().outputs.len()
    }

    /// Returns the concrete shape of input `index`.
    pub fn input_shape(&self, index: usize) -> anyhow::Result<TVec<usize>> {
        let fact = self.0.model().input_fact(index)?;
        match fact.shape.as_concrete() {
            Some(shape) => Ok(shape.into()),
            None => bail!("network input #{index} has symbolic shape {:?}", fact.shape),
        }
    }

    /// Runs inference, with one tensor per network input.
    pub fn estimate<I: IntoIterator<Item = Tensor>>(&self, inputs: I) -> anyhow::Result<Outputs> {
        let inputs = inputs
            .into_iter()
            .map(|t| Ok(TValue::from_const(Arc::new(t.to_tract()?))))
            .collect::<anyhow::Result<TVec<_>>>()?;
        let outputs = self.0.run(inputs)?;
        let inner = outputs
            .iter()
            .map(|value| Tensor::from_tract(value))
            .collect::<anyhow::Result<_>>()?;
        Ok(Outputs { inner })
    }
}

/// Output tensors of an inference pass, in network output order.
#[derive(Debug)]
pub struct Outputs {
    inner: TVec<Tensor>,
}

impl Outputs {
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tensor> {
        self.inner.iter()
    }

    /// Returns output `index`, failing if it is missing or doesn't have shape `shape`.
    pub fn checked(&self, index: usize, shape: &[usize]) -> anyhow::Result<&Tensor> {
        let Some(tensor) = self.inner.get(index) else {
            bail!("network produced {} outputs, expected output #{index}", self.len());
        };
        if tensor.shape() != shape {
            bail!(
                "network output #{index} has shape {:?}, expected {shape:?}",
                tensor.shape()
            );
        }
        Ok(tensor)
    }
}

impl FromIterator<Tensor> for Outputs {
    fn from_iter<T: IntoIterator<Item = Tensor>>(iter: T) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for Outputs {
    type Output = Tensor;

    fn index(&self, index: usize) -> &Tensor {
        &self.inner[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_mapper_ranges() {
        let unit = ColorMapper::linear(0.0..=1.0);
        assert_eq!(unit.map(Color::BLACK), [0.0; 3]);
        assert_eq!(unit.map(Color::WHITE), [1.0; 3]);

        let signed = ColorMapper::linear(-1.0..=1.0);
        assert_eq!(signed.map(Color::RED), [1.0, -1.0, -1.0]);
    }

    #[test]
    fn checked_outputs() {
        let outputs: Outputs = [Tensor::from_iter(&[1, 2], [0.5, 1.5])].into_iter().collect();
        assert_eq!(outputs.checked(0, &[1, 2]).unwrap().index([0]).as_slice(), &[0.5, 1.5]);
        assert!(outputs.checked(0, &[2]).is_err());
        assert!(outputs.checked(1, &[1, 2]).is_err());
    }

    #[test]
    fn rejects_non_onnx_path() {
        let err = NeuralNetwork::from_path("model.tflite").err().unwrap();
        assert!(err.to_string().contains(".onnx"), "{err}");
    }

    #[test]
    fn missing_file_names_path() {
        let err = NeuralNetwork::from_path("/nonexistent/palm.onnx").err().unwrap();
        assert!(err.to_string().contains("/nonexistent/palm.onnx"), "{err}");
    }
}
