use crate::foundation::core::Extent;
use crate::foundation::error::{FramepopError, FramepopResult};

/// Element type a model declares for one of its tensors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    U8,
    F32,
}

/// Memory order of a rank-4 image tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TensorLayout {
    /// `[batch, height, width, channels]`
    Nhwc,
    /// `[batch, channels, height, width]`
    Nchw,
}

/// How 8-bit pixel samples are scaled when packed into a float tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Normalization {
    /// `0..=255` passed through unchanged.
    Raw,
    /// `v / 255`, i.e. `[0, 1]`.
    Unit,
}

/// Declared input or output of a loaded model. `None` dims are dynamic.
#[derive(Clone, Debug, PartialEq)]
pub struct TensorSpec {
    pub name: String,
    pub dims: Vec<Option<usize>>,
    pub dtype: ElementType,
}

impl TensorSpec {
    pub fn new(name: impl Into<String>, dims: Vec<Option<usize>>, dtype: ElementType) -> Self {
        Self {
            name: name.into(),
            dims,
            dtype,
        }
    }

    /// Spec with every dimension known.
    pub fn fixed(name: impl Into<String>, dims: &[usize], dtype: ElementType) -> Self {
        Self::new(name, dims.iter().copied().map(Some).collect(), dtype)
    }

    /// Channels-last wins when both the second and the last dimension look like channel counts.
    pub fn layout(&self) -> FramepopResult<TensorLayout> {
        let [_, a, _, c] = self.dims.as_slice() else {
            return Err(FramepopError::shape_mismatch(format!(
                "{}: expected a rank-4 image tensor, got rank {}",
                self.name,
                self.dims.len()
            )));
        };
        let is_channels = |d: &Option<usize>| matches!(d, Some(1..=4));
        if is_channels(c) {
            Ok(TensorLayout::Nhwc)
        } else if is_channels(a) {
            Ok(TensorLayout::Nchw)
        } else {
            Err(FramepopError::shape_mismatch(format!(
                "{}: cannot find a channel dimension in {:?}",
                self.name, self.dims
            )))
        }
    }

    /// Declared channel count, if fixed.
    pub fn channels(&self) -> FramepopResult<Option<usize>> {
        Ok(match self.layout()? {
            TensorLayout::Nhwc => self.dims[3],
            TensorLayout::Nchw => self.dims[1],
        })
    }

    /// Declared spatial size; dynamic dimensions take the matching `fallback` dimension.
    pub fn spatial(&self, fallback: Extent) -> FramepopResult<Extent> {
        let (h, w) = match self.layout()? {
            TensorLayout::Nhwc => (self.dims[1], self.dims[2]),
            TensorLayout::Nchw => (self.dims[2], self.dims[3]),
        };
        let dim = |d: Option<usize>, fb: u32| -> FramepopResult<u32> {
            match d {
                None => Ok(fb),
                Some(0) => Err(FramepopError::shape_mismatch(format!(
                    "{}: zero spatial dimension",
                    self.name
                ))),
                Some(v) => u32::try_from(v).map_err(|_| {
                    FramepopError::shape_mismatch(format!("{}: dimension {v} too large", self.name))
                }),
            }
        };
        Ok(Extent::new(dim(w, fallback.width)?, dim(h, fallback.height)?))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TensorData {
    U8(Vec<u8>),
    F32(Vec<f32>),
}

impl TensorData {
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> ElementType {
        match self {
            Self::U8(_) => ElementType::U8,
            Self::F32(_) => ElementType::F32,
        }
    }

    /// Element `i` scaled to coverage: floats as-is, bytes divided by 255.
    fn coverage(&self, i: usize) -> f32 {
        match self {
            Self::U8(v) => f32::from(v[i]) / 255.0,
            Self::F32(v) => v[i],
        }
    }
}

/// Dense tensor exchanged with an inference runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: TensorData,
}

/// One channel of a model output, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Plane {
    pub extent: Extent,
    pub values: Vec<f32>,
}

impl Tensor {
    pub fn new(shape: Vec<usize>, data: TensorData) -> FramepopResult<Self> {
        let expected = shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d));
        if expected != Some(data.len()) {
            return Err(FramepopError::shape_mismatch(format!(
                "tensor shape {shape:?} does not match {} elements",
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &TensorData {
        &self.data
    }

    /// Smallest and largest element, NaNs ignored; `(0, 0)` when there are none.
    pub fn activation_range(&self) -> (f32, f32) {
        let values: Box<dyn Iterator<Item = f32>> = match &self.data {
            TensorData::U8(v) => Box::new(v.iter().map(|&b| f32::from(b))),
            TensorData::F32(v) => Box::new(v.iter().copied().filter(|v| !v.is_nan())),
        };
        values
            .fold(None, |acc: Option<(f32, f32)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .unwrap_or((0.0, 0.0))
    }

    /// Extract one coverage channel from an image-shaped output.
    ///
    /// Accepts `[h, w]`, rank-3 and batch-1 rank-4 tensors in either channel order. A
    /// single-channel output is returned as-is. With `two_class`, a 2-channel output yields
    /// channel 1 (foreground) and channel 0 is dropped. Any other channel count is rejected.
    pub fn coverage_plane(&self, two_class: bool) -> FramepopResult<Plane> {
        let (channels, h, w, layout) = match self.shape.as_slice() {
            &[h, w] => (1, h, w, TensorLayout::Nhwc),
            &[a, b, c] => split_channels(a, b, c)?,
            &[1, a, b, c] => split_channels(a, b, c)?,
            other => {
                return Err(FramepopError::shape_mismatch(format!(
                    "unsupported output shape {other:?}"
                )));
            }
        };

        let channel = match channels {
            1 => 0,
            2 if two_class => 1,
            n => {
                return Err(FramepopError::shape_mismatch(format!(
                    "output {:?} has {n} channels; expected 1{}",
                    self.shape,
                    if two_class { " or 2" } else { "" }
                )));
            }
        };

        let n = h * w;
        let values = (0..n)
            .map(|i| {
                let idx = match layout {
                    TensorLayout::Nhwc => i * channels + channel,
                    TensorLayout::Nchw => channel * n + i,
                };
                self.data.coverage(idx)
            })
            .collect();

        let to_u32 = |v: usize| {
            u32::try_from(v)
                .map_err(|_| FramepopError::shape_mismatch(format!("dimension {v} too large")))
        };
        Ok(Plane {
            extent: Extent::new(to_u32(w)?, to_u32(h)?),
            values,
        })
    }
}

/// Interpret `[a, b, c]` as either `[C, H, W]` or `[H, W, C]` for small channel counts.
fn split_channels(
    a: usize,
    b: usize,
    c: usize,
) -> FramepopResult<(usize, usize, usize, TensorLayout)> {
    let small = |d: usize| (1..=2).contains(&d);
    if small(c) && !small(a) {
        Ok((c, a, b, TensorLayout::Nhwc))
    } else if small(a) {
        Ok((a, b, c, TensorLayout::Nchw))
    } else if small(c) {
        Ok((c, a, b, TensorLayout::Nhwc))
    } else {
        Err(FramepopError::shape_mismatch(format!(
            "no 1- or 2-channel dimension in [{a}, {b}, {c}]"
        )))
    }
}

/// Pack equally-sized 8-bit planes into a batch-1 image tensor.
///
/// The planes become the channels in order. `norm` only applies to float tensors; byte
/// tensors always receive the raw samples.
pub fn pack_planes(
    planes: &[&[u8]],
    extent: Extent,
    layout: TensorLayout,
    dtype: ElementType,
    norm: Normalization,
) -> FramepopResult<Tensor> {
    let n = (extent.width as usize) * (extent.height as usize);
    if planes.is_empty() || planes.iter().any(|p| p.len() != n) {
        return Err(FramepopError::shape_mismatch(format!(
            "expected {} non-empty planes of {n} samples",
            planes.len()
        )));
    }
    let (c, h, w) = (planes.len(), extent.height as usize, extent.width as usize);
    let shape = match layout {
        TensorLayout::Nhwc => vec![1, h, w, c],
        TensorLayout::Nchw => vec![1, c, h, w],
    };

    let mut ordered = Vec::with_capacity(n * c);
    match layout {
        TensorLayout::Nhwc => {
            for i in 0..n {
                ordered.extend(planes.iter().map(|p| p[i]));
            }
        }
        TensorLayout::Nchw => {
            for p in planes {
                ordered.extend_from_slice(p);
            }
        }
    }

    let data = match (dtype, norm) {
        (ElementType::U8, _) => TensorData::U8(ordered),
        (ElementType::F32, Normalization::Raw) => {
            TensorData::F32(ordered.into_iter().map(f32::from).collect())
        }
        (ElementType::F32, Normalization::Unit) => {
            TensorData::F32(ordered.into_iter().map(|v| f32::from(v) / 255.0).collect())
        }
    };
    Tensor::new(shape, data)
}

#[cfg(test)]
#[path = "../../tests/unit/mask/tensor.rs"]
mod tests;
