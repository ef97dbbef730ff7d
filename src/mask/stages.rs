use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbaImage};

use crate::assets::buffer::{ImageBuffer, Matte, MatteEncoding};
use crate::foundation::core::Extent;
use crate::foundation::error::{FramepopError, FramepopResult};
use crate::mask::runtime::ModelSession;
use crate::mask::tensor::{Normalization, Tensor, TensorSpec, pack_planes};

/// Per-stage record for offline inspection.
#[derive(Clone, Debug)]
pub struct StageDiagnostics {
    pub name: &'static str,
    pub input_normalization: Normalization,
    pub output_shape: Vec<usize>,
    pub min_activation: f32,
    pub max_activation: f32,
    /// The stage's mask as produced (model resolution).
    pub preview: Matte,
}

#[derive(Clone, Debug)]
pub struct StageOutput {
    pub matte: Matte,
    pub diagnostics: StageDiagnostics,
}

pub(crate) const COARSE: &str = "coarse_segmentation";
pub(crate) const REFINE: &str = "foreground_refinement";
pub(crate) const MATTING: &str = "deep_matting";

/// Stage 1: raw `0..=255` RGB in, binary (0/255) mask out.
pub(crate) fn coarse_segmentation(
    session: &mut dyn ModelSession,
    image: &ImageBuffer,
    threshold: f32,
) -> FramepopResult<StageOutput> {
    let [spec] = session.inputs() else {
        return Err(FramepopError::shape_mismatch(format!(
            "{COARSE}: expected 1 input, model declares {}",
            session.inputs().len()
        )));
    };
    if let Some(c) = spec.channels()?
        && c != 3
    {
        return Err(FramepopError::shape_mismatch(format!(
            "{COARSE}: input '{}' has {c} channels, expected 3",
            spec.name
        )));
    }
    let extent = spec.spatial(image.extent())?;
    let [r, g, b] = rgb_planes(image.pixels(), extent);
    let input = pack_planes(
        &[&r, &g, &b],
        extent,
        spec.layout()?,
        spec.dtype,
        Normalization::Raw,
    )?;

    let output = run_single(session, COARSE, vec![input])?;
    let plane = output.coverage_plane(false)?;
    let binary: Vec<f32> = plane
        .values
        .iter()
        .map(|&p| if p > threshold { 1.0 } else { 0.0 })
        .collect();
    let matte = Matte::from_coverage(plane.extent, &binary, MatteEncoding::Luma)?;
    Ok(finish(COARSE, Normalization::Raw, &output, matte))
}

/// Stage 2: `[0, 1]` RGB plus the stage-1 mask in; 1- or 2-class foreground out.
pub(crate) fn foreground_refinement(
    session: &mut dyn ModelSession,
    image: &ImageBuffer,
    coarse: &Matte,
) -> FramepopResult<StageOutput> {
    let inputs = image_with_mask(session.inputs(), image, coarse, REFINE)?;
    let output = run_single(session, REFINE, inputs)?;
    let plane = output.coverage_plane(true)?;
    let matte = Matte::from_coverage(plane.extent, &plane.values, MatteEncoding::Luma)?;
    Ok(finish(REFINE, Normalization::Unit, &output, matte))
}

/// Stage 3: `[0, 1]` RGB plus the best prior mask in; float alpha out.
pub(crate) fn deep_matting(
    session: &mut dyn ModelSession,
    image: &ImageBuffer,
    prior: &Matte,
) -> FramepopResult<StageOutput> {
    let inputs = image_with_mask(session.inputs(), image, prior, MATTING)?;
    let output = run_single(session, MATTING, inputs)?;
    let plane = output.coverage_plane(false)?;
    let matte = Matte::from_coverage(plane.extent, &plane.values, MatteEncoding::Alpha)?;
    Ok(finish(MATTING, Normalization::Unit, &output, matte))
}

/// Pack image + mask for models that take either two inputs or one 4-channel input.
fn image_with_mask(
    specs: &[TensorSpec],
    image: &ImageBuffer,
    mask: &Matte,
    stage: &str,
) -> FramepopResult<Vec<Tensor>> {
    match specs {
        [combined] => {
            match combined.channels()? {
                Some(4) | None => {}
                Some(c) => {
                    return Err(FramepopError::shape_mismatch(format!(
                        "{stage}: single input '{}' has {c} channels, expected 4",
                        combined.name
                    )));
                }
            }
            let extent = combined.spatial(image.extent())?;
            let [r, g, b] = rgb_planes(image.pixels(), extent);
            let m = mask_plane(mask, extent);
            Ok(vec![pack_planes(
                &[&r, &g, &b, &m],
                extent,
                combined.layout()?,
                combined.dtype,
                Normalization::Unit,
            )?])
        }
        [first, second] => {
            // Declared channel counts decide which input is which; otherwise image comes first.
            let (img_spec, mask_spec, mask_first) = match (first.channels()?, second.channels()?) {
                (Some(1), Some(3)) => (second, first, true),
                (Some(3) | None, Some(1) | None) => (first, second, false),
                (a, b) => {
                    return Err(FramepopError::shape_mismatch(format!(
                        "{stage}: inputs declare {a:?}/{b:?} channels, expected 3 and 1"
                    )));
                }
            };
            let img_extent = img_spec.spatial(image.extent())?;
            let mask_extent = mask_spec.spatial(img_extent)?;
            let [r, g, b] = rgb_planes(image.pixels(), img_extent);
            let m = mask_plane(mask, mask_extent);

            let img = pack_planes(
                &[&r, &g, &b],
                img_extent,
                img_spec.layout()?,
                img_spec.dtype,
                Normalization::Unit,
            )?;
            let msk = pack_planes(
                &[&m],
                mask_extent,
                mask_spec.layout()?,
                mask_spec.dtype,
                Normalization::Unit,
            )?;
            Ok(if mask_first {
                vec![msk, img]
            } else {
                vec![img, msk]
            })
        }
        other => Err(FramepopError::shape_mismatch(format!(
            "{stage}: expected 1 or 2 inputs, model declares {}",
            other.len()
        ))),
    }
}

fn run_single(
    session: &mut dyn ModelSession,
    stage: &str,
    inputs: Vec<Tensor>,
) -> FramepopResult<Tensor> {
    session
        .run(inputs)?
        .into_iter()
        .next()
        .ok_or_else(|| FramepopError::inference(format!("{stage}: model produced no outputs")))
}

fn finish(
    name: &'static str,
    input_normalization: Normalization,
    output: &Tensor,
    matte: Matte,
) -> StageOutput {
    let (min_activation, max_activation) = output.activation_range();
    StageOutput {
        diagnostics: StageDiagnostics {
            name,
            input_normalization,
            output_shape: output.shape().to_vec(),
            min_activation,
            max_activation,
            preview: matte.clone(),
        },
        matte,
    }
}

/// R, G and B sample planes of `pixels` resampled to `extent`.
fn rgb_planes(pixels: &RgbaImage, extent: Extent) -> [Vec<u8>; 3] {
    let resized;
    let src = if pixels.dimensions() == (extent.width, extent.height) {
        pixels
    } else {
        resized = imageops::resize(pixels, extent.width, extent.height, FilterType::Triangle);
        &resized
    };
    let n = (extent.width as usize) * (extent.height as usize);
    let mut planes = [
        Vec::with_capacity(n),
        Vec::with_capacity(n),
        Vec::with_capacity(n),
    ];
    for px in src.as_raw().chunks_exact(4) {
        planes[0].push(px[0]);
        planes[1].push(px[1]);
        planes[2].push(px[2]);
    }
    planes
}

/// Mask intensity (brightest color channel) resampled to `extent`.
fn mask_plane(mask: &Matte, extent: Extent) -> Vec<u8> {
    let m = mask.extent();
    let gray = GrayImage::from_fn(m.width, m.height, |x, y| Luma([mask.intensity(x, y)]));
    if (m.width, m.height) == (extent.width, extent.height) {
        return gray.into_raw();
    }
    imageops::resize(&gray, extent.width, extent.height, FilterType::Triangle).into_raw()
}
