use super::*;

#[test]
fn layout_is_detected_from_declared_dims() {
    let nhwc = TensorSpec::fixed("img", &[1, 320, 320, 3], ElementType::F32);
    assert_eq!(nhwc.layout().unwrap(), TensorLayout::Nhwc);
    assert_eq!(nhwc.channels().unwrap(), Some(3));

    let nchw = TensorSpec::fixed("img", &[1, 3, 256, 192], ElementType::U8);
    assert_eq!(nchw.layout().unwrap(), TensorLayout::Nchw);
    assert_eq!(
        nchw.spatial(Extent::new(1, 1)).unwrap(),
        Extent::new(192, 256)
    );

    let dynamic = TensorSpec::new("img", vec![None, None, None, Some(4)], ElementType::F32);
    assert_eq!(
        dynamic.spatial(Extent::new(640, 480)).unwrap(),
        Extent::new(640, 480)
    );

    let flat = TensorSpec::fixed("vec", &[1, 1000], ElementType::F32);
    assert!(matches!(
        flat.layout(),
        Err(FramepopError::InferenceShapeMismatch(_))
    ));
    let wide = TensorSpec::fixed("img", &[1, 64, 64, 64], ElementType::F32);
    assert!(wide.layout().is_err());
}

#[test]
fn pack_interleaves_or_stacks_planes() {
    let r = [10u8, 20];
    let g = [30u8, 40];
    let b = [50u8, 255];
    let e = Extent::new(2, 1);

    let t = pack_planes(&[&r, &g, &b], e, TensorLayout::Nhwc, ElementType::U8, Normalization::Unit)
        .unwrap();
    assert_eq!(t.shape(), &[1, 1, 2, 3]);
    assert_eq!(t.data(), &TensorData::U8(vec![10, 30, 50, 20, 40, 255]));

    let t = pack_planes(&[&r, &g, &b], e, TensorLayout::Nchw, ElementType::F32, Normalization::Raw)
        .unwrap();
    assert_eq!(t.shape(), &[1, 3, 1, 2]);
    assert_eq!(
        t.data(),
        &TensorData::F32(vec![10.0, 20.0, 30.0, 40.0, 50.0, 255.0])
    );

    let t = pack_planes(&[&b], e, TensorLayout::Nhwc, ElementType::F32, Normalization::Unit)
        .unwrap();
    assert_eq!(t.data(), &TensorData::F32(vec![50.0 / 255.0, 1.0]));
}

#[test]
fn pack_rejects_ragged_planes() {
    let err = pack_planes(
        &[&[1u8, 2], &[3u8]],
        Extent::new(2, 1),
        TensorLayout::Nhwc,
        ElementType::F32,
        Normalization::Unit,
    )
    .unwrap_err();
    assert!(matches!(err, FramepopError::InferenceShapeMismatch(_)));
}

#[test]
fn tensor_new_validates_element_count() {
    assert!(Tensor::new(vec![1, 2, 2, 1], TensorData::F32(vec![0.0; 4])).is_ok());
    assert!(Tensor::new(vec![1, 2, 2, 1], TensorData::F32(vec![0.0; 3])).is_err());
}

#[test]
fn single_channel_outputs_in_any_rank() {
    let values: Vec<f32> = (0..12).map(|i| i as f32 / 11.0).collect();
    for shape in [vec![3, 4], vec![1, 3, 4], vec![1, 3, 4, 1], vec![1, 1, 3, 4]] {
        let plane = Tensor::new(shape.clone(), TensorData::F32(values.clone()))
            .unwrap()
            .coverage_plane(false)
            .unwrap();
        assert_eq!(plane.extent, Extent::new(4, 3), "shape {shape:?}");
        assert_eq!(plane.values, values);
    }

    let bytes = Tensor::new(vec![1, 1, 1, 2], TensorData::U8(vec![0, 255])).unwrap();
    assert_eq!(bytes.coverage_plane(false).unwrap().values, vec![0.0, 1.0]);
}

#[test]
fn two_channel_output_selects_channel_one() {
    // NCHW: background plane then foreground plane.
    let nchw = Tensor::new(
        vec![1, 2, 1, 3],
        TensorData::F32(vec![0.9, 0.8, 0.7, 0.1, 0.2, 0.3]),
    )
    .unwrap();
    assert_eq!(nchw.coverage_plane(true).unwrap().values, vec![0.1, 0.2, 0.3]);

    // NHWC: interleaved (bg, fg) pairs.
    let nhwc = Tensor::new(
        vec![1, 3, 1, 2],
        TensorData::F32(vec![0.9, 0.1, 0.8, 0.2, 0.7, 0.3]),
    )
    .unwrap();
    assert_eq!(nhwc.coverage_plane(true).unwrap().values, vec![0.1, 0.2, 0.3]);

    assert!(matches!(
        nhwc.coverage_plane(false),
        Err(FramepopError::InferenceShapeMismatch(_))
    ));
}

#[test]
fn unexpected_channel_counts_are_rejected() {
    let three = Tensor::new(vec![1, 4, 4, 3], TensorData::F32(vec![0.0; 48])).unwrap();
    assert!(matches!(
        three.coverage_plane(true),
        Err(FramepopError::InferenceShapeMismatch(_))
    ));

    let batched = Tensor::new(vec![2, 4, 4, 1], TensorData::F32(vec![0.0; 32])).unwrap();
    assert!(batched.coverage_plane(true).is_err());
}

#[test]
fn activation_range_ignores_nan() {
    let t = Tensor::new(vec![4], TensorData::F32(vec![0.5, f32::NAN, -1.0, 3.0])).unwrap();
    assert_eq!(t.activation_range(), (-1.0, 3.0));

    let empty = Tensor::new(vec![0], TensorData::U8(Vec::new())).unwrap();
    assert_eq!(empty.activation_range(), (0.0, 0.0));
}
