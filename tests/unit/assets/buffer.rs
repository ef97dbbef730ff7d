use super::*;

#[test]
fn empty_image_is_rejected() {
    assert!(ImageBuffer::new(RgbaImage::new(0, 4)).is_err());
    assert!(Matte::new(RgbaImage::new(4, 0)).is_err());
}

#[test]
fn coverage_encodings_write_expected_channels() {
    let extent = Extent::new(2, 1);
    let luma = Matte::from_coverage(extent, &[0.0, 1.0], MatteEncoding::Luma).unwrap();
    assert_eq!(luma.pixels().get_pixel(1, 0).0, [255, 255, 255, 255]);
    assert_eq!(luma.pixels().get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(luma.intensity(0, 0), 0);

    let alpha = Matte::from_coverage(extent, &[0.5, 2.0], MatteEncoding::Alpha).unwrap();
    assert_eq!(alpha.pixels().get_pixel(0, 0).0, [255, 255, 255, 128]);
    assert_eq!(alpha.alpha(1, 0), 255);
    assert_eq!(alpha.intensity(0, 0), 255);
}

#[test]
fn coverage_length_is_validated() {
    let err = Matte::from_coverage(Extent::new(3, 3), &[0.0; 4], MatteEncoding::Alpha).unwrap_err();
    assert!(matches!(err, FramepopError::InferenceShapeMismatch(_)));
}

#[test]
fn fingerprint_tracks_content_not_allocation() {
    let a = ImageBuffer::new(RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]))).unwrap();
    let b = ImageBuffer::new(RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]))).unwrap();
    let c = ImageBuffer::new(RgbaImage::from_pixel(2, 3, Rgba([1, 2, 3, 255]))).unwrap();
    assert!(!a.same_buffer(&b));
    assert!(a.same_buffer(&a.clone()));
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
}

#[test]
fn alpha_plane_copies_alpha_channel() {
    let m = Matte::filled(Extent::new(2, 2), 77);
    let plane = m.alpha_plane();
    assert!(plane.pixels().all(|p| p.0 == [77]));
}
