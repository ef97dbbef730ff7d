use super::*;

use std::io::Cursor;

fn encode_png(img: image::DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_keeps_straight_alpha() {
    let src = image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 100, 50, 128]));
    let img = decode_image(&encode_png(image::DynamicImage::ImageRgba8(src))).unwrap();
    assert_eq!(img.extent().width, 2);
    assert_eq!(img.pixels().get_pixel(0, 0).0, [200, 100, 50, 128]);
}

#[test]
fn grayscale_matte_moves_luma_into_alpha() {
    let gray = image::GrayImage::from_fn(2, 1, |x, _| image::Luma([if x == 0 { 0 } else { 210 }]));
    let matte = decode_matte(&encode_png(image::DynamicImage::ImageLuma8(gray))).unwrap();
    assert_eq!(matte.alpha(0, 0), 0);
    assert_eq!(matte.alpha(1, 0), 210);
    assert_eq!(matte.pixels().get_pixel(1, 0).0[..3], [255, 255, 255]);
}

#[test]
fn corrupt_bytes_are_asset_load_failures() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, FramepopError::AssetLoad(_)));
}

#[test]
fn missing_file_is_asset_load_failure() {
    let err = load_matte("/nonexistent/framepop/matte.png").unwrap_err();
    assert!(matches!(err, FramepopError::AssetLoad(_)));
}
