use super::*;

#[test]
fn argb32_unpacks_channels_in_order() {
    let c = Rgba8Premul::from_argb32(0xFF10_2030);
    assert_eq!(c.to_array(), [0x10, 0x20, 0x30, 0xFF]);
}

#[test]
fn argb32_premultiplies_translucent_colors() {
    let c = Rgba8Premul::from_argb32(0x80FF_FFFF);
    assert_eq!(c.a, 0x80);
    assert_eq!(c.r, 0x80);
}

#[test]
fn non_empty_extent_rejects_zero_sides() {
    assert!(Extent::non_empty(0, 10).is_err());
    assert!(Extent::non_empty(10, 0).is_err());
    assert_eq!(Extent::non_empty(4, 2).unwrap().center(), Point::new(2.0, 1.0));
}
