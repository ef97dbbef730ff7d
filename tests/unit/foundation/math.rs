use super::*;

#[test]
fn fnv_seeded_hash_is_stable() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"framepop");
    let mut b = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    b.write_u8(b'f');
    b.write_bytes(b"ramepop");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn lerp_hits_endpoints() {
    assert_eq!(lerp(6.0, 1.0, 0.0), 6.0);
    assert_eq!(lerp(6.0, 1.0, 1.0), 1.0);
    assert_eq!(lerp(6.0, 1.0, 0.5), 3.5);
}

#[test]
fn premultiply_then_unpremultiply_keeps_opaque_and_clears_transparent() {
    let mut px = vec![200, 100, 50, 255, 200, 100, 50, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[200, 100, 50, 255]);
    assert_eq!(&px[4..], &[0, 0, 0, 0]);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[200, 100, 50, 255]);
}
