use super::*;

#[test]
fn empty_document_yields_defaults() {
    let cfg = SceneConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, SceneConfig::default());
    assert_eq!(cfg.background().to_array(), [0, 0, 0, 255]);
}

#[test]
fn partial_document_overrides_fields() {
    let json = r#"{
        "shape_kind": "clover",
        "animation_variant": "spring",
        "depth_pop_enabled": false,
        "background_color": 4278255360
    }"#;
    let cfg = SceneConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.shape_kind, ShapeKind::Clover);
    assert_eq!(cfg.animation_variant, AnimationVariant::Spring);
    assert!(!cfg.depth_pop_enabled);
    assert!(cfg.centering_enabled);
    assert_eq!(cfg.background().to_array(), [0, 255, 0, 255]);
}

#[test]
fn non_positive_padding_is_rejected() {
    let err = SceneConfig::from_reader(r#"{ "subject_padding_scale": 0.0 }"#.as_bytes())
        .unwrap_err();
    assert!(err.to_string().contains("subject_padding_scale"));
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(SceneConfig::from_reader(r#"{ "shape": "circle" }"#.as_bytes()).is_err());
}
