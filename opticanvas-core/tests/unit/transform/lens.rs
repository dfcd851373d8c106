use super::*;
use crate::foundation::core::Rgba8;

fn source(w: u32, h: u32) -> SourceImage {
    let pixels = (0..w * h)
        .map(|i| Rgba8::new(i as u8, 10, 20, 255))
        .collect();
    SourceImage::from_pixels(w, h, 4, pixels).unwrap()
}

fn strategy(params: LensParams, src: &SourceImage) -> LensStrategy {
    LensStrategy::new(params, src.bounds(), &EngineConfig::default()).unwrap()
}

#[test]
fn thin_lens_real_image_at_twice_focal_length() {
    let (v, m) = thin_lens(20.0, 10.0).unwrap();
    assert!((v - 20.0).abs() < 1e-12);
    assert!((m + 1.0).abs() < 1e-12);
}

#[test]
fn thin_lens_degenerate_inputs_have_no_image() {
    assert_eq!(thin_lens(10.0, 10.0), None);
    assert_eq!(thin_lens(10.0, 0.0), None);
    assert_eq!(thin_lens(0.0, 5.0), None);
}

#[test]
fn diverging_lens_gives_virtual_upright_image() {
    let (v, m) = thin_lens(20.0, -10.0).unwrap();
    assert!(v < 0.0);
    assert!(m > 0.0 && m < 1.0);
}

#[test]
fn two_by_two_object_and_image_cells() {
    let src = source(2, 2);
    let s = strategy(
        LensParams {
            start_x: 20.0,
            start_y: 0.0,
            scale: 1.0,
            focal_length: 10.0,
        },
        &src,
    );
    assert_eq!(
        s.canvas_size(),
        CanvasSize {
            width: 100,
            height: 100
        }
    );

    let top_left = s.map(0, 0, &src);
    assert_eq!(top_left.len(), 2);
    assert_eq!((top_left[0].dst_x, top_left[0].dst_y), (30, 49));
    assert_eq!(top_left[0].coverage, Coverage::Dense);
    assert_eq!((top_left[1].dst_x, top_left[1].dst_y), (70, 50));
    assert_eq!(top_left[1].coverage, Coverage::Sparse);
    assert_eq!(top_left[1].colour, src.pixel(0, 0));

    let bottom_right = s.map(1, 1, &src);
    assert_eq!((bottom_right[0].dst_x, bottom_right[0].dst_y), (29, 50));
    assert_eq!((bottom_right[1].dst_x, bottom_right[1].dst_y), (69, 49));
}

#[test]
fn column_at_focal_point_only_emits_object() {
    let src = source(2, 1);
    let s = strategy(
        LensParams {
            start_x: 10.0,
            focal_length: 10.0,
            ..LensParams::default()
        },
        &src,
    );
    assert_eq!(s.map(0, 0, &src).len(), 1);
    assert_eq!(s.map(1, 0, &src).len(), 2);
}

#[test]
fn canvas_grows_with_focal_length() {
    let src = source(4, 4);
    let s = strategy(
        LensParams {
            start_x: 10.0,
            start_y: 0.0,
            scale: 1.0,
            focal_length: 100.0,
        },
        &src,
    );
    assert_eq!(s.canvas_size().height, 600);
    assert_eq!(s.canvas_size().width, 720);
}

#[test]
fn invalid_parameters_are_rejected() {
    let bounds = SourceBounds {
        width: 2,
        height: 2,
    };
    let cfg = EngineConfig::default();
    for p in [
        LensParams {
            scale: 0.0,
            ..LensParams::default()
        },
        LensParams {
            focal_length: f64::NAN,
            ..LensParams::default()
        },
        LensParams {
            start_x: 1.0e9,
            ..LensParams::default()
        },
    ] {
        assert!(matches!(
            LensStrategy::new(p, bounds, &cfg),
            Err(OpticsError::InvalidParameters(_))
        ));
    }
}
