use std::cell::Cell;

use super::*;
use crate::transform::{LensParams, PlanarMirrorParams};

fn source(w: u32, h: u32) -> SourceImage {
    let pixels = (0..w * h)
        .map(|i| Rgba8::new(10 + i as u8, 20, 30, 255))
        .collect();
    SourceImage::from_pixels(w, h, 4, pixels).unwrap()
}

fn pipeline() -> RenderPipeline {
    RenderPipeline::new(EngineConfig::default()).unwrap()
}

fn planar() -> TaskParameters {
    TaskParameters::PlanarMirror(PlanarMirrorParams {
        offset_x: 2,
        offset_y: 0,
        canvas_size: 16,
    })
}

#[test]
fn planar_render_writes_both_copies() {
    let p = pipeline();
    let src = source(2, 2);
    let result = p.submit(&planar(), &src);
    assert_eq!(result.status(), "canvas");
    let canvas = result.canvas().unwrap();
    assert_eq!(canvas.count_non_background(), 8);
}

#[test]
fn lens_render_registers_request() {
    let p = pipeline();
    let params = TaskParameters::Lens(LensParams {
        start_x: 20.0,
        start_y: 0.0,
        scale: 1.0,
        focal_length: 10.0,
    });
    let id = RequestId::from_u64(42);
    let result = p.render("lens-panel", &params, &source(2, 2), id);
    assert_eq!(result.canvas().unwrap().count_non_background(), 8);
    assert_eq!(p.registry().latest("lens-panel"), Some(id));
}

#[test]
fn invalid_parameters_become_error_and_placeholder() {
    let p = pipeline();
    let params = TaskParameters::Lens(LensParams {
        scale: -1.0,
        ..LensParams::default()
    });
    let result = p.submit(&params, &source(2, 2));
    assert!(matches!(
        result,
        RenderResult::Error(OpticsError::InvalidParameters(_))
    ));
    let placeholder = result.into_canvas_or_placeholder(p.config());
    assert_eq!(placeholder.width(), PLACEHOLDER_SIDE);
    assert!(placeholder.pixels().iter().all(|&px| px == PLACEHOLDER_COLOUR));
}

#[test]
fn cancelled_matches_error_placeholder() {
    let p = pipeline();
    let cancelled = p.render_with(&|| true, &planar(), &source(2, 2));
    assert!(cancelled.is_cancelled());
    let a = cancelled.into_canvas_or_placeholder(p.config());
    let b = RenderResult::Error(OpticsError::invalid("x")).into_canvas_or_placeholder(p.config());
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn supersession_after_last_stage_still_cancels() {
    let p = pipeline();
    let polls = Cell::new(0);
    // Entry check, one scatter poll, final check.
    let check = || {
        polls.set(polls.get() + 1);
        polls.get() >= 3
    };
    assert!(p.render_with(&check, &planar(), &source(2, 2)).is_cancelled());
    assert_eq!(polls.get(), 3);
}

#[test]
fn same_request_twice_is_byte_identical() {
    let p = pipeline();
    let src = source(3, 2);
    let params = TaskParameters::Lens(LensParams::default());
    let a = p.submit(&params, &src);
    let b = p.submit(&params, &src);
    assert_eq!(
        a.canvas().unwrap().fingerprint(),
        b.canvas().unwrap().fingerprint()
    );
}

#[test]
fn zero_config_limits_are_rejected() {
    let cfg = EngineConfig {
        max_canvas_side: 0,
        ..EngineConfig::default()
    };
    assert!(RenderPipeline::new(cfg).is_err());
}
