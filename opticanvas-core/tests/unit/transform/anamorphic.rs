use super::*;
use crate::raster::canvas::Canvas;

fn solid(w: u32, h: u32) -> SourceImage {
    SourceImage::from_pixels(w, h, 4, vec![Rgba8::new(0, 128, 0, 255); (w * h) as usize]).unwrap()
}

fn gradient(w: u32, h: u32) -> SourceImage {
    let pixels = (0..h)
        .flat_map(|y| (0..w).map(move |x| Rgba8::new((x * 40) as u8, (y * 40) as u8, 0, 255)))
        .collect();
    SourceImage::from_pixels(w, h, 4, pixels).unwrap()
}

fn strategy(params: AnamorphicParams, src: &SourceImage) -> AnamorphicStrategy {
    AnamorphicStrategy::new(params, src.bounds(), &EngineConfig::default()).unwrap()
}

#[test]
fn inner_radius_is_integer_half_diagonal() {
    let b = |width, height| SourceBounds { width, height };
    assert_eq!(inner_radius(b(100, 100)), 70.0);
    assert_eq!(inner_radius(b(4, 4)), 2.0);
    assert_eq!(inner_radius(b(1, 1)), 1.0);
}

#[test]
fn canvas_and_grid_dimensions() {
    let src = solid(4, 4);
    let s = strategy(
        AnamorphicParams {
            radius_factor: 1.0,
            arc_angle: 180.0,
        },
        &src,
    );
    assert_eq!(
        s.canvas_size(),
        CanvasSize {
            width: 12,
            height: 16
        }
    );
    assert_eq!(
        s.sample_grid(),
        SourceBounds {
            width: 27,
            height: 5
        }
    );
}

#[test]
fn outer_arc_reads_top_row_and_inner_arc_bottom_row() {
    let src = gradient(4, 4);
    let s = strategy(
        AnamorphicParams {
            radius_factor: 1.0,
            arc_angle: 180.0,
        },
        &src,
    );
    let grid = s.sample_grid();
    let first = s.map(0, 0, &src)[0];
    assert_eq!(first.colour, src.pixel(0, 0));
    let last = s.map(grid.width - 1, grid.height - 1, &src)[0];
    assert_eq!(last.colour, src.pixel(3, 3));

    // Outer-left sample sits four units left of the centre, two units below the origin.
    assert!((first.dst_x - 2).abs() <= 1);
    assert!((first.dst_y - 10).abs() <= 1);
    assert_eq!(first.coverage, Coverage::Dense);
}

#[test]
fn row_interpolation_is_linear() {
    let row = [Rgba8::new(0, 0, 0, 255), Rgba8::new(100, 200, 50, 255)];
    assert_eq!(
        AnamorphicStrategy::sample_row(&row, 0.5),
        Rgba8::new(50, 100, 25, 255)
    );
    assert_eq!(AnamorphicStrategy::sample_row(&row, 1.0), row[1]);
    assert_eq!(AnamorphicStrategy::sample_row(&[row[1]], 0.0), row[1]);
}

#[test]
fn sector_interior_has_no_holes() {
    let src = solid(8, 6);
    let params = AnamorphicParams {
        radius_factor: 2.0,
        arc_angle: 120.0,
    };
    let s = strategy(params, &src);
    let mut canvas = Canvas::new(s.canvas_size(), Rgba8::WHITE);
    let grid = s.sample_grid();
    for y in 0..grid.height {
        for x in 0..grid.width {
            for p in s.map(x, y, &src) {
                assert!(canvas.put(p.dst_x, p.dst_y, p.colour).is_some());
            }
        }
    }

    let inner = inner_radius(src.bounds());
    let outer = inner * 3.0;
    let half_w = f64::from(s.canvas_size().width) / 2.0;
    let half_h = f64::from(s.canvas_size().height) / 2.0;
    let half_sweep = params.arc_angle.to_radians() / 2.0;
    let mut checked = 0;
    for row in 0..canvas.height() {
        for col in 0..canvas.width() {
            let wx = f64::from(col) + 0.5 - half_w;
            let wy = half_h - (f64::from(row) + 0.5) + 3.0;
            let r = wx.hypot(wy);
            let off_down = (wx.atan2(-wy)).abs();
            if r > inner + 1.0 && r < outer - 1.0 && off_down < half_sweep - 1.0 / r {
                checked += 1;
                assert!(!canvas.is_background(col, row), "hole at ({col}, {row})");
            }
        }
    }
    assert!(checked > 100);
}

#[test]
fn arc_and_radius_factor_domains() {
    let bounds = SourceBounds {
        width: 4,
        height: 4,
    };
    let cfg = EngineConfig::default();
    for params in [
        AnamorphicParams {
            radius_factor: -0.1,
            arc_angle: 90.0,
        },
        AnamorphicParams {
            radius_factor: 1.0,
            arc_angle: 0.0,
        },
        AnamorphicParams {
            radius_factor: 1.0,
            arc_angle: 360.5,
        },
    ] {
        assert!(AnamorphicStrategy::new(params, bounds, &cfg).is_err());
    }
    let full_circle = AnamorphicParams {
        radius_factor: 0.0,
        arc_angle: 360.0,
    };
    assert!(AnamorphicStrategy::new(full_circle, bounds, &cfg).is_ok());
}

#[test]
fn source_bounds_differ_from_sample_grid() {
    let src = solid(4, 4);
    let s = strategy(AnamorphicParams::default(), &src);
    assert_eq!(s.source_bounds(), src.bounds());
    assert_ne!(s.sample_grid(), src.bounds());
}
