use super::*;

#[test]
fn rgb_bytes_become_opaque_rgba() {
    let img = SourceImage::from_rgb8(2, 1, &[1, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(img.channel_count(), 3);
    assert_eq!(img.pixel(0, 0), Rgba8::new(1, 2, 3, 255));
    assert_eq!(img.pixel(1, 0), Rgba8::new(4, 5, 6, 255));
}

#[test]
fn float_channels_normalize_into_u8_domain() {
    let img = SourceImage::from_rgba_f32(1, 2, 4, &[0.0, 0.5, 1.0, 1.0, 2.0, -1.0, f32::NAN, 0.0])
        .unwrap();
    assert_eq!(img.pixel(0, 0), Rgba8::new(0, 128, 255, 255));
    assert_eq!(img.pixel(0, 1), Rgba8::new(255, 0, 0, 0));
}

#[test]
fn mismatched_or_empty_buffers_are_source_errors() {
    assert!(matches!(
        SourceImage::from_rgba8(2, 2, &[0; 12]),
        Err(OpticsError::SourceUnavailable(_))
    ));
    assert!(matches!(
        SourceImage::from_rgba8(0, 0, &[]),
        Err(OpticsError::SourceUnavailable(_))
    ));
    assert!(SourceImage::from_rgba8(1, 1, &[0; 5]).is_err());
    assert!(SourceImage::from_rgba_f32(1, 1, 2, &[0.0; 2]).is_err());
}

#[test]
fn rows_are_row_major() {
    let data: Vec<u8> = (0..6u8).flat_map(|i| [i, 0, 0, 255]).collect();
    let img = SourceImage::from_rgba8(3, 2, &data).unwrap();
    let row: Vec<u8> = img.row(1).iter().map(|c| c.r).collect();
    assert_eq!(row, vec![3, 4, 5]);
}

#[test]
fn placeholder_has_red_core_and_clear_border() {
    let img = SourceImage::placeholder(20);
    assert_eq!(img.pixel(0, 0).a, 0);
    assert_eq!(img.pixel(10, 10), Rgba8::new(255, 0, 0, 255));
    assert_eq!(img.pixel(19, 19).a, 0);
}
