use super::*;

#[test]
fn distinct_from_only_moves_colliding_colours() {
    let bg = Rgba8::WHITE;
    assert_eq!(Rgba8::new(1, 2, 3, 4).distinct_from(bg), Rgba8::new(1, 2, 3, 4));
    assert_eq!(bg.distinct_from(bg), Rgba8::new(255, 255, 254, 255));

    let black = Rgba8::new(0, 0, 0, 255);
    assert_eq!(black.distinct_from(black), Rgba8::new(0, 0, 1, 255));
}

#[test]
fn rgba_serializes_as_channel_array() {
    let json = serde_json::to_string(&Rgba8::new(10, 20, 30, 40)).unwrap();
    assert_eq!(json, "[10,20,30,40]");
    let back: Rgba8 = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Rgba8::new(10, 20, 30, 40));
}

#[test]
fn pixel_box_grows_and_contains() {
    let mut b = PixelBox::point(5, 7);
    assert_eq!((b.width(), b.height()), (1, 1));
    b.include(2, 9);
    b.include(8, 8);
    assert_eq!(
        b,
        PixelBox {
            min_x: 2,
            min_y: 7,
            max_x: 8,
            max_y: 9
        }
    );
    assert!(b.contains(2, 7));
    assert!(b.contains(8, 9));
    assert!(!b.contains(9, 9));
    assert!(!b.contains(2, 6));
    assert_eq!((b.width(), b.height()), (7, 3));
}
