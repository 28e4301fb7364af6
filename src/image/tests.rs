use std::f32::consts::FRAC_PI_2;

use super::*;
use Color as C;

fn image_from<const W: usize, const H: usize>(rows: [[Color; W]; H]) -> Image {
    let mut image = Image::new(W as u32, H as u32);
    for (y, row) in rows.iter().enumerate() {
        for (x, color) in row.iter().enumerate() {
            image.set(x as u32, y as u32, *color);
        }
    }
    image
}

#[test]
fn view_reads_subrect() {
    let image = image_from([[C::RED, C::GREEN], [C::BLUE, C::WHITE]]);

    let view = image.view(Rect::from_top_left(1.0, 1.0, 1.0, 1.0));
    assert_eq!(view.resolution(), Resolution::new(1, 1));
    assert_eq!(view.get(0, 0), C::WHITE);

    // Areas outside of the image read as transparent.
    let view = image.view(Rect::from_top_left(1.0, 0.0, 2.0, 1.0));
    assert_eq!(view.get(0, 0), C::GREEN);
    assert_eq!(view.get(1, 0), C::NULL);
}

#[test]
fn nested_views_compose() {
    let image = image_from([[C::RED, C::GREEN, C::BLUE]]);
    let outer = image.view(Rect::from_top_left(1.0, 0.0, 2.0, 1.0));
    let inner = outer.view(Rect::from_top_left(1.0, 0.0, 1.0, 1.0));
    assert_eq!(inner.get(0, 0), C::BLUE);
}

#[test]
fn rotated_view() {
    let image = image_from([[C::RED, C::GREEN], [C::BLUE, C::WHITE]]);
    let view = image.view(RotatedRect::new(image.rect(), FRAC_PI_2));
    // The view's top-left pixel lands on the image's top-right corner.
    assert_eq!(view.get(0, 0), C::GREEN);
    assert_eq!(view.get(1, 0), C::WHITE);
    assert_eq!(view.get(0, 1), C::RED);
}

#[test]
fn writes_outside_are_ignored() {
    let mut image = image_from([[C::RED]]);
    let mut view = image.view_mut(Rect::from_top_left(-1.0, 0.0, 2.0, 1.0));
    view.set(0, 0, C::GREEN);
    view.set(1, 0, C::BLUE);
    assert_eq!(image.get(0, 0), C::BLUE);
}

#[test]
fn flip_and_clear() {
    let mut image = image_from([[C::RED, C::GREEN]]);
    image.flip_horizontal_in_place();
    assert_eq!(image.get(0, 0), C::GREEN);
    assert_eq!(image.get(1, 0), C::RED);
    image.clear(C::BLACK);
    assert_eq!(image.get(1, 0), C::BLACK);
}

#[test]
fn to_image_copies_view() {
    let image = image_from([[C::RED, C::GREEN], [C::BLUE, C::WHITE]]);
    let copy = image.view(Rect::from_top_left(0.0, 1.0, 2.0, 1.0)).to_image();
    assert_eq!(copy.resolution(), Resolution::new(2, 1));
    assert_eq!(copy.get(0, 0), C::BLUE);
    assert_eq!(copy.get(1, 0), C::WHITE);
}

#[test]
fn blend_modes() {
    let mut image = image_from([[C::RED]]);
    image
        .blend_from(&image_from([[C::GREEN.with_alpha(0)]]))
        .mode(BlendMode::Alpha);
    assert_eq!(image.get(0, 0), C::RED);

    image.blend_from(&image_from([[C::GREEN]])).mode(BlendMode::Alpha);
    assert_eq!(image.get(0, 0), C::GREEN);

    image
        .blend_from(&image_from([[C::BLUE.with_alpha(0)]]))
        .mode(BlendMode::Overwrite);
    assert_eq!(image.get(0, 0), C::BLUE.with_alpha(0));
}

#[test]
fn additive_blend_saturates() {
    let mut image = image_from([[C::from_rgb8(200, 10, 0), C::BLACK]]);
    let overlay = image_from([[C::RED, C::NULL]]);
    image.blend_from(&overlay).mode(BlendMode::Additive(0.5));
    assert_eq!(image.get(0, 0), C::from_rgb8(255, 10, 0));
    assert_eq!(image.get(1, 0), C::BLACK);
}

#[test]
fn blend_stretches_source() {
    let mut image = Image::new(4, 2);
    image
        .blend_from(&image_from([[C::RED, C::GREEN]]))
        .mode(BlendMode::Overwrite);
    assert_eq!(image.get(0, 0), C::RED);
    assert_eq!(image.get(1, 1), C::RED);
    assert_eq!(image.get(2, 0), C::GREEN);
    assert_eq!(image.get(3, 1), C::GREEN);
}
