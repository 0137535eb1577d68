use super::*;
use crate::foundation::core::Canvas;

fn canvas() -> Canvas {
    Canvas::new(128, 128).unwrap()
}

fn painted(buf: &PixelBuffer) -> Vec<usize> {
    buf.samples()
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v != WHITE)
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn degenerate_line_paints_single_pixel() {
    let mut buf = PixelBuffer::blank(canvas());
    draw_line(&mut buf, Point::new(0, 0), Point::new(0, 0), 0, 1, None);
    assert_eq!(painted(&buf), vec![0]);
}

#[test]
fn dot_size_three_paints_clipped_block() {
    let c = canvas();
    let mut buf = PixelBuffer::blank(c);
    draw_dot(&mut buf, 10, 20, 0, 3, None);
    let mut expected = Vec::new();
    for y in 19..=21 {
        for x in 9..=11 {
            expected.push(c.index_of(x, y));
        }
    }
    assert_eq!(painted(&buf), expected);

    let mut corner = PixelBuffer::blank(c);
    draw_dot(&mut corner, 0, 0, 0, 3, None);
    assert_eq!(
        painted(&corner),
        vec![c.index_of(0, 0), c.index_of(1, 0), c.index_of(0, 1), c.index_of(1, 1)]
    );

    let mut far = PixelBuffer::blank(c);
    draw_dot(&mut far, 127, 127, 0, 3, None);
    assert_eq!(painted(&far).len(), 4);
}

#[test]
fn even_brush_is_floor_biased() {
    let c = canvas();
    let mut buf = PixelBuffer::blank(c);
    draw_dot(&mut buf, 5, 5, 0, 2, None);
    assert_eq!(
        painted(&buf),
        vec![c.index_of(4, 4), c.index_of(5, 4), c.index_of(4, 5), c.index_of(5, 5)]
    );
}

#[test]
fn size_zero_is_treated_as_one() {
    let mut buf = PixelBuffer::blank(canvas());
    draw_dot(&mut buf, 3, 3, 0, 0, None);
    assert_eq!(painted(&buf), vec![canvas().index_of(3, 3)]);
}

#[test]
fn soft_alpha_falls_off_with_distance() {
    assert_eq!(soft_alpha(0, 0, 1), 1.0);
    assert_eq!(soft_alpha(0, 0, 5), 1.0);
    let near = soft_alpha(1, 0, 5);
    let far = soft_alpha(2, 0, 5);
    assert!(near < 1.0);
    assert!(far < near);
    assert!(far > 0.0);
    assert_eq!(soft_alpha(2, 2, 5), 0.0);
    assert_eq!(soft_alpha(1, 0, 1), 0.0);
}

#[test]
fn soft_dot_size_one_sets_center_exactly() {
    let mut buf = PixelBuffer::blank(canvas());
    draw_soft_dot(&mut buf, 4, 4, 0, 1, None);
    assert_eq!(painted(&buf), vec![canvas().index_of(4, 4)]);
    assert_eq!(buf.get(4, 4), Some(0));
}

#[test]
fn soft_dot_blends_and_records_prior() {
    let c = canvas();
    let mut buf = PixelBuffer::blank(c);
    let mut cs = ChangeSet::new();
    draw_soft_dot(&mut buf, 10, 10, 0, 5, Some(&mut cs));

    assert_eq!(buf.get(10, 10), Some(0));
    let expected = (255.0 * (1.0 - soft_alpha(1, 0, 5))).round() as u8;
    assert_eq!(buf.get(11, 10), Some(expected));
    assert_eq!(buf.get(12, 12), Some(255));
    assert_eq!(cs.len(), 25);
    assert_eq!(cs.original(c.index_of(10, 10)), Some(255));
}

#[test]
fn line_walk_includes_both_endpoints() {
    let mut cells = Vec::new();
    walk_line(0, 0, 4, 2, |x, y| cells.push((x, y)));
    assert_eq!(cells.first(), Some(&(0, 0)));
    assert_eq!(cells.last(), Some(&(4, 2)));
    assert_eq!(cells.len(), 5);

    let mut back = Vec::new();
    walk_line(4, 2, 0, 0, |x, y| back.push((x, y)));
    assert_eq!(back.first(), Some(&(4, 2)));
    assert_eq!(back.last(), Some(&(0, 0)));
}

#[test]
fn overlapping_line_records_each_pixel_once() {
    let c = canvas();
    let mut buf = PixelBuffer::blank(c);
    buf.set_at(c.index_of(2, 0), 77);
    let mut cs = ChangeSet::new();
    draw_line(&mut buf, Point::new(0, 0), Point::new(5, 0), 0, 3, Some(&mut cs));

    // Columns 0..=6 (left spill clipped), rows 0..=1 (top spill clipped).
    assert_eq!(cs.len(), 7 * 2);
    assert_eq!(cs.original(c.index_of(2, 0)), Some(77));
}

#[test]
fn soft_line_reapplies_paint_on_revisit() {
    let c = canvas();
    let mut once = PixelBuffer::blank(c);
    draw_soft_dot(&mut once, 10, 10, 0, 3, None);
    let mut line = PixelBuffer::blank(c);
    let mut cs = ChangeSet::new();
    draw_soft_line(&mut line, Point::new(10, 10), Point::new(11, 10), 0, 3, Some(&mut cs));

    // The shared cell is blended twice, so it ends darker than a single dab.
    let shared = c.index_of(11, 11);
    assert!(line.at(shared) < once.at(shared));
    assert_eq!(cs.original(shared), Some(255));
}

#[test]
fn eraser_paints_white_regardless_of_gray() {
    let c = canvas();
    let mut buf = PixelBuffer::filled(c, 0);
    apply_stroke(&mut buf, Tool::Eraser, None, Point::new(3, 3), 10, 1, None);
    assert_eq!(buf.get(3, 3), Some(255));
}

#[test]
fn apply_stroke_dispatches_dot_or_line() {
    let c = canvas();
    let mut dot = PixelBuffer::blank(c);
    apply_stroke(&mut dot, Tool::Pencil, None, Point::new(3, 3), 40, 1, None);
    assert_eq!(painted(&dot), vec![c.index_of(3, 3)]);
    assert_eq!(dot.get(3, 3), Some(40));

    let mut line = PixelBuffer::blank(c);
    apply_stroke(
        &mut line,
        Tool::Pencil,
        Some(Point::new(0, 3)),
        Point::new(3, 3),
        40,
        1,
        None,
    );
    assert_eq!(painted(&line).len(), 4);

    let mut soft = PixelBuffer::blank(c);
    apply_stroke(&mut soft, Tool::Soft, None, Point::new(3, 3), 0, 3, None);
    assert_eq!(soft.get(3, 3), Some(0));
    assert!(soft.get(4, 3).unwrap() > 0);
}
