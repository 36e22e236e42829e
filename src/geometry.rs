//! Pure placement math for toast windows
//!
//! Everything in here is plain arithmetic over [`Rect`]/[`Size`]/[`Point`] so
//! it can be exercised without a display. The poll loop and the settings UI
//! both go through these functions, which keeps the two in agreement about
//! where a toast belongs.

use crate::utils::{Point, Rect, Size};

/// Clamp a stored monitor index into the currently valid range.
///
/// A monitor that was selected and later unplugged leaves a stale index in
/// the registry. Rather than silently anchoring at the desktop origin, the
/// toast stays on the nearest still-valid monitor.
pub fn clamp_monitor_index(index: i32, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    index.clamp(0, count as i32 - 1) as usize
}

/// Desired top-left corner for a toast of `size` on `bounds`.
///
/// The offsets measure from the monitor's left and top edges to the toast's
/// right and bottom edges. Positions are re-anchored back inside the monitor
/// when the window would stick out: left edge first, then top edge, then a
/// top-anchored retry, and finally vertical centering when nothing fits.
pub fn desired_position(bounds: Rect, size: Size, x_offset: i32, y_offset: i32) -> Point {
    let mut x = bounds.x + x_offset - size.width;
    let mut y = bounds.y + y_offset - size.height;

    if x < bounds.x {
        x = bounds.x;
    }

    if y < bounds.y {
        y = bounds.y;
    } else if y + size.height > bounds.bottom() {
        y = bounds.y + y_offset;
        if y + size.height > bounds.bottom() {
            y = bounds.y + (bounds.height - size.height) / 2;
        }
    }

    Point::new(x, y)
}

/// Desired positions for several simultaneous toasts, stacked downward.
///
/// The first toast lands at [`desired_position`]; each following one starts
/// directly under its predecessor. A stack that runs past the monitor bottom
/// is pushed back up so the last toast stays fully visible.
pub fn stacked_positions(bounds: Rect, sizes: &[Size], x_offset: i32, y_offset: i32) -> Vec<Point> {
    let mut positions = Vec::with_capacity(sizes.len());
    let mut next_y: Option<i32> = None;

    for size in sizes {
        let anchor = desired_position(bounds, *size, x_offset, y_offset);
        let mut y = match next_y {
            None => anchor.y,
            Some(below) => below,
        };
        if y + size.height > bounds.bottom() {
            y = bounds.bottom() - size.height;
        }
        if y < bounds.y {
            y = bounds.y;
        }
        positions.push(Point::new(anchor.x, y));
        next_y = Some(y + size.height);
    }

    positions
}

/// Map an opacity percentage (0..=100) to a layered-window alpha byte,
/// rounding half up. Integer math: `percent * 2.55` in f64 lands just below
/// the true value for some inputs (50 gives 127.49...) and would round the
/// wrong way.
pub fn opacity_to_alpha(percent: i32) -> u8 {
    let percent = percent.clamp(0, 100);
    ((percent * 255 + 50) / 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(width: i32, height: i32) -> Rect {
        Rect::new(0, 0, width, height)
    }

    #[test]
    fn position_is_right_bottom_anchored() {
        let p = desired_position(monitor(1920, 1080), Size::new(372, 252), 1900, 400);
        assert_eq!(p, Point::new(1900 - 372, 400 - 252));
    }

    #[test]
    fn position_respects_monitor_origin() {
        let bounds = Rect::new(-1920, 200, 1920, 1080);
        let p = desired_position(bounds, Size::new(372, 252), 1900, 400);
        assert_eq!(p, Point::new(-1920 + 1900 - 372, 200 + 400 - 252));
    }

    #[test]
    fn small_offsets_clamp_to_top_left() {
        // A 372x252 toast with offsets (100, 50) overhangs both edges and
        // snaps to the monitor origin.
        let p = desired_position(monitor(1920, 1080), Size::new(372, 252), 100, 50);
        assert_eq!(p, Point::new(0, 0));
    }

    #[test]
    fn bottom_overflow_centers_vertically() {
        // Offset carried over from a taller monitor: 900 > 600 means both the
        // bottom-anchored and top-anchored candidates overflow, so the toast
        // is centered.
        let bounds = monitor(800, 600);
        let size = Size::new(372, 252);
        let p = desired_position(bounds, size, 500, 900);
        assert_eq!(p.y, (600 - 252) / 2);
        assert!(p.y + size.height <= bounds.bottom());
    }

    #[test]
    fn clamped_position_never_leaves_left_edge() {
        for x_offset in [-500, -1, 0, 5, 371] {
            let p = desired_position(monitor(1920, 1080), Size::new(372, 96), x_offset, 500);
            assert!(p.x >= 0, "x_offset {} gave x {}", x_offset, p.x);
        }
    }

    #[test]
    fn stack_runs_downward() {
        let sizes = [Size::new(372, 100), Size::new(372, 140), Size::new(372, 100)];
        let ps = stacked_positions(monitor(1920, 1080), &sizes, 1900, 300);
        assert_eq!(ps[0].y, 300 - 100);
        assert_eq!(ps[1].y, ps[0].y + 100);
        assert_eq!(ps[2].y, ps[1].y + 140);
        assert!(ps.iter().all(|p| p.x == 1900 - 372));
    }

    #[test]
    fn stack_is_clamped_to_monitor_bottom() {
        let sizes = [Size::new(372, 252), Size::new(372, 252), Size::new(372, 252)];
        let bounds = monitor(800, 600);
        let ps = stacked_positions(bounds, &sizes, 500, 590);
        for (p, s) in ps.iter().zip(&sizes) {
            assert!(p.y + s.height <= bounds.bottom());
            assert!(p.y >= bounds.y);
        }
    }

    #[test]
    fn alpha_mapping_rounds() {
        assert_eq!(opacity_to_alpha(0), 0);
        assert_eq!(opacity_to_alpha(50), 128);
        assert_eq!(opacity_to_alpha(100), 255);
        assert_eq!(opacity_to_alpha(1), 3);
    }

    #[test]
    fn alpha_mapping_clamps_out_of_range_input() {
        assert_eq!(opacity_to_alpha(-20), 0);
        assert_eq!(opacity_to_alpha(900), 255);
    }

    #[test]
    fn monitor_index_is_clamped() {
        assert_eq!(clamp_monitor_index(-1, 3), 0);
        assert_eq!(clamp_monitor_index(1, 3), 1);
        assert_eq!(clamp_monitor_index(99, 3), 2);
        assert_eq!(clamp_monitor_index(5, 0), 0);
    }
}
