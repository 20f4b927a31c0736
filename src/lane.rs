use crate::io::ImageSize;

/// The geometry of the road: `lane_count` identical lanes laid side by side.
///
/// Lanes are numbered from 1 (leftmost) to `lane_count` (rightmost).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneGeometry {
    /// The number of lanes.
    lane_count: usize,
    /// The width of a single lane in px.
    lane_width: f64,
    /// The height of a lane in px, which is also the height of the play area.
    lane_height: f64,
}

impl LaneGeometry {
    /// Creates the geometry for `lane_count` lanes of the given size.
    pub fn new(lane_count: usize, lane_width: f64, lane_height: f64) -> Self {
        Self {
            lane_count,
            lane_width,
            lane_height,
        }
    }

    /// Creates the geometry from the pixel size of the lane sprite.
    pub fn from_sprite(lane_count: usize, sprite: ImageSize) -> Self {
        Self::new(lane_count, sprite.width as f64, sprite.height as f64)
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    pub fn lane_width(&self) -> f64 {
        self.lane_width
    }

    pub fn lane_height(&self) -> f64 {
        self.lane_height
    }

    /// The size of the play area in px, as `(width, height)`.
    pub fn play_area(&self) -> (f64, f64) {
        (self.lane_count as f64 * self.lane_width, self.lane_height)
    }

    /// The width of the play area in px.
    pub fn width(&self) -> f64 {
        self.play_area().0
    }

    /// The height of the play area in px.
    pub fn height(&self) -> f64 {
        self.play_area().1
    }

    /// The x coordinate which centres a box of width `box_width` in `lane`.
    pub fn lane_to_x(&self, lane: usize, box_width: f64) -> f64 {
        (lane as f64 - 1.0) * self.lane_width + self.margin(box_width)
    }

    /// The lane that a box of width `box_width` at `x` is in.
    ///
    /// The result is only meaningful while the box is within the horizontal
    /// bounds of the play area; it is never clamped.
    pub fn x_to_lane(&self, x: f64, box_width: f64) -> i64 {
        ((x - self.margin(box_width)) / self.lane_width).round() as i64 + 1
    }

    /// Returns true if `lane` is one of the lanes of the road.
    pub fn contains_lane(&self, lane: i64) -> bool {
        lane >= 1 && lane <= self.lane_count as i64
    }

    /// Returns true if a box of width `box_width` at `x` lies entirely
    /// within the horizontal bounds of the play area.
    pub fn fits(&self, x: f64, box_width: f64) -> bool {
        x >= 0.0 && x + box_width <= self.width()
    }

    /// The gap between the lane's edge and a centred box.
    fn margin(&self, box_width: f64) -> f64 {
        0.5 * (self.lane_width - box_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_area_scales_with_lane_count() {
        let geom = LaneGeometry::new(5, 100.0, 600.0);
        assert_eq!(geom.play_area(), (500.0, 600.0));
    }

    #[test]
    fn lane_and_x_agree() {
        let geom = LaneGeometry::new(5, 100.0, 600.0);
        assert_eq!(geom.lane_to_x(1, 60.0), 20.0);
        assert_eq!(geom.lane_to_x(5, 60.0), 420.0);
        for lane in 1..=5 {
            let x = geom.lane_to_x(lane, 60.0);
            assert_eq!(geom.x_to_lane(x, 60.0), lane as i64);
        }
    }

    #[test]
    fn fits_rejects_boxes_crossing_an_edge() {
        let geom = LaneGeometry::new(5, 100.0, 600.0);
        assert!(geom.fits(0.0, 60.0));
        assert!(geom.fits(440.0, 60.0));
        assert!(!geom.fits(-80.0, 60.0));
        assert!(!geom.fits(441.0, 60.0));
    }
}
