//! Rectangle types and the overlap metric used to score detections.
//!
//! Two coordinate conventions are in play: the detector reports corners
//! ([`Boundary`]) while ground truth and cropping work with an origin plus a
//! size ([`Region`]). Keeping them as separate types makes every conversion
//! explicit.

/// Overlap at or above which a detection earns full credit (2 points).
pub const FULL_CREDIT_OVERLAP: f64 = 0.8;

/// Overlap at or above which a detection earns partial credit (1 point).
pub const PARTIAL_CREDIT_OVERLAP: f64 = 0.5;

/// Rectangle in corner form: top-left `(x1, y1)` and bottom-right `(x2, y2)`.
///
/// Invariant: `x1 <= x2` and `y1 <= y2`. A boundary whose corners coincide on
/// either axis has zero area and means "no object found".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Boundary {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Boundary {
    /// Builds a boundary from two corners, swapping coordinates as needed so
    /// the invariant holds.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Converts to size form.
    ///
    /// The bottom-right corner is treated as exclusive (`width = x2 - x1`),
    /// which is how historical scores were computed. A detector boundary whose
    /// `x2` is the last foreground column therefore loses that column here.
    pub fn to_region(self) -> Region {
        Region {
            x: self.x1,
            y: self.y1,
            width: self.width(),
            height: self.height(),
        }
    }

    pub fn width(&self) -> i32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> i32 {
        self.y2.saturating_sub(self.y1)
    }

    /// True when the boundary encloses no area.
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Rectangle in size form: origin `(x, y)` plus `width` and `height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Converts to corner form with an exclusive bottom-right corner.
    ///
    /// Corners past `i32::MAX` saturate.
    pub fn to_boundary(self) -> Boundary {
        Boundary::new(
            self.x,
            self.y,
            self.x.saturating_add(self.width),
            self.y.saturating_add(self.height),
        )
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            return 0;
        }
        i64::from(self.width) * i64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersection of two regions. Disjoint regions intersect in an empty
    /// region at the origin.
    pub fn intersection(&self, other: &Region) -> Region {
        // Far corners can exceed i32 for rectangles near the coordinate limit.
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 <= i64::from(x1) || y2 <= i64::from(y1) {
            return Region::default();
        }
        // The extent is bounded by the narrower input, so it fits in i32.
        Region::new(
            x1,
            y1,
            (x2 - i64::from(x1)) as i32,
            (y2 - i64::from(y1)) as i32,
        )
    }

    fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }
}

/// Fraction of the detected rectangle that lies inside the ground truth.
///
/// The denominator is the *detected* area, not the union, so this is a
/// containment measure rather than intersection-over-union:
///
/// - a small detection sitting entirely inside the truth scores `1.0` even
///   though it misses most of the object;
/// - a detection much larger than the truth can never reach `1.0`, even when it
///   contains the truth completely.
///
/// The scoring thresholds ([`FULL_CREDIT_OVERLAP`], [`PARTIAL_CREDIT_OVERLAP`])
/// are calibrated against this metric, so it is kept as-is.
///
/// A degenerate detection yields `0.0`.
pub fn overlap_ratio(detected: Boundary, truth: Region) -> f64 {
    let detected = detected.to_region();
    let detected_area = detected.area();
    if detected_area == 0 {
        return 0.0;
    }
    detected.intersection(&truth).area() as f64 / detected_area as f64
}

/// Rubric points for one image.
pub fn points_for(overlap: f64) -> u32 {
    if overlap >= FULL_CREDIT_OVERLAP {
        2
    } else if overlap >= PARTIAL_CREDIT_OVERLAP {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_new_orders_corners() {
        let b = Boundary::new(10, 2, 3, 8);
        assert_eq!(b, Boundary { x1: 3, y1: 2, x2: 10, y2: 8 });
    }

    #[test]
    fn test_boundary_region_conversion() {
        let b = Boundary::new(4, 5, 14, 25);
        let r = b.to_region();
        assert_eq!(r, Region::new(4, 5, 10, 20));
        assert_eq!(r.to_boundary(), b);
    }

    #[test]
    fn test_degenerate_boundary() {
        assert!(Boundary::default().is_degenerate());
        assert!(Boundary::new(3, 3, 3, 9).is_degenerate());
        assert!(!Boundary::new(0, 0, 1, 1).is_degenerate());
    }

    #[test]
    fn test_intersection_disjoint() {
        let a = Region::new(0, 0, 5, 5);
        let b = Region::new(10, 10, 5, 5);
        assert!(a.intersection(&b).is_empty());
        assert_eq!(a.intersection(&b).area(), 0);
    }

    #[test]
    fn test_intersection_near_coordinate_limit() {
        let far = Region::new(2_000_000_000, 0, 2_000_000_000, 10);
        assert!(Region::new(0, 0, 10, 10).intersection(&far).is_empty());

        let wide = Region::new(i32::MAX - 5, 0, i32::MAX, 10);
        let edge = Region::new(i32::MAX - 10, 0, 10, 10);
        assert_eq!(edge.intersection(&wide), Region::new(i32::MAX - 5, 0, 5, 10));
        assert_eq!(wide.intersection(&edge), Region::new(i32::MAX - 5, 0, 5, 10));
    }

    #[test]
    fn test_to_boundary_saturates() {
        let b = Region::new(i32::MAX - 1, 0, 100, 10).to_boundary();
        assert_eq!(b, Boundary::new(i32::MAX - 1, 0, i32::MAX, 10));
    }

    #[test]
    fn test_intersection_partial() {
        let a = Region::new(0, 0, 10, 10);
        let b = Region::new(5, 5, 10, 10);
        assert_eq!(a.intersection(&b), Region::new(5, 5, 5, 5));
    }

    #[test]
    fn test_overlap_truth_inside_detection() {
        let overlap = overlap_ratio(Boundary::new(0, 0, 10, 10), Region::new(0, 0, 5, 5));
        assert!((overlap - 0.25).abs() < 1e-12);
        assert_eq!(points_for(overlap), 0);
    }

    #[test]
    fn test_overlap_exact_match() {
        let overlap = overlap_ratio(Boundary::new(0, 0, 9, 9), Region::new(0, 0, 10, 10));
        assert!((overlap - 1.0).abs() < 1e-12);
        assert_eq!(points_for(overlap), 2);
    }

    #[test]
    fn test_overlap_small_detection_inside_truth_is_full() {
        // Containment quirk: a tiny detection inside the truth still scores 1.0.
        let overlap = overlap_ratio(Boundary::new(40, 40, 42, 42), Region::new(0, 0, 100, 100));
        assert_eq!(overlap, 1.0);
    }

    #[test]
    fn test_overlap_degenerate_detection() {
        assert_eq!(overlap_ratio(Boundary::default(), Region::new(0, 0, 10, 10)), 0.0);
        assert_eq!(overlap_ratio(Boundary::new(5, 0, 5, 50), Region::new(0, 0, 10, 10)), 0.0);
    }

    #[test]
    fn test_points_thresholds() {
        assert_eq!(points_for(1.0), 2);
        assert_eq!(points_for(0.8), 2);
        assert_eq!(points_for(0.79), 1);
        assert_eq!(points_for(0.5), 1);
        assert_eq!(points_for(0.49), 0);
        assert_eq!(points_for(0.0), 0);
    }
}
