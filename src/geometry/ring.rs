use crate::error::{GeometryError, Result};
use crate::math::{midpoint, Point2, Vector2};

/// One ring of a feature's geometry, held open while under edit.
///
/// Stored polygon rings duplicate their first point at the end; the
/// duplicate is stripped on construction and re-appended by
/// [`CoordinateRing::to_closed`]. Editing logic never sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateRing {
    points: Vec<Point2>,
}

impl CoordinateRing {
    /// Opens a stored closed ring, stripping the duplicated terminal
    /// point when present.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateRing`] if fewer than 3 open
    /// vertices remain.
    pub fn from_closed(raw: &[Point2]) -> Result<Self> {
        let mut points = raw.to_vec();
        if points.len() >= 2 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < 3 {
            return Err(GeometryError::DegenerateRing(points.len()).into());
        }
        Ok(Self { points })
    }

    /// Returns the closed form of the ring, with the first point
    /// re-appended at the end.
    #[must_use]
    pub fn to_closed(&self) -> Vec<Point2> {
        let mut closed = self.points.clone();
        if let Some(first) = self.points.first() {
            closed.push(*first);
        }
        closed
    }

    /// Number of open-ring vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the ring holds no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The open-ring vertices in order.
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Returns the vertex at `index`, if any.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<Point2> {
        self.points.get(index).copied()
    }

    /// Replaces the vertex at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set_point(&mut self, index: usize, point: Point2) {
        self.points[index] = point;
    }

    /// Inserts a vertex at `index`, shifting later vertices up.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, point: Point2) {
        self.points.insert(index, point);
    }

    /// Removes and returns the vertex at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Point2 {
        self.points.remove(index)
    }

    /// Arithmetic mean of the vertex at `index` and the one preceding
    /// it, wrapping to the last vertex when `index == 0`.
    ///
    /// # Panics
    ///
    /// Panics if the ring is empty or `index` is out of range.
    #[must_use]
    pub fn midpoint_before(&self, index: usize) -> Point2 {
        let prev = if index == 0 {
            self.points.len() - 1
        } else {
            index - 1
        };
        midpoint(self.points[prev], self.points[index])
    }

    /// Shifts every vertex uniformly by `delta`.
    pub fn translate(&mut self, delta: Vector2) {
        for point in &mut self.points {
            *point += delta;
        }
    }

    /// Finds the vertex exactly equal to `point`.
    ///
    /// Exact floating-point comparison is intentional: a snapped drag
    /// origin is read from the same stored coordinate it is compared
    /// against, so the match is bit-for-bit.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn index_of(&self, point: Point2) -> Option<usize> {
        self.points
            .iter()
            .position(|p| p.x == point.x && p.y == point.y)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::TOLERANCE;
    use approx::assert_relative_eq;

    fn square_closed() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(0.0, 0.0),
        ]
    }

    #[test]
    fn from_closed_strips_duplicate_terminal() {
        let ring = CoordinateRing::from_closed(&square_closed()).unwrap();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.point(3), Some(Point2::new(0.0, 10.0)));
    }

    #[test]
    fn from_closed_keeps_unclosed_sequence() {
        let open = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(5.0, 8.0),
        ];
        let ring = CoordinateRing::from_closed(&open).unwrap();
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn from_closed_rejects_degenerate() {
        let segment = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        assert!(CoordinateRing::from_closed(&segment).is_err());
        assert!(CoordinateRing::from_closed(&[]).is_err());
    }

    #[test]
    fn to_closed_reappends_first() {
        let ring = CoordinateRing::from_closed(&square_closed()).unwrap();
        let closed = ring.to_closed();
        assert_eq!(closed.len(), 5);
        assert_eq!(closed.first(), closed.last());
    }

    #[test]
    fn midpoint_before_interior() {
        let ring = CoordinateRing::from_closed(&square_closed()).unwrap();
        let m = ring.midpoint_before(1);
        assert_relative_eq!(m.x, 5.0);
        assert_relative_eq!(m.y, 0.0);
    }

    #[test]
    fn midpoint_before_wraps_to_last() {
        let ring = CoordinateRing::from_closed(&square_closed()).unwrap();
        let m = ring.midpoint_before(0);
        assert_relative_eq!(m.x, 0.0);
        assert_relative_eq!(m.y, 5.0);
    }

    #[test]
    fn translate_shifts_all_vertices() {
        let mut ring = CoordinateRing::from_closed(&square_closed()).unwrap();
        ring.translate(Vector2::new(2.0, -1.0));
        assert!((ring.point(0).unwrap().x - 2.0).abs() < TOLERANCE);
        assert!((ring.point(2).unwrap().y - 9.0).abs() < TOLERANCE);
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn index_of_exact_match() {
        let ring = CoordinateRing::from_closed(&square_closed()).unwrap();
        assert_eq!(ring.index_of(Point2::new(10.0, 10.0)), Some(2));
        assert_eq!(ring.index_of(Point2::new(5.0, 5.0)), None);
    }
}
