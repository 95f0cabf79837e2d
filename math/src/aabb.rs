use super::Pnt2d;

/// Axis-aligned box in map units. Bounds are inclusive.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: Pnt2d,
    pub max: Pnt2d,
}

impl Aabb2 {
    pub fn from_extents(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Aabb2 {
            min: Pnt2d::new(x_min.min(x_max), y_min.min(y_max)),
            max: Pnt2d::new(x_min.max(x_max), y_min.max(y_max)),
        }
    }

    /// Squared distance from `point` to the closest point of the box, zero inside.
    pub fn squared_distance_to(&self, point: Pnt2d) -> f64 {
        let dx = (self.min.x - point.x).max(0.0).max(point.x - self.max.x);
        let dy = (self.min.y - point.y).max(0.0).max(point.y - self.max.y);
        dx * dx + dy * dy
    }
}
