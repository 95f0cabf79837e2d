use super::prelude::*;
use super::{BaseFloat, Point2, Vector2};
use num_traits::Zero;

pub type Line2d = Line2<f64>;

/// A line through `origin` along `displace`. The displacement is kept unnormalised so that
/// side tests on integer-valued map data stay exact.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Line2<S: BaseFloat> {
    pub origin: Point2<S>,
    pub displace: Vector2<S>,
}

impl<S: BaseFloat> Line2<S> {
    pub fn from_origin_and_displace(origin: Point2<S>, displace: Vector2<S>) -> Self {
        Line2 { origin, displace }
    }

    pub fn from_two_points(origin: Point2<S>, towards: Point2<S>) -> Self {
        Self::from_origin_and_displace(origin, towards - origin)
    }

    pub fn is_degenerate(&self) -> bool {
        self.displace.x.is_zero() && self.displace.y.is_zero()
    }

    /// Positive left of the line, negative right of it and zero on it, scaled by the length of
    /// `displace`.
    #[inline]
    pub fn side_value(&self, point: Point2<S>) -> S {
        self.displace.perp_dot(point - self.origin)
    }

    pub fn signed_distance(&self, point: Point2<S>) -> S {
        let length = self.displace.magnitude();
        if length.is_zero() {
            S::zero()
        } else {
            self.side_value(point) / length
        }
    }
}

#[cfg(test)]
mod test {
    use super::Line2d;
    use crate::{vec2, Pnt2d};

    #[test]
    fn side_value_sign() {
        let line = Line2d::from_two_points(Pnt2d::new(0.0, 0.0), Pnt2d::new(4.0, 0.0));
        assert!(line.side_value(Pnt2d::new(1.0, 1.0)) > 0.0);
        assert!(line.side_value(Pnt2d::new(1.0, -1.0)) < 0.0);
        assert_eq!(line.side_value(Pnt2d::new(7.0, 0.0)), 0.0);
        assert_eq!(line.signed_distance(Pnt2d::new(2.0, 3.0)), 3.0);
    }

    #[test]
    fn degenerate_lines() {
        let point = Line2d::from_origin_and_displace(Pnt2d::new(3.0, 3.0), vec2(0.0, 0.0));
        assert!(point.is_degenerate());
        assert_eq!(point.signed_distance(Pnt2d::new(5.0, 1.0)), 0.0);
        assert!(!Line2d::from_two_points(Pnt2d::new(0.0, 0.0), Pnt2d::new(0.0, 1.0)).is_degenerate());
    }
}
