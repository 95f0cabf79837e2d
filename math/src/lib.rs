pub mod aabb;
pub mod line;
pub mod predicates;

pub use cgmath::prelude;
pub use cgmath::{vec2, BaseFloat, Point2, Point3, Vector2};

pub use self::aabb::Aabb2;
pub use self::line::{Line2, Line2d};

pub type Pnt2f = Point2<f32>;
pub type Pnt3f = Point3<f32>;
pub type Vec2f = Vector2<f32>;

pub type Pnt2d = Point2<f64>;
pub type Vec2d = Vector2<f64>;
