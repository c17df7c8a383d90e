// Core value types with no engine or game dependencies

pub mod geom;

pub use geom::{Aabb, Rect};
