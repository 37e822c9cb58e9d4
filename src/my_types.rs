use nalgebra as na; 

pub type Vector2d = na::Vector2::<f64>;

pub type Matrixd = na::DMatrix::<f64>;

/// Identity handed out by the tracker, never reused
pub type ObjectId = usize;
