pub const EPS: f64 = 1e-8;

pub const ITER_WIDTH: usize = 9;
