// Floating point comparisons, parallel-ray detection and surface offsets
pub const EPSILON: f64 = 0.00001;

// Maximum recursion depth for reflected and refracted rays
pub const RECURSION_DEPTH: usize = 5;

// Render defaults for the command line driver
pub const DEFAULT_THREADS: usize = 4;
pub const DEFAULT_OUT_FILE: &str = "./out.ppm";

// Refractive index of the glass sphere
pub const GLASS_RI: f64 = 1.5;
