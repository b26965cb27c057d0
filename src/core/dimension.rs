//! Seven-axis SI dimension vector
//!
//! Axis order is fixed: `[m, kg, s, A, K, mol, cd]`, matching the registry in
//! `crate::registry::UNITS`.

use serde::{Deserialize, Serialize};

pub const AXIS_COUNT: usize = 7;
pub const AXIS_NAMES: [&str; AXIS_COUNT] = ["m", "kg", "s", "A", "K", "mol", "cd"];

/// Seven signed integer exponents over the base SI units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dim(pub [i32; AXIS_COUNT]);

impl Dim {
    pub const DIMENSIONLESS: Dim = Dim([0; AXIS_COUNT]);

    pub fn base(axis: usize) -> Dim {
        let mut d = [0; AXIS_COUNT];
        d[axis] = 1;
        Dim(d)
    }

    pub fn is_dimensionless(&self) -> bool {
        self.0.iter().all(|&e| e == 0)
    }

    pub fn add(&self, other: &Dim) -> Dim {
        let mut out = [0; AXIS_COUNT];
        for i in 0..AXIS_COUNT {
            out[i] = self.0[i] + other.0[i];
        }
        Dim(out)
    }

    pub fn sub(&self, other: &Dim) -> Dim {
        let mut out = [0; AXIS_COUNT];
        for i in 0..AXIS_COUNT {
            out[i] = self.0[i] - other.0[i];
        }
        Dim(out)
    }

    pub fn scale(&self, factor: i32) -> Dim {
        let mut out = [0; AXIS_COUNT];
        for i in 0..AXIS_COUNT {
            out[i] = self.0[i] * factor;
        }
        Dim(out)
    }

    pub fn neg(&self) -> Dim {
        self.scale(-1)
    }
}
