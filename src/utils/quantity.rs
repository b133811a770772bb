//! Explicitly-invalid numeric values
//!
//! Seed and area tables have holes: missing germination rates, zero seed
//! weights, regions without area data. None of these may abort a run, so every
//! derived number is a `Quantity` that is either a finite float or invalid.
//! Arithmetic on an invalid operand, or arithmetic that would produce NaN or
//! infinity (division by zero included), yields invalid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Option<f64>);

impl Quantity {
    pub const INVALID: Quantity = Quantity(None);
    pub const ZERO: Quantity = Quantity(Some(0.0));

    /// Wrap a float; NaN and infinities become invalid
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Quantity(Some(value))
        } else {
            Quantity(None)
        }
    }

    pub fn value(self) -> Option<f64> {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0.is_some()
    }

    /// Value if valid and strictly positive
    pub fn positive(self) -> Option<f64> {
        self.0.filter(|v| *v > 0.0)
    }

    /// Replace an invalid value with `fallback`
    pub fn or(self, fallback: f64) -> Quantity {
        match self.0 {
            Some(_) => self,
            None => Quantity::new(fallback),
        }
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Quantity {
        match self.0 {
            Some(v) => Quantity::new(f(v)),
            None => Quantity::INVALID,
        }
    }

    /// Sum of the valid values, skipping invalid ones.
    ///
    /// An empty or all-invalid input sums to zero, the same way a
    /// skip-missing column sum behaves.
    pub fn sum_valid<I>(values: I) -> Quantity
    where
        I: IntoIterator<Item = Quantity>,
    {
        Quantity::new(values.into_iter().filter_map(Quantity::value).sum())
    }
}

impl From<f64> for Quantity {
    fn from(value: f64) -> Self {
        Quantity::new(value)
    }
}

impl From<Option<f64>> for Quantity {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Quantity::INVALID, Quantity::new)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{}", v),
            None => write!(f, "invalid"),
        }
    }
}

macro_rules! quantity_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Quantity {
            type Output = Quantity;

            fn $method(self, rhs: Quantity) -> Quantity {
                match (self.0, rhs.0) {
                    (Some(a), Some(b)) => Quantity::new(a $op b),
                    _ => Quantity::INVALID,
                }
            }
        }

        impl $trait<f64> for Quantity {
            type Output = Quantity;

            fn $method(self, rhs: f64) -> Quantity {
                self $op Quantity::new(rhs)
            }
        }
    };
}

quantity_binop!(Add, add, +);
quantity_binop!(Sub, sub, -);
quantity_binop!(Mul, mul, *);
quantity_binop!(Div, div, /);
