// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Numeric element types accepted by the arithmetic primitives.

/// A numeric buffer element.
///
/// Integer arithmetic saturates at the type's bounds. Integer powers are
/// computed in `f64` and converted back with Rust's saturating `as`
/// semantics.
pub trait Element: Copy {
    /// `self + rhs`, clamped for integers.
    fn add(self, rhs: Self) -> Self;

    /// `self * rhs`, clamped for integers.
    fn mul(self, rhs: Self) -> Self;

    /// Raises `self` to the power `exp`.
    fn powf(self, exp: f64) -> Self;
}

macro_rules! impl_float_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                fn add(self, rhs: Self) -> Self {
                    self + rhs
                }

                fn mul(self, rhs: Self) -> Self {
                    self * rhs
                }

                fn powf(self, exp: f64) -> Self {
                    (self as f64).powf(exp) as $t
                }
            }
        )*
    };
}

impl_float_element!(f32, f64);

macro_rules! impl_integer_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                fn add(self, rhs: Self) -> Self {
                    self.saturating_add(rhs)
                }

                fn mul(self, rhs: Self) -> Self {
                    self.saturating_mul(rhs)
                }

                fn powf(self, exp: f64) -> Self {
                    (self as f64).powf(exp) as $t
                }
            }
        )*
    };
}

impl_integer_element!(i8, u8, i16, u16, i32, u32, i64);
