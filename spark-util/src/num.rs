// Copyright 2019-2022 Manta Network.
// This file is part of spark-rs.
//
// spark-rs is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// spark-rs is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with spark-rs.  If not, see <http://www.gnu.org/licenses/>.

//! Numeric Utilities

/// Writes the base-`base` digits of `value` into `digits`, least significant digit first.
///
/// Returns `false` if `value` does not fit into `digits.len()` digits or if `base < 2`.
#[inline]
pub fn base_digits(mut value: usize, base: usize, digits: &mut [usize]) -> bool {
    if base < 2 {
        return false;
    }
    for digit in digits.iter_mut() {
        *digit = value % base;
        value /= base;
    }
    value == 0
}

/// Returns `base^exponent` or `None` on overflow.
#[inline]
pub fn checked_pow(base: usize, exponent: usize) -> Option<usize> {
    let exponent = u32::try_from(exponent).ok()?;
    base.checked_pow(exponent)
}
