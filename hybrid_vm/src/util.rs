/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

/// Rounds `num` up to the next multiple of `multiple`.
///
/// Returns `None` if the result does not fit into an `u64`.
#[inline]
pub(crate) const fn round_up_to_nearest(num: u64, multiple: u64) -> Option<u64> {
    match num.checked_add(multiple - 1) {
        Some(sum) => Some((sum / multiple) * multiple),
        None => None,
    }
}

/// efficient way to calculate: ceil(x / y)
#[inline]
pub(crate) const fn div_ceil(num: u64, div: u64) -> u64 {
    num / div + (num % div != 0) as u64
}
