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

use static_assertions::assert_eq_size;

const REFERENCED: u8 = 1 << 0;
const DIRTY: u8 = 1 << 1;

/*
The bit usage is as follows:
|Bit|Usage|
0    Referenced (set on every access, cleared by the clock reclaim hand)
1    Dirty (set on write accesses, metadata only as there is no backing store)
2-7  [Unused]
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageEntryStatus {
    bit_list: u8,
}

assert_eq_size!(PageEntryStatus, u8);

macro_rules! generate_functions {
    ($bit: ident, $get_name: ident, $set_name: ident) => {
        #[inline]
        pub fn $get_name(&self) -> bool {
            self.is_set($bit)
        }

        #[inline]
        pub fn $set_name(&mut self, val: bool) {
            self.set($bit, val);
        }
    };
}

impl PageEntryStatus {
    /// Status of a page that was just faulted in and not yet accessed
    pub(crate) const fn new_clean() -> PageEntryStatus {
        PageEntryStatus { bit_list: 0 }
    }

    #[inline]
    fn is_set(&self, bitmask: u8) -> bool {
        (self.bit_list & bitmask) != 0
    }

    #[inline]
    fn set(&mut self, bitmask: u8, state: bool) {
        if state {
            // set
            self.bit_list |= bitmask;
        } else {
            // unset
            self.bit_list &= !bitmask;
        }
    }

    generate_functions!(REFERENCED, is_referenced, set_referenced);
    generate_functions!(DIRTY, is_dirty, set_dirty);
}

impl Default for PageEntryStatus {
    fn default() -> Self {
        Self::new_clean()
    }
}
