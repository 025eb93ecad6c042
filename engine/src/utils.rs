// Copyright (C) 2020 Kevin Del Castillo Ramírez
//
// This file is part of movie-ratings.
//
// movie-ratings is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// movie-ratings is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with movie-ratings.  If not, see <http://www.gnu.org/licenses/>.

use std::collections::{hash_map::Iter as MapIter, HashMap};
use std::hash::Hash;

// The shortest map drives the iteration, so an empty one ends it right away.
// Values are always yielded as (value in a, value in b), whichever map is
// iterated.
pub fn common_keys_iter<'a, K, V>(
    a: &'a HashMap<K, V>,
    b: &'a HashMap<K, V>,
) -> CommonKeyIterator<'a, K, V>
where
    K: Hash + Eq,
{
    let swapped = a.len() > b.len();
    let (shortest, longest) = if swapped { (b, a) } else { (a, b) };

    CommonKeyIterator {
        shortest: shortest.iter(),
        longest,
        swapped,
    }
}

#[derive(Debug)]
pub struct CommonKeyIterator<'a, K, V>
where
    K: Hash + Eq,
{
    shortest: MapIter<'a, K, V>,
    longest: &'a HashMap<K, V>,
    swapped: bool,
}

impl<'a, K, V> Iterator for CommonKeyIterator<'a, K, V>
where
    K: Hash + Eq,
{
    type Item = (&'a K, (&'a V, &'a V));

    fn next(&mut self) -> Option<Self::Item> {
        let mut short_val = self.shortest.next()?;

        loop {
            if let Some(long_val) = self.longest.get(short_val.0) {
                let values = if self.swapped {
                    (long_val, short_val.1)
                } else {
                    (short_val.1, long_val)
                };

                break Some((short_val.0, values));
            } else {
                short_val = self.shortest.next()?;
            }
        }
    }
}
