//! Shrink functions: pure proposals of simpler candidates for a value.
//!
//! Every function here returns a closure `&T -> Shrinks<T>`. The candidates
//! never include the input itself and never repeat.

use std::collections::HashSet;
use std::hash::Hash;
use std::iter;
use std::rc::Rc;

/// A lazy sequence of shrink candidates.
pub type Shrinks<T> = Box<dyn Iterator<Item = T>>;

/// Propose nothing.
pub fn none<T: 'static>() -> impl Fn(&T) -> Shrinks<T> + Clone {
    |_| Box::new(iter::empty())
}

/// Approach `target` from the value by halving the remaining difference.
///
/// `towards(0)` applied to 10 yields `0, 5, 8, 9`: the target first, then
/// ever closer values.
pub fn towards(target: i128) -> impl Fn(&i128) -> Shrinks<i128> + Clone {
    move |&value| {
        if value == target {
            return Box::new(iter::empty());
        }

        // Candidates lie between target and value, so the offset from the
        // target always fits even when the full difference does not.
        let distance = value.abs_diff(target);
        let halves = iter::successors(Some(distance), |d| {
            let half = d / 2;
            (half != 0).then_some(half)
        });
        Box::new(halves.map(move |half| {
            let offset = distance - half;
            if value > target {
                target.wrapping_add_unsigned(offset)
            } else {
                target.wrapping_sub_unsigned(offset)
            }
        }))
    }
}

/// Split a list into two near-equal halves, each at least `min_length` long.
pub fn bisect<T: Clone + 'static>(min_length: usize) -> impl Fn(&Vec<T>) -> Shrinks<Vec<T>> + Clone {
    move |items| {
        let len = items.len();
        if len < 2 || min_length >= len || len <= min_length * 2 {
            return Box::new(iter::empty());
        }

        let middle = len / 2;
        Box::new(vec![items[..middle].to_vec(), items[middle..].to_vec()].into_iter())
    }
}

/// Remove each element in turn, while staying at least `min_length` long.
///
/// Runs of equal elements only produce one candidate.
pub fn drop_one<T>(min_length: usize) -> impl Fn(&Vec<T>) -> Shrinks<Vec<T>> + Clone
where
    T: Clone + PartialEq + 'static,
{
    move |items| {
        if items.len() <= min_length {
            return Box::new(iter::empty());
        }

        let items = Rc::new(items.clone());
        let source = items.clone();
        Box::new(
            (0..items.len())
                .filter(move |&index| index == 0 || items[index] != items[index - 1])
                .map(move |index| {
                    let mut candidate = (*source).clone();
                    candidate.remove(index);
                    candidate
                }),
        )
    }
}

/// Propose the list stably sorted by `key`, unless it already is.
pub fn order<T, K, F>(key: F) -> impl Fn(&Vec<T>) -> Shrinks<Vec<T>> + Clone
where
    T: Clone + 'static,
    K: Ord,
    F: Fn(&T) -> K + Clone + 'static,
{
    move |items| {
        if items.windows(2).all(|pair| key(&pair[0]) <= key(&pair[1])) {
            return Box::new(iter::empty());
        }

        let mut sorted = items.clone();
        sorted.sort_by_key(|item| key(item));
        Box::new(iter::once(sorted))
    }
}

/// Every combination of `k` elements, in lexicographic index order.
pub fn other_combinations<T: Clone + 'static>(
    k: usize,
) -> impl Fn(&Vec<T>) -> Shrinks<Vec<T>> + Clone {
    move |items| {
        if k >= items.len() {
            return Box::new(iter::empty());
        }

        Box::new(Combinations {
            items: items.clone(),
            indices: Some((0..k).collect()),
        })
    }
}

/// Reduce a list towards exactly `k` elements.
///
/// Candidate counts come from [`towards`] on the length, so the smallest
/// collections are proposed first. Candidates whose elements have the same
/// keys as an earlier candidate are skipped.
pub fn towards_count<T, K, F>(k: usize, key: F) -> impl Fn(&Vec<T>) -> Shrinks<Vec<T>> + Clone
where
    T: Clone + 'static,
    K: Eq + Hash + 'static,
    F: Fn(&T) -> K + Clone + 'static,
{
    move |items| {
        if items.len() <= k {
            return Box::new(iter::empty());
        }

        let counts = towards(k as i128)(&(items.len() as i128));
        let items = items.clone();
        let key = key.clone();
        let mut seen = HashSet::new();
        Box::new(
            counts
                .flat_map(move |count| other_combinations(count as usize)(&items))
                .filter(move |candidate| seen.insert(candidate.iter().map(&key).collect::<Vec<K>>())),
        )
    }
}

/// Offer the candidates of `first`, then those of `second`.
pub fn concat<T, A, B>(first: A, second: B) -> impl Fn(&T) -> Shrinks<T> + Clone
where
    T: 'static,
    A: Fn(&T) -> Shrinks<T> + Clone + 'static,
    B: Fn(&T) -> Shrinks<T> + Clone + 'static,
{
    move |value| Box::new(first(value).chain(second(value)))
}

struct Combinations<T> {
    items: Vec<T>,
    indices: Option<Vec<usize>>,
}

impl<T: Clone> Iterator for Combinations<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.items.len();
        let indices = self.indices.as_mut()?;
        let combination = indices.iter().map(|&i| self.items[i].clone()).collect();

        let k = indices.len();
        let pivot = (0..k).rev().find(|&i| indices[i] < n - k + i);
        match pivot {
            Some(i) => {
                indices[i] += 1;
                for j in i + 1..k {
                    indices[j] = indices[j - 1] + 1;
                }
            }
            None => self.indices = None,
        }

        Some(combination)
    }
}
