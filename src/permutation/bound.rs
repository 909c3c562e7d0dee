//! Lower bound on the number of swaps needed to sort a permutation
//!
//! Decomposing a permutation into disjoint cycles gives the group-theoretic
//! minimum `N - cycles` transpositions. That value is then corrected so its
//! parity matches the inversion parity of the input.

use super::Permutation;

/// Breakdown of a lower-bound computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LowerBound {
    /// Permutation size
    pub size: usize,
    /// Number of disjoint cycles (fixed points included)
    pub cycles: usize,
    /// Number of inverted pairs
    pub inversions: u64,
    /// `size - cycles`, before parity correction
    pub raw: usize,
    /// Parity-corrected bound
    pub k_min: usize,
}

impl LowerBound {
    pub fn compute(perm: &Permutation) -> Self {
        let size = perm.len();
        let cycles = cycle_count(perm);
        let inversions = count_inversions(perm);
        let raw = size - cycles;

        let mut k_min = raw;
        if (raw as u64) % 2 != inversions % 2 {
            k_min += 1;
        }

        Self {
            size,
            cycles,
            inversions,
            raw,
            k_min,
        }
    }

    /// True when the correction step bumped the raw bound
    pub fn parity_adjusted(&self) -> bool {
        self.k_min != self.raw
    }
}

/// Parity-corrected minimum swap count for `perm`
pub fn lower_bound(perm: &Permutation) -> usize {
    LowerBound::compute(perm).k_min
}

/// Disjoint cycles of `perm`, as lists of 1-based positions in traversal order
pub fn cycles(perm: &Permutation) -> Vec<Vec<usize>> {
    let values = perm.values();
    let mut visited = vec![false; values.len()];
    let mut result = Vec::new();

    for start in 0..values.len() {
        if visited[start] {
            continue;
        }
        let mut cycle = Vec::new();
        let mut pos = start;
        while !visited[pos] {
            visited[pos] = true;
            cycle.push(pos + 1);
            pos = values[pos] - 1;
        }
        result.push(cycle);
    }

    result
}

/// Number of disjoint cycles, fixed points included
pub fn cycle_count(perm: &Permutation) -> usize {
    let values = perm.values();
    let mut visited = vec![false; values.len()];
    let mut count = 0;

    for start in 0..values.len() {
        if visited[start] {
            continue;
        }
        count += 1;
        let mut pos = start;
        while !visited[pos] {
            visited[pos] = true;
            pos = values[pos] - 1;
        }
    }

    count
}

/// Count pairs `i < j` with `p[i] > p[j]` in O(N log N) via merge sort
pub fn count_inversions(perm: &Permutation) -> u64 {
    let mut values = perm.values().to_vec();
    let mut scratch = vec![0; values.len()];
    merge_count(&mut values, &mut scratch)
}

fn merge_count(values: &mut [usize], scratch: &mut [usize]) -> u64 {
    let len = values.len();
    if len < 2 {
        return 0;
    }

    let mid = len / 2;
    let mut inversions = {
        let (left, right) = values.split_at_mut(mid);
        let (left_scratch, right_scratch) = scratch.split_at_mut(mid);
        merge_count(left, left_scratch) + merge_count(right, right_scratch)
    };

    let (mut i, mut j, mut out) = (0, mid, 0);
    while i < mid && j < len {
        if values[i] <= values[j] {
            scratch[out] = values[i];
            i += 1;
        } else {
            // every remaining element of the left half is greater than values[j]
            inversions += (mid - i) as u64;
            scratch[out] = values[j];
            j += 1;
        }
        out += 1;
    }
    scratch[out..out + (mid - i)].copy_from_slice(&values[i..mid]);
    out += mid - i;
    scratch[out..out + (len - j)].copy_from_slice(&values[j..len]);

    values.copy_from_slice(&scratch[..len]);
    inversions
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::seq::SliceRandom;
    use rand_chacha::ChaCha8Rng;

    fn perm(values: &[usize]) -> Permutation {
        Permutation::new(values.to_vec()).unwrap()
    }

    fn brute_force_inversions(p: &Permutation) -> u64 {
        let v = p.values();
        let mut count = 0;
        for i in 0..v.len() {
            for j in i + 1..v.len() {
                if v[i] > v[j] {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn test_identity_bound_is_zero() {
        for n in 1..=12 {
            assert_eq!(lower_bound(&Permutation::identity(n)), 0);
        }
    }

    #[test]
    fn test_single_element() {
        let bound = LowerBound::compute(&perm(&[1]));
        assert_eq!(bound.cycles, 1);
        assert_eq!(bound.k_min, 0);
    }

    #[test]
    fn test_two_cycle() {
        assert_eq!(lower_bound(&perm(&[2, 1])), 1);
    }

    #[test]
    fn test_mixed_cycles() {
        let p = perm(&[2, 3, 1, 5, 4]);
        assert_eq!(cycles(&p), vec![vec![1, 2, 3], vec![4, 5]]);

        let bound = LowerBound::compute(&p);
        assert_eq!(bound.cycles, 2);
        assert_eq!(bound.raw, 3);
        assert_eq!(bound.inversions, 3);
        assert_eq!(bound.k_min, 3);
        assert!(!bound.parity_adjusted());
    }

    #[test]
    fn test_fixed_points_count_as_cycles() {
        let p = perm(&[1, 3, 2, 4]);
        assert_eq!(cycle_count(&p), 3);
        assert_eq!(lower_bound(&p), 1);
    }

    #[test]
    fn test_inversions_match_brute_force() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for n in 1..=40 {
            let mut values: Vec<usize> = (1..=n).collect();
            values.shuffle(&mut rng);
            let p = perm(&values);
            assert_eq!(count_inversions(&p), brute_force_inversions(&p), "n={}", n);
        }
    }

    #[test]
    fn test_bound_range_and_parity() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for n in 1..=30 {
            for _ in 0..20 {
                let mut values: Vec<usize> = (1..=n).collect();
                values.shuffle(&mut rng);
                let p = perm(&values);
                let bound = LowerBound::compute(&p);

                assert!(bound.k_min <= n);
                assert_eq!(bound.raw, n - cycle_count(&p));
                assert_eq!(bound.k_min % 2, bound.raw % 2);
                assert_eq!(bound.k_min as u64 % 2, bound.inversions % 2);
            }
        }
    }

    #[test]
    fn test_reversed_permutation() {
        // [5,4,3,2,1]: cycles (1 5)(2 4)(3) -> raw 2, 10 inversions
        let bound = LowerBound::compute(&perm(&[5, 4, 3, 2, 1]));
        assert_eq!(bound.cycles, 3);
        assert_eq!(bound.inversions, 10);
        assert_eq!(bound.k_min, 2);
    }
}
