//! Permutations of `1..=N` and the swap-count lower bound
//!
//! A [`Permutation`] stores the value found at each position using the
//! 1-based convention of the benchmark files: value `v` belongs at position
//! `v`. Construction validates the bijection, after which the permutation is
//! immutable.

pub mod bound;

pub use bound::{LowerBound, lower_bound};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when a value list is not a permutation of `1..=N`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermutationError {
    #[error("permutation must contain at least one value")]
    Empty,
    #[error("value {value} at position {position} is outside 1..={size}")]
    OutOfRange {
        position: usize,
        value: usize,
        size: usize,
    },
    #[error("value {value} appears more than once")]
    Duplicate { value: usize },
    #[error("cannot parse '{0}' as a permutation value")]
    Parse(String),
}

/// A single exchange of two positions (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transposition {
    pub i: usize,
    pub j: usize,
}

impl Transposition {
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }
}

impl fmt::Display for Transposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "swap {} {}", self.i, self.j)
    }
}

/// A bijection from positions `1..=N` to values `1..=N`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Permutation {
    values: Vec<usize>,
}

impl Permutation {
    /// Build a permutation, checking that every value in `1..=N` occurs once
    pub fn new(values: Vec<usize>) -> Result<Self, PermutationError> {
        let size = values.len();
        if size == 0 {
            return Err(PermutationError::Empty);
        }

        let mut seen = vec![false; size];
        for (idx, &value) in values.iter().enumerate() {
            if value == 0 || value > size {
                return Err(PermutationError::OutOfRange {
                    position: idx + 1,
                    value,
                    size,
                });
            }
            if std::mem::replace(&mut seen[value - 1], true) {
                return Err(PermutationError::Duplicate { value });
            }
        }

        Ok(Self { values })
    }

    /// The sorted permutation `[1, 2, ..., n]`
    #[allow(dead_code)]
    pub fn identity(size: usize) -> Self {
        Self {
            values: (1..=size).collect(),
        }
    }

    /// Number of positions
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a validated permutation
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[usize] {
        &self.values
    }

    pub fn is_sorted(&self) -> bool {
        self.values.iter().enumerate().all(|(idx, &v)| v == idx + 1)
    }

    /// Apply a sequence of position swaps, returning the resulting arrangement.
    ///
    /// Swaps referring to positions outside `1..=N` are rejected.
    pub fn apply_swaps(&self, swaps: &[Transposition]) -> Option<Permutation> {
        let mut values = self.values.clone();
        for swap in swaps {
            if swap.i == 0 || swap.j == 0 || swap.i > values.len() || swap.j > values.len() {
                return None;
            }
            values.swap(swap.i - 1, swap.j - 1);
        }
        Some(Permutation { values })
    }

    /// True when applying `swaps` in order yields the identity
    pub fn sorted_by(&self, swaps: &[Transposition]) -> bool {
        self.apply_swaps(swaps).is_some_and(|p| p.is_sorted())
    }

    /// MiniZinc array literal, e.g. `[2,3,1]`
    pub fn to_array_literal(&self) -> String {
        let items: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        format!("[{}]", items.join(","))
    }
}

impl TryFrom<Vec<usize>> for Permutation {
    type Error = PermutationError;

    fn try_from(values: Vec<usize>) -> Result<Self, Self::Error> {
        Permutation::new(values)
    }
}

impl From<Permutation> for Vec<usize> {
    fn from(p: Permutation) -> Self {
        p.values
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, v) in self.values.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "]")
    }
}

impl FromStr for Permutation {
    type Err = PermutationError;

    /// Accepts `2,3,1`, `[2, 3, 1]` or whitespace separated values
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('[').trim_end_matches(']');
        let values = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|tok| !tok.is_empty())
            .map(|tok| {
                tok.parse::<usize>()
                    .map_err(|_| PermutationError::Parse(tok.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Permutation::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_bijection() {
        let p = Permutation::new(vec![2, 3, 1]).unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(p.values()[0], 2);
        assert!(!p.is_sorted());
    }

    #[test]
    fn test_new_rejects_invalid() {
        assert_eq!(Permutation::new(vec![]), Err(PermutationError::Empty));
        assert_eq!(
            Permutation::new(vec![1, 4, 2]),
            Err(PermutationError::OutOfRange {
                position: 2,
                value: 4,
                size: 3
            })
        );
        assert_eq!(
            Permutation::new(vec![0, 1]).unwrap_err(),
            PermutationError::OutOfRange {
                position: 1,
                value: 0,
                size: 2
            }
        );
        assert_eq!(
            Permutation::new(vec![1, 1, 3]),
            Err(PermutationError::Duplicate { value: 1 })
        );
    }

    #[test]
    fn test_parse_formats() {
        let expected = Permutation::new(vec![2, 3, 1]).unwrap();
        assert_eq!("2,3,1".parse::<Permutation>().unwrap(), expected);
        assert_eq!("[2, 3, 1]".parse::<Permutation>().unwrap(), expected);
        assert_eq!("2 3 1".parse::<Permutation>().unwrap(), expected);
        assert!(matches!(
            "2,x,1".parse::<Permutation>(),
            Err(PermutationError::Parse(_))
        ));
    }

    #[test]
    fn test_display_and_literal() {
        let p = Permutation::new(vec![2, 3, 1]).unwrap();
        assert_eq!(p.to_string(), "[2, 3, 1]");
        assert_eq!(p.to_array_literal(), "[2,3,1]");
    }

    #[test]
    fn test_apply_swaps() {
        let p = Permutation::new(vec![2, 3, 1, 5, 4]).unwrap();
        let plan = [
            Transposition::new(1, 3),
            Transposition::new(2, 3),
            Transposition::new(4, 5),
        ];
        assert!(p.sorted_by(&plan));
        assert!(!p.sorted_by(&plan[..2]));
        assert!(p.apply_swaps(&[Transposition::new(1, 6)]).is_none());
    }

    #[test]
    fn test_serde_validates() {
        #[derive(Deserialize)]
        struct Holder {
            p: Permutation,
        }
        let ok: Holder = toml::from_str("p = [3, 1, 2]").unwrap();
        assert_eq!(ok.p.values(), &[3, 1, 2]);
        assert!(toml::from_str::<Holder>("p = [3, 3, 2]").is_err());
    }
}
