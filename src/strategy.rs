//! Catalog of solver search strategies compared by the benchmark
//!
//! The catalog is closed: every strategy is a variant of [`Strategy`] with a
//! stable display name (also used as its output folder) and the oracle
//! configuration it stands for. Names are resolved once at startup through
//! [`StrategySelection::parse`].

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// A named solver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    /// Solver default search with Luby restarts
    DefaultRestart,
    /// First-fail variable selection over the move variables
    MovesFirstFail,
    /// Weighted-degree variable selection over the move variables
    MovesDomWdeg,
}

impl Strategy {
    /// Every strategy, in catalog order
    pub const ALL: [Strategy; 3] = [
        Strategy::DefaultRestart,
        Strategy::MovesFirstFail,
        Strategy::MovesDomWdeg,
    ];

    /// Stable display and folder name
    pub fn name(self) -> &'static str {
        match self {
            Strategy::DefaultRestart => "1_Default_Restart",
            Strategy::MovesFirstFail => "2_Moves_FirstFail",
            Strategy::MovesDomWdeg => "3_Moves_DomWdeg",
        }
    }

    /// Short kebab-case alias accepted on the command line
    pub fn alias(self) -> &'static str {
        match self {
            Strategy::DefaultRestart => "default-restart",
            Strategy::MovesFirstFail => "moves-first-fail",
            Strategy::MovesDomWdeg => "moves-dom-wdeg",
        }
    }

    /// MiniZinc solve item substituted into the model template
    pub fn solve_item(self) -> &'static str {
        match self {
            Strategy::DefaultRestart => "solve :: restart_luby(250) satisfy;",
            Strategy::MovesFirstFail => {
                "solve :: restart_luby(250) :: int_search(all_moves, first_fail, indomain_random, complete) satisfy;"
            }
            Strategy::MovesDomWdeg => {
                "solve :: restart_luby(250) :: int_search(all_moves, dom_w_deg, indomain_random, complete) satisfy;"
            }
        }
    }

    /// Z3 solver parameters used by the SMT backend.
    ///
    /// Z3 has no variable-selection annotations, so strategies differ by seed.
    pub fn smt_params(self) -> &'static [(&'static str, u32)] {
        match self {
            Strategy::DefaultRestart => &[("random_seed", 0)],
            Strategy::MovesFirstFail => &[("random_seed", 17)],
            Strategy::MovesDomWdeg => &[("random_seed", 42)],
        }
    }

    /// One-line description for `list-strategies`
    pub fn description(self) -> &'static str {
        match self {
            Strategy::DefaultRestart => "solver default search, Luby restarts (scale 250)",
            Strategy::MovesFirstFail => {
                "first_fail / indomain_random over all moves, Luby restarts"
            }
            Strategy::MovesDomWdeg => "dom_w_deg / indomain_random over all moves, Luby restarts",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Strategy::ALL
            .into_iter()
            .find(|strategy| {
                strategy.name().eq_ignore_ascii_case(wanted)
                    || strategy.alias().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| ConfigError::UnknownStrategy {
                name: wanted.to_string(),
                valid: Strategy::ALL
                    .iter()
                    .map(|s| s.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Ordered, duplicate-free, non-empty list of strategies to benchmark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategySelection {
    strategies: Vec<Strategy>,
}

impl StrategySelection {
    /// Every strategy in the catalog
    pub fn all() -> Self {
        Self {
            strategies: Strategy::ALL.to_vec(),
        }
    }

    /// Build from already-resolved strategies, dropping repeats
    pub fn from_strategies(strategies: impl IntoIterator<Item = Strategy>) -> Result<Self, ConfigError> {
        let mut selected: Vec<Strategy> = Vec::new();
        for strategy in strategies {
            if !selected.contains(&strategy) {
                selected.push(strategy);
            }
        }
        if selected.is_empty() {
            return Err(ConfigError::NoStrategies);
        }
        Ok(Self {
            strategies: selected,
        })
    }

    /// Resolve user-supplied names.
    ///
    /// Each entry may hold several comma-separated names; `all` expands to the
    /// whole catalog at that point in the order.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, ConfigError> {
        let mut resolved = Vec::new();
        for entry in names {
            for name in entry.as_ref().split(',').map(str::trim) {
                if name.is_empty() {
                    continue;
                }
                if name.eq_ignore_ascii_case("all") {
                    resolved.extend(Strategy::ALL);
                } else {
                    resolved.push(name.parse::<Strategy>()?);
                }
            }
        }
        Self::from_strategies(resolved)
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Never true; construction rejects empty selections
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
