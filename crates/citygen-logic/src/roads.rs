//! The road grammar engine.
//!
//! Roads grow through an L-system-like process: ephemeral builder agents
//! walk the grid applying production rules, joining tiles into road edges
//! and spawning child builders at branch points. Each growth round every
//! active builder draws one rule by weighted choice, applies it, and is
//! replaced wholesale by the children it produced.

use rand::Rng;

use crate::config::ConfigError;
use crate::grid::{Direction, TileGrid};
use crate::weighted::WeightedTable;

/// One symbol of a production rule.
///
/// Direction symbols are interpreted against the builder's fixed anchor
/// heading, not the cursor's accumulated heading. `Spawn` creates a child
/// builder at the cursor's current tile and heading and terminates the
/// remainder of its walk segment; sibling segments still run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSymbol {
    Forward,
    Left,
    Right,
    Back,
    Spawn,
}

impl RuleSymbol {
    fn from_char(c: char) -> Option<RuleSymbol> {
        match c {
            'f' => Some(RuleSymbol::Forward),
            'l' => Some(RuleSymbol::Left),
            'r' => Some(RuleSymbol::Right),
            'b' => Some(RuleSymbol::Back),
            'o' => Some(RuleSymbol::Spawn),
            _ => None,
        }
    }
}

/// A production rule: one or more walk segments, each restarting from the
/// builder's anchor tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    segments: Vec<Vec<RuleSymbol>>,
}

impl Rule {
    /// Parse a rule from compact segment strings, e.g. `["llfflo", "rrffro"]`.
    pub fn parse<S: AsRef<str>>(segments: &[S]) -> Result<Rule, ConfigError> {
        if segments.is_empty() {
            return Err(ConfigError::EmptyRule);
        }
        let mut parsed = Vec::with_capacity(segments.len());
        for segment in segments {
            let segment = segment.as_ref();
            if segment.is_empty() {
                return Err(ConfigError::EmptyRule);
            }
            let symbols = segment
                .chars()
                .map(|c| RuleSymbol::from_char(c).ok_or(ConfigError::UnknownRuleSymbol(c)))
                .collect::<Result<Vec<_>, _>>()?;
            parsed.push(symbols);
        }
        Ok(Rule { segments: parsed })
    }

    pub fn segments(&self) -> &[Vec<RuleSymbol>] {
        &self.segments
    }
}

/// An ephemeral road-growing agent: an anchor tile plus a fixed heading.
///
/// The four relative directions are derived once from the anchor heading
/// and stay fixed for the builder's whole (single-rule) lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadBuilder {
    pub anchor: usize,
    pub heading: Direction,
}

impl RoadBuilder {
    pub fn new(anchor: usize, heading: Direction) -> Self {
        Self { anchor, heading }
    }

    fn absolute(&self, symbol: RuleSymbol) -> Direction {
        match symbol {
            RuleSymbol::Forward => self.heading,
            RuleSymbol::Right => self.heading.rotate_cw(),
            RuleSymbol::Left => self.heading.rotate_ccw(),
            RuleSymbol::Back => self.heading.opposite(),
            RuleSymbol::Spawn => unreachable!("spawn has no direction"),
        }
    }

    /// Apply one production rule, joining road edges as the cursor walks and
    /// collecting any spawned child builders.
    ///
    /// Walking off a bounded grid silently truncates the current segment;
    /// that is a defined outcome, not an error.
    pub fn apply(&self, grid: &mut TileGrid, rule: &Rule) -> Vec<RoadBuilder> {
        let mut children = Vec::new();

        for segment in rule.segments() {
            let mut cursor = self.anchor;
            let mut cursor_heading = self.heading;

            for &symbol in segment {
                if symbol == RuleSymbol::Spawn {
                    children.push(RoadBuilder::new(cursor, cursor_heading));
                    break;
                }

                let dir = self.absolute(symbol);
                let Some(next) = grid.neighbour(cursor, dir) else {
                    break;
                };
                grid.connect(cursor, dir);
                cursor = next;
                cursor_heading = dir;
            }
        }

        children
    }
}

/// Run the growth process for a fixed number of rounds.
///
/// Each round, every active builder independently draws one rule from
/// `rules`; the children produced across all builders become the next
/// round's active list. Returns the builders left active after the final
/// round. Termination is guaranteed by the round budget; rule sets whose
/// spawn counts grow the population combinatorially are a caller-tunable
/// risk.
pub fn grow_roads(
    grid: &mut TileGrid,
    seeds: Vec<RoadBuilder>,
    rules: &WeightedTable<Rule>,
    rounds: u32,
    rng: &mut impl Rng,
) -> Vec<RoadBuilder> {
    let mut builders = seeds;

    for _ in 0..rounds {
        let mut next = Vec::new();
        for builder in &builders {
            let rule = rules.choose(rng);
            next.extend(builder.apply(grid, rule));
        }
        builders = next;
    }

    builders
}
