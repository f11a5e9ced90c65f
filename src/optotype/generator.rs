//! Random optotype streams without immediate repeats
//!
//! Every draw excludes only the previous draw, so adjacent symbols always
//! differ while non-adjacent repeats stay possible.

use rand::Rng;
use std::fmt;

/// Snellen letters used by the letter-sequence test
pub const SNELLEN_POOL: [char; 9] = ['C', 'D', 'E', 'F', 'L', 'O', 'P', 'T', 'Z'];

/// Shape symbols for children who cannot read letters yet
pub const PEDIATRIC_POOL: [char; 5] = ['●', '■', '▲', '♥', '★'];

/// Glyph rotated for the tumbling-E test
pub const TUMBLING_E_GLYPH: char = 'E';

/// Glyph rotated for the Landolt-ring test
pub const LANDOLT_GLYPH: char = 'C';

/// Symbol family of a letter-sequence test
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptotypePool {
    Snellen,
    Pediatric,
}

impl OptotypePool {
    pub fn symbols(&self) -> &'static [char] {
        match self {
            OptotypePool::Snellen => &SNELLEN_POOL,
            OptotypePool::Pediatric => &PEDIATRIC_POOL,
        }
    }
}

/// Cardinal orientation of a tumbling E's prongs or a Landolt ring's gap
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

pub const DIRECTIONS: [Direction; 4] = [
    Direction::Right,
    Direction::Down,
    Direction::Left,
    Direction::Up,
];

impl Direction {
    /// Clockwise rotation applied to the upright glyph (which faces right)
    pub fn rotation_degrees(&self) -> u16 {
        match self {
            Direction::Right => 0,
            Direction::Down => 90,
            Direction::Left => 180,
            Direction::Up => 270,
        }
    }

    /// Arrow used by text renderers
    pub fn arrow(&self) -> char {
        match self {
            Direction::Right => '→',
            Direction::Down => '↓',
            Direction::Left => '←',
            Direction::Up => '↑',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Up => "up",
        };
        write!(f, "{}", name)
    }
}

/// Uniform draw from `pool`, skipping `exclude_last` when another symbol is available.
/// Returns `None` only for an empty pool.
pub fn next_symbol<T, R>(pool: &[T], exclude_last: Option<&T>, rng: &mut R) -> Option<T>
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    if pool.is_empty() {
        return None;
    }

    let available: Vec<&T> = match exclude_last {
        Some(last) => pool.iter().filter(|s| *s != last).collect(),
        None => pool.iter().collect(),
    };

    // Single distinct symbol: repetition is unavoidable
    if available.is_empty() {
        return Some(pool[rng.gen_range(0..pool.len())].clone());
    }

    Some(available[rng.gen_range(0..available.len())].clone())
}

/// `length` draws chained through `next_symbol`; the first draw avoids `seed_exclude`
pub fn sequence<T, R>(pool: &[T], length: usize, seed_exclude: Option<&T>, rng: &mut R) -> Vec<T>
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    let mut result: Vec<T> = Vec::with_capacity(length);
    let mut last = seed_exclude.cloned();

    for _ in 0..length {
        let Some(symbol) = next_symbol(pool, last.as_ref(), rng) else {
            break;
        };
        last = Some(symbol.clone());
        result.push(symbol);
    }

    result
}

/// Random direction different from `avoid`
pub fn next_direction<R: Rng + ?Sized>(avoid: Option<Direction>, rng: &mut R) -> Direction {
    next_symbol(&DIRECTIONS, avoid.as_ref(), rng).unwrap_or(Direction::Right)
}

/// `length` directions with no two adjacent equal
pub fn direction_sequence<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Vec<Direction> {
    sequence(&DIRECTIONS, length, None, rng)
}
