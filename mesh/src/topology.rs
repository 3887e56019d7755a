use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Linear node id on the mesh: `id = x + width * y`.
pub type NodeId = u32;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dim {
    pub width: u32,
    pub height: u32,
}

#[derive(thiserror::Error, Debug)]
#[error("failed to parse {value:?} as WIDTHxHEIGHT mesh dimensions")]
pub struct ParseDimError {
    value: String,
}

static DIM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*x\s*(\d+)\s*$").unwrap());

impl std::str::FromStr for Dim {
    type Err = ParseDimError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let err = || ParseDimError {
            value: value.to_string(),
        };
        let captures = DIM_REGEX.captures(value).ok_or_else(err)?;
        let get = |i: usize| {
            captures
                .get(i)
                .ok_or_else(err)?
                .as_str()
                .parse()
                .map_err(|_| err())
        };
        Ok(Self {
            width: get(1)?,
            height: get(2)?,
        })
    }
}

impl std::fmt::Display for Dim {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Dim {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn num_nodes(&self) -> u32 {
        self.width * self.height
    }

    #[must_use]
    pub fn id_of(&self, coord: Coord) -> NodeId {
        coord.x + self.width * coord.y
    }

    #[must_use]
    pub fn coord_of(&self, id: NodeId) -> Coord {
        Coord {
            x: id % self.width,
            y: id / self.width,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        0..self.num_nodes()
    }

    /// All ordered `(src, dst)` pairs with `src != dst`, src-major.
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> {
        use itertools::Itertools;
        let nodes = self.num_nodes();
        (0..nodes)
            .cartesian_product(0..nodes)
            .filter(|(src, dst)| src != dst)
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: u32,
    pub y: u32,
}

impl Coord {
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl From<(u32, u32)> for Coord {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// A hop direction: one of the four mesh unit vectors, or the two
/// endpoint pseudo-directions for the local CPU port.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// `(1, 0)`
    XPlus,
    /// `(-1, 0)`
    XMinus,
    /// `(0, 1)`
    YPlus,
    /// `(0, -1)`
    YMinus,
    /// Injection at the source node.
    FromCpu,
    /// Ejection at the destination node.
    ToCpu,
}

impl Direction {
    pub const CARDINAL: [Direction; 4] = [
        Direction::XPlus,
        Direction::XMinus,
        Direction::YPlus,
        Direction::YMinus,
    ];

    /// Direction of the one-hop move `from -> to`.
    ///
    /// `from == to` maps to [`Direction::ToCpu`]: the only zero-length hop a
    /// route contains is the ejection step at the destination.
    ///
    /// # Panics
    /// Panics if the move is longer than one hop or diagonal.
    #[must_use]
    pub fn between(from: Coord, to: Coord) -> Direction {
        let dx = i64::from(to.x) - i64::from(from.x);
        let dy = i64::from(to.y) - i64::from(from.y);
        match (dx, dy) {
            (0, 0) => Direction::ToCpu,
            (1, 0) => Direction::XPlus,
            (-1, 0) => Direction::XMinus,
            (0, 1) => Direction::YPlus,
            (0, -1) => Direction::YMinus,
            _ => panic!("{from} -> {to} is not a unit hop"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Coord, Dim, Direction};
    use similar_asserts as diff;

    #[test]
    fn test_id_coord_roundtrip() {
        let dims = Dim::new(8, 8);
        for id in dims.nodes() {
            diff::assert_eq!(have: dims.id_of(dims.coord_of(id)), want: id);
        }
        for y in 0..dims.height {
            for x in 0..dims.width {
                let coord = Coord::new(x, y);
                diff::assert_eq!(have: dims.coord_of(dims.id_of(coord)), want: coord);
            }
        }
    }

    #[test]
    fn test_id_is_x_major() {
        let dims = Dim::new(8, 8);
        diff::assert_eq!(have: dims.id_of(Coord::new(1, 1)), want: 9);
        diff::assert_eq!(have: dims.coord_of(9), want: Coord::new(1, 1));
    }

    #[test]
    fn test_parse_dims() {
        let dims: Dim = "8x8".parse().unwrap();
        diff::assert_eq!(have: dims, want: Dim::new(8, 8));
        let dims: Dim = " 16 x 4 ".parse().unwrap();
        diff::assert_eq!(have: dims, want: Dim::new(16, 4));
        assert!("8".parse::<Dim>().is_err());
        assert!("8x8x8".parse::<Dim>().is_err());
    }

    #[test]
    fn test_pairs_skip_self() {
        let dims = Dim::new(2, 2);
        let pairs: Vec<_> = dims.pairs().collect();
        diff::assert_eq!(have: pairs.len(), want: 12);
        assert!(pairs.iter().all(|(src, dst)| src != dst));
        diff::assert_eq!(have: pairs[0], want: (0, 1));
    }

    #[test]
    fn test_direction_between() {
        let a = Coord::new(3, 3);
        diff::assert_eq!(have: Direction::between(a, Coord::new(4, 3)), want: Direction::XPlus);
        diff::assert_eq!(have: Direction::between(a, Coord::new(2, 3)), want: Direction::XMinus);
        diff::assert_eq!(have: Direction::between(a, Coord::new(3, 4)), want: Direction::YPlus);
        diff::assert_eq!(have: Direction::between(a, Coord::new(3, 2)), want: Direction::YMinus);
        diff::assert_eq!(have: Direction::between(a, a), want: Direction::ToCpu);
    }
}
