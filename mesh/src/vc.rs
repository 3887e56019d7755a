use super::topology::Direction;
use super::Error;

/// Virtual-channel assignment table.
///
/// Maps a hop direction to the list of VC ids a flow may occupy on the
/// corresponding physical port. Link directions carry the VCs partitioned
/// into *sets* so that two route phases can ride disjoint buffer subsets
/// and cannot form channel-dependency cycles across each other.
///
/// The ids for distinct directions never overlap for a fixed channel
/// count: they index distinct physical buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcTable {
    num_vcs: u32,
    from_cpu: Vec<Vec<u32>>,
    to_cpu: Vec<Vec<u32>>,
    x_plus: Vec<Vec<u32>>,
    x_minus: Vec<Vec<u32>>,
    y_plus: Vec<Vec<u32>>,
    y_minus: Vec<Vec<u32>>,
}

fn range(start: u32, len: u32) -> Vec<u32> {
    (start..start + len).collect()
}

/// Even split of `vals` into `num_sets` slices, keeping order.
fn partition(vals: Vec<u32>, num_sets: usize) -> Vec<Vec<u32>> {
    let len = vals.len();
    (0..num_sets)
        .map(|set| vals[set * len / num_sets..(set + 1) * len / num_sets].to_vec())
        .collect()
}

impl VcTable {
    /// The static table used by the dimension-ordered and two-phase route
    /// generators, keyed by per-link channel count.
    pub fn new(num_vcs: u32) -> Result<Self, Error> {
        // Injection uses VCs 0..n, ejection 8..8+n, link VCs start at 16.
        // Each link direction holds two sets (set 1 is empty for n = 1).
        let (y_plus, y_minus, x_plus, x_minus) = match num_vcs {
            1 => (
                vec![vec![16], vec![]],
                vec![vec![20], vec![]],
                vec![vec![24], vec![]],
                vec![vec![28], vec![]],
            ),
            2 => (
                vec![vec![16], vec![18]],
                vec![vec![20], vec![22]],
                vec![vec![24], vec![26]],
                vec![vec![28], vec![30]],
            ),
            4 => (
                vec![vec![16, 17], vec![18, 19]],
                vec![vec![20, 21], vec![22, 23]],
                vec![vec![24, 25], vec![26, 27]],
                vec![vec![28, 29], vec![30, 31]],
            ),
            8 => (
                vec![range(16, 4), range(20, 4)],
                vec![range(24, 4), range(28, 4)],
                vec![range(32, 4), range(36, 4)],
                vec![range(40, 4), range(44, 4)],
            ),
            _ => return Err(Error::UnsupportedChannelCount { num_vcs }),
        };
        Ok(Self {
            num_vcs,
            from_cpu: vec![range(0, num_vcs)],
            to_cpu: vec![range(8, num_vcs)],
            x_plus,
            x_minus,
            y_plus,
            y_minus,
        })
    }

    /// The computed table used by the shared-memory config generator:
    /// `num_sets * vcs_per_set` VCs per link, laid out in contiguous
    /// blocks (injection, ejection, then one block per link direction)
    /// and evenly partitioned into `num_sets` sets each.
    pub fn shmem(num_sets: u32, vcs_per_set: u32) -> Result<Self, Error> {
        let n = num_sets * vcs_per_set;
        if n == 0 || n >= 32 {
            return Err(Error::TooManyChannels { total: n });
        }
        let sets = num_sets as usize;
        let block = |i: u32| partition(range(n * i, n), sets);
        Ok(Self {
            num_vcs: n,
            from_cpu: block(0),
            to_cpu: block(1),
            y_plus: block(2),
            y_minus: block(3),
            x_plus: block(4),
            x_minus: block(5),
        })
    }

    #[must_use]
    pub fn num_vcs(&self) -> u32 {
        self.num_vcs
    }

    /// Number of VC sets per link direction.
    #[must_use]
    pub fn num_sets(&self) -> usize {
        self.x_plus.len()
    }

    fn sets(&self, direction: Direction) -> &[Vec<u32>] {
        match direction {
            Direction::XPlus => &self.x_plus,
            Direction::XMinus => &self.x_minus,
            Direction::YPlus => &self.y_plus,
            Direction::YMinus => &self.y_minus,
            Direction::FromCpu => &self.from_cpu,
            Direction::ToCpu => &self.to_cpu,
        }
    }

    /// VC ids for one hop direction.
    ///
    /// `set = None` concatenates every set for the direction (used by
    /// algorithms that need no set-based isolation).
    pub fn vcs(&self, direction: Direction, set: Option<usize>) -> Result<Vec<u32>, Error> {
        let sets = self.sets(direction);
        match set {
            None => Ok(sets.concat()),
            Some(set) if set < sets.len() => Ok(sets[set].clone()),
            Some(set) => Err(Error::VcSetOutOfRange {
                set,
                num_sets: sets.len(),
            }),
        }
    }

    /// Injection VCs (whole from-CPU range).
    pub fn from_cpu(&self) -> Vec<u32> {
        self.from_cpu.concat()
    }

    /// Ejection VCs (whole to-CPU range).
    pub fn to_cpu(&self) -> Vec<u32> {
        self.to_cpu.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::super::topology::Direction;
    use super::super::Error;
    use super::VcTable;
    use similar_asserts as diff;
    use std::collections::HashSet;

    #[test]
    fn test_static_table_values() -> color_eyre::eyre::Result<()> {
        let table = VcTable::new(4)?;
        diff::assert_eq!(have: table.from_cpu(), want: vec![0, 1, 2, 3]);
        diff::assert_eq!(have: table.to_cpu(), want: vec![8, 9, 10, 11]);
        diff::assert_eq!(have: table.vcs(Direction::YPlus, Some(0))?, want: vec![16, 17]);
        diff::assert_eq!(have: table.vcs(Direction::YPlus, Some(1))?, want: vec![18, 19]);
        diff::assert_eq!(
            have: table.vcs(Direction::XMinus, None)?,
            want: vec![28, 29, 30, 31]
        );
        Ok(())
    }

    #[test]
    fn test_vcs_disjoint_across_directions() -> color_eyre::eyre::Result<()> {
        for num_vcs in [1, 2, 4, 8] {
            let table = VcTable::new(num_vcs)?;
            let mut seen: HashSet<u32> = HashSet::new();
            for direction in [
                Direction::FromCpu,
                Direction::ToCpu,
                Direction::XPlus,
                Direction::XMinus,
                Direction::YPlus,
                Direction::YMinus,
            ] {
                for vc in table.vcs(direction, None)? {
                    assert!(seen.insert(vc), "vc {vc} reused ({num_vcs} channels)");
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_unsupported_channel_count() {
        assert!(matches!(
            VcTable::new(3),
            Err(Error::UnsupportedChannelCount { num_vcs: 3 })
        ));
        assert!(matches!(
            VcTable::new(16),
            Err(Error::UnsupportedChannelCount { num_vcs: 16 })
        ));
    }

    #[test]
    fn test_set_out_of_range() -> color_eyre::eyre::Result<()> {
        let table = VcTable::new(2)?;
        assert!(matches!(
            table.vcs(Direction::XPlus, Some(2)),
            Err(Error::VcSetOutOfRange { set: 2, num_sets: 2 })
        ));
        Ok(())
    }

    #[test]
    fn test_shmem_layout() -> color_eyre::eyre::Result<()> {
        // 2 sets x 2 VCs: 4 VCs per block, blocks in port order.
        let table = VcTable::shmem(2, 2)?;
        diff::assert_eq!(have: table.num_sets(), want: 2);
        diff::assert_eq!(have: table.from_cpu(), want: vec![0, 1, 2, 3]);
        diff::assert_eq!(have: table.vcs(Direction::FromCpu, Some(1))?, want: vec![2, 3]);
        diff::assert_eq!(have: table.to_cpu(), want: vec![4, 5, 6, 7]);
        diff::assert_eq!(have: table.vcs(Direction::YPlus, Some(0))?, want: vec![8, 9]);
        diff::assert_eq!(have: table.vcs(Direction::YMinus, Some(1))?, want: vec![14, 15]);
        diff::assert_eq!(have: table.vcs(Direction::XPlus, None)?, want: vec![16, 17, 18, 19]);
        diff::assert_eq!(have: table.vcs(Direction::XMinus, Some(0))?, want: vec![20, 21]);
        Ok(())
    }

    #[test]
    fn test_shmem_channel_limit() {
        assert!(matches!(
            VcTable::shmem(8, 4),
            Err(Error::TooManyChannels { total: 32 })
        ));
        assert!(VcTable::shmem(5, 1).is_ok());
    }
}
