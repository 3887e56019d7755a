//! Synthetic traffic permutations (Dally & Towles, p. 50) rendered as
//! injector event files.

use super::Error;
use mesh::Dim;
use std::io::Write;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum Pattern {
    BitComp,
    Shuffle,
    Transpose,
    Tornado,
    Neighbor,
}

/// Bits needed to address `x` values (`x` must be a power of two > 1).
fn num_bits(x: u32) -> u32 {
    debug_assert!(x > 1);
    32 - (x - 1).leading_zeros()
}

fn is_power_of_two(x: u32) -> bool {
    x > 1 && x & (x - 1) == 0
}

impl Pattern {
    /// Destination node of `src` under this permutation.
    ///
    /// Node addresses are treated as bit strings of `log2(width) +
    /// log2(height)` bits, split into a left (high) and right (low) half.
    #[must_use]
    pub fn dst_of(&self, dims: Dim, src: u32) -> u32 {
        let nbits = num_bits(dims.width) + num_bits(dims.height);
        let nbits_l = nbits / 2;
        let nbits_r = nbits - nbits_l;
        let mask = (1 << nbits) - 1;
        let mask_l = (1 << nbits_l) - 1;
        let mask_r = (1 << nbits_r) - 1;
        match self {
            Pattern::BitComp => !src & mask,
            Pattern::Shuffle => ((src >> (nbits - 1)) & 1) | ((src << 1) & mask),
            Pattern::Transpose => ((src >> nbits_r) & mask_l) | ((src & mask_r) << nbits_r),
            Pattern::Tornado => {
                let dst_l = ((src >> nbits_r) + nbits_l.div_ceil(2) - 1) & mask_l;
                let dst_r = (src + nbits_r.div_ceil(2) - 1) & mask_r;
                (dst_l << nbits_r) | dst_r
            }
            Pattern::Neighbor => {
                let dst_l = ((src >> nbits_r) + 1) & mask_l;
                let dst_r = (src + 1) & mask_r;
                (dst_l << nbits_r) | dst_r
            }
        }
    }
}

/// Writes one `flow 0x<flow> size <flits> period <cycles>` event per source
/// node. Sources mapped onto themselves (transpose diagonal, for one) are
/// skipped. Both mesh dimensions must be powers of two, as the permutations
/// operate on the address bits.
pub fn write_events(
    out: &mut impl Write,
    pattern: Pattern,
    dims: Dim,
    size: u32,
    period: u32,
) -> Result<(), Error> {
    if !is_power_of_two(dims.width) || !is_power_of_two(dims.height) {
        return Err(Error::NotPowerOfTwo { dims });
    }
    for src in dims.nodes() {
        let dst = pattern.dst_of(dims, src);
        if src == dst {
            continue;
        }
        let flow = (u64::from(src) << 8 | u64::from(dst)) << 8;
        writeln!(out, "flow 0x{flow:06x} size {size} period {period}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{write_events, Pattern};
    use crate::Error;
    use color_eyre::eyre;
    use mesh::Dim;
    use similar_asserts as diff;
    use std::str::FromStr;

    #[test]
    fn test_pattern_names() -> eyre::Result<()> {
        diff::assert_eq!(have: Pattern::from_str("bitcomp")?, want: Pattern::BitComp);
        diff::assert_eq!(have: Pattern::Tornado.to_string(), want: "tornado");
        Ok(())
    }

    #[test]
    fn test_destinations_8x8() {
        let dims = Dim::new(8, 8);
        // complement of 000000 is 111111
        diff::assert_eq!(have: Pattern::BitComp.dst_of(dims, 0), want: 63);
        // rotate left by one bit
        diff::assert_eq!(have: Pattern::Shuffle.dst_of(dims, 1), want: 2);
        diff::assert_eq!(have: Pattern::Shuffle.dst_of(dims, 32), want: 1);
        // swap the two halves
        diff::assert_eq!(have: Pattern::Transpose.dst_of(dims, 1), want: 8);
        diff::assert_eq!(have: Pattern::Transpose.dst_of(dims, 9), want: 9);
        diff::assert_eq!(have: Pattern::Tornado.dst_of(dims, 0), want: 9);
        diff::assert_eq!(have: Pattern::Neighbor.dst_of(dims, 63), want: 0);
    }

    #[test]
    fn test_event_lines() -> eyre::Result<()> {
        let mut out = Vec::new();
        write_events(&mut out, Pattern::BitComp, Dim::new(8, 8), 2, 5)?;
        let text = String::from_utf8(out)?;
        let lines: Vec<_> = text.lines().collect();
        // bitcomp has no fixed points, so all 64 sources emit an event
        diff::assert_eq!(have: lines.len(), want: 64);
        diff::assert_eq!(have: lines[0], want: "flow 0x003f00 size 2 period 5");
        diff::assert_eq!(have: lines[63], want: "flow 0x3f0000 size 2 period 5");
        Ok(())
    }

    #[test]
    fn test_fixed_points_skipped() -> eyre::Result<()> {
        let mut out = Vec::new();
        write_events(&mut out, Pattern::Transpose, Dim::new(8, 8), 2, 1)?;
        let text = String::from_utf8(out)?;
        // the 8 diagonal nodes map onto themselves
        diff::assert_eq!(have: text.lines().count(), want: 56);
        Ok(())
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let mut out = Vec::new();
        let err = write_events(&mut out, Pattern::BitComp, Dim::new(3, 4), 2, 1).unwrap_err();
        assert!(matches!(err, Error::NotPowerOfTwo { .. }));
    }
}
