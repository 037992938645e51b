//! The prefix aggregation engine: a flat, bit-indexed binary trie over the
//! IPv4 address space.
//!
//! The trie is a complete binary tree of depth 24 stored breadth-first in one
//! densely allocated byte array: one marker byte per node, no pointers, no
//! per-node allocation. Marker 0 means no prefix terminates at or below the
//! node; a value in [1,32] records the length of an announced prefix. A node
//! whose marker equals its own depth is a leaf: an exact prefix of that
//! length was announced there. That own-depth test is what the merge and
//! elimination passes key on.
//!
//! Because prefixes longer than /24 are never accepted, the whole structure
//! fits in 2^25 bytes (32 MiB), which buys simple index arithmetic in the hot
//! loops at the cost of memory.

use crate::prefix::{Prefix, MAX_PREFIX_LEN};
use tracing::debug;

/// Number of marker slots: every node of a complete binary tree of depth 24.
const TRIE_SLOTS: usize = 1 << 25;

/// Convert (network address, prefix length) to a flat trie-node index.
///
/// Depth 0 is the root at index 0; nodes at depth `p` occupy the index range
/// `[2^p - 1, 2^(p+1) - 2]`.
#[inline]
pub fn index(addr: u32, depth: u8) -> u32 {
    if depth == 0 {
        return 0;
    }
    ((1u32 << depth) - 1) + (addr >> (32 - depth))
}

/// Convert a trie-node index at depth `p` back to its network address.
#[inline]
pub fn addr_of(index: u32, depth: u8) -> u32 {
    if depth == 0 {
        return 0;
    }
    (index + 1) << (32 - depth)
}

/// Recover the depth of a trie-node index.
#[inline]
pub fn depth_of(index: u32) -> u8 {
    for p in 1..=32u32 {
        if (index as u64) < (1u64 << p) - 1 {
            return (p - 1) as u8;
        }
    }
    0
}

/// The trie store plus the depth bounds the passes operate within.
///
/// `shortest` and `longest` track the accepted prefix-length range; merges
/// lower `shortest` as they promote markers toward the root. The store is
/// built fresh per aggregation run and discarded afterwards.
pub struct PrefixTrie {
    markers: Vec<u8>,
    shortest: u8,
    longest: u8,
}

impl PrefixTrie {
    pub fn new() -> Self {
        Self {
            markers: vec![0u8; TRIE_SLOTS],
            shortest: 32,
            longest: 0,
        }
    }

    /// Record one accepted prefix.
    ///
    /// Writes the prefix length into every node on the path from depth 1 down
    /// to the leaf, keeping the numerically smallest length per node. Only
    /// the leaf write (where marker == depth) is ever read back by the later
    /// passes; the ancestor writes are kept for parity with the original
    /// engine's behavior.
    pub fn insert(&mut self, prefix: Prefix) {
        debug_assert!(prefix.len <= MAX_PREFIX_LEN);
        for k in 1..=prefix.len {
            let slot = index(prefix.addr, k) as usize;
            if self.markers[slot] == 0 || self.markers[slot] > prefix.len {
                self.markers[slot] = prefix.len;
            }
        }
        if prefix.len < self.shortest {
            self.shortest = prefix.len;
        }
        if prefix.len > self.longest {
            self.longest = prefix.len;
        }
    }

    /// Run the sibling-merge and redundancy-elimination passes.
    ///
    /// Depths are visited strictly descending from `longest` to `shortest`
    /// (which merges may lower mid-loop). A merge only ever writes to the
    /// parent depth, visited later in the same traversal, so one descending
    /// sweep reaches the fixed point.
    pub fn aggregate(&mut self) {
        let mut p = self.longest;
        while p >= self.shortest {
            if p > 0 {
                self.merge_siblings(p);
            }
            self.eliminate_covered(p);
            if p == 0 {
                break;
            }
            p -= 1;
        }
    }

    /// Merge sibling pairs at depth `p`: two adjacent leaves covering both
    /// halves of their parent block become one leaf at the parent.
    fn merge_siblings(&mut self, p: u8) {
        let first = index(0, p);
        let end = index(0, p + 1);
        let mut i = first;
        while i < end {
            if self.markers[i as usize] == p && self.markers[(i + 1) as usize] == p {
                debug!(
                    "Aggregating {} and {} to {}",
                    Prefix::new(addr_of(i, p), p),
                    Prefix::new(addr_of(i + 1, p), p),
                    Prefix::new(addr_of(i >> 1, p - 1), p - 1),
                );
                self.markers[i as usize] = 0;
                self.markers[(i + 1) as usize] = 0;
                self.markers[(i >> 1) as usize] = p - 1;
                if self.shortest > p - 1 {
                    self.shortest = p - 1;
                }
            }
            i += 2;
        }
    }

    /// Remove leaves at depth `p` that are covered by a less specific leaf.
    /// Ancestors are checked nearest-first; the first hit wins.
    fn eliminate_covered(&mut self, p: u8) {
        let first = index(0, p);
        let end = index(0, p + 1);
        for i in first..end {
            if self.markers[i as usize] != p {
                continue;
            }
            for pp in 1..=(p - self.shortest) {
                let anc = index(addr_of(i, p), p - pp);
                if self.markers[anc as usize] == p - pp {
                    debug!(
                        "Removing prefix {} covered by less specific {}",
                        Prefix::new(addr_of(i, p), p),
                        Prefix::new(addr_of(anc, p - pp), p - pp),
                    );
                    self.markers[i as usize] = 0;
                    break;
                }
            }
        }
    }

    /// Collect the remaining leaves: the final aggregated prefix list,
    /// longest prefixes first, ascending address within a length.
    pub fn collect(&self) -> Vec<Prefix> {
        let mut prefixes = Vec::new();
        let mut p = self.longest;
        while p >= self.shortest {
            let first = index(0, p);
            let end = index(0, p + 1);
            for i in first..end {
                if self.markers[i as usize] == p {
                    prefixes.push(Prefix::new(addr_of(i, p), p));
                }
            }
            if p == 0 {
                break;
            }
            p -= 1;
        }
        prefixes
    }

    /// The accepted prefix-length range seen so far, as (shortest, longest).
    pub fn depth_bounds(&self) -> (u8, u8) {
        (self.shortest, self.longest)
    }
}

impl Default for PrefixTrie {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pfx(text: &str) -> Prefix {
        crate::prefix::parse_prefix(text).unwrap().unwrap()
    }

    fn run(prefixes: &[&str]) -> Vec<String> {
        let mut trie = PrefixTrie::new();
        for p in prefixes {
            trie.insert(pfx(p));
        }
        trie.aggregate();
        trie.collect().iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_index_known_values() {
        assert_eq!(index(0, 0), 0);
        assert_eq!(index(0, 1), 1);
        assert_eq!(index(0x80000000, 1), 2);
        assert_eq!(index(0x0a000000, 8), 255 + 10);
    }

    #[test]
    fn test_codec_round_trip() {
        for len in 0..=MAX_PREFIX_LEN {
            for addr in [0u32, 0x0a000000, 0xc0a80000, 0xffffff00] {
                let masked = if len == 0 { 0 } else { addr & (u32::MAX << (32 - len)) };
                let i = index(masked, len);
                assert_eq!(depth_of(i), len, "depth of index for /{}", len);
                assert_eq!(addr_of(i, len), masked, "addr of index for /{}", len);
            }
        }
    }

    #[test]
    fn test_sibling_merge() {
        assert_eq!(run(&["10.0.0.0/24", "10.0.1.0/24"]), vec!["10.0.0.0/23"]);
    }

    #[test]
    fn test_redundancy_elimination() {
        assert_eq!(run(&["10.0.0.0/16", "10.0.4.0/24"]), vec!["10.0.0.0/16"]);
    }

    #[test]
    fn test_merge_then_eliminate() {
        // The two /24 halves merge to a /23 which the /16 then covers.
        assert_eq!(
            run(&["10.0.0.0/24", "10.0.1.0/24", "10.0.0.0/16"]),
            vec!["10.0.0.0/16"]
        );
    }

    #[test]
    fn test_cascading_merge() {
        // Four /24s collapse pairwise into /23s and then into one /22.
        assert_eq!(
            run(&["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24", "10.0.3.0/24"]),
            vec!["10.0.0.0/22"]
        );
    }

    #[test]
    fn test_end_to_end() {
        assert_eq!(
            run(&["192.168.0.0/24", "192.168.1.0/24", "192.168.3.0/24"]),
            vec!["192.168.3.0/24", "192.168.0.0/23"]
        );
    }

    #[test]
    fn test_non_adjacent_not_merged() {
        // 10.0.1.0/24 and 10.0.2.0/24 are adjacent in address space but not
        // siblings under one parent, so they must survive unmerged.
        assert_eq!(
            run(&["10.0.1.0/24", "10.0.2.0/24"]),
            vec!["10.0.1.0/24", "10.0.2.0/24"]
        );
    }

    #[test]
    fn test_duplicate_insert() {
        assert_eq!(run(&["10.0.0.0/24", "10.0.0.0/24"]), vec!["10.0.0.0/24"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(run(&[]).is_empty());
    }

    #[test]
    fn test_whole_space_merges_to_default_route() {
        assert_eq!(run(&["0.0.0.0/1", "128.0.0.0/1"]), vec!["0.0.0.0/0"]);
    }

    #[test]
    fn test_output_order() {
        let out = run(&["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16", "192.167.0.0/16"]);
        assert_eq!(
            out,
            vec!["192.167.0.0/16", "192.168.0.0/16", "172.16.0.0/12", "10.0.0.0/8"]
        );
    }
}
