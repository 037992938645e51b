//! Batch parsing and the aggregation pipeline.
//!
//! The pipeline is a strict four-phase sequence: parse the raw CIDR strings,
//! insert the accepted prefixes into a fresh trie, run the merge/elimination
//! sweep, collect the surviving leaves. No phase is re-entrant and none is
//! skipped; parse failures (other than the over-length discard case) abort
//! the whole batch.

use crate::error::NetfoldError;
use crate::prefix::{parse_prefix, Prefix};
use crate::trie::PrefixTrie;
use tracing::{debug, info};

/// Outcome of parsing a whole fetched batch of CIDR strings.
#[derive(Debug)]
pub struct ParsedBatch {
    pub prefixes: Vec<Prefix>,
    /// How many prefixes were dropped for exceeding the /24 bound.
    pub discarded: usize,
}

/// Parse a batch of textual CIDR prefixes, fail-fast.
///
/// Over-length prefixes are discarded individually (each with a warning);
/// any other parse failure is returned as an error and the caller is
/// expected to abort the run.
pub fn parse_batch<S: AsRef<str>>(texts: &[S]) -> Result<ParsedBatch, NetfoldError> {
    let mut prefixes = Vec::with_capacity(texts.len());
    let mut discarded = 0;
    for text in texts {
        match parse_prefix(text.as_ref())? {
            Some(prefix) => prefixes.push(prefix),
            None => discarded += 1,
        }
    }
    Ok(ParsedBatch { prefixes, discarded })
}

/// Aggregate a set of prefixes into the shortest equivalent CIDR list.
///
/// Adjacent sibling blocks merge into their parent and blocks covered by a
/// less specific block are dropped. The result is ordered longest-prefix
/// first, ascending address within a length, and is a fixed point: feeding
/// it back in yields the same list.
pub fn aggregate(prefixes: &[Prefix]) -> Vec<Prefix> {
    let mut trie = PrefixTrie::new();
    for prefix in prefixes {
        debug!("Inserting prefix {}", prefix);
        trie.insert(*prefix);
    }
    let (shortest, longest) = trie.depth_bounds();
    info!("Shortest IPv4 prefix is {} bits and longest {} bits", shortest, longest);

    trie.aggregate();
    trie.collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::prefix::MAX_PREFIX_LEN;
    use proptest::prelude::*;

    fn prefix_strategy() -> impl Strategy<Value = Prefix> {
        (any::<u32>(), 0u8..=MAX_PREFIX_LEN).prop_map(|(addr, len)| {
            let masked = if len == 0 { 0 } else { addr & (u32::MAX << (32 - len)) };
            Prefix::new(masked, len)
        })
    }

    fn prefix_vec_strategy(max_size: usize) -> impl Strategy<Value = Vec<Prefix>> {
        prop::collection::vec(prefix_strategy(), 0..max_size)
    }

    /// True when `inner` lies entirely within `outer`.
    fn covers(outer: &Prefix, inner: &Prefix) -> bool {
        outer.len <= inner.len
            && (outer.len == 0 || (inner.addr >> (32 - outer.len)) == (outer.addr >> (32 - outer.len)))
    }

    proptest! {
        /// Aggregation never grows the list
        #[test]
        fn prop_aggregate_never_grows(prefixes in prefix_vec_strategy(100)) {
            prop_assert!(aggregate(&prefixes).len() <= prefixes.len());
        }

        /// Every input prefix is still covered by some output prefix
        #[test]
        fn prop_inputs_remain_covered(prefixes in prefix_vec_strategy(50)) {
            let out = aggregate(&prefixes);
            for input in &prefixes {
                prop_assert!(
                    out.iter().any(|o| covers(o, input)),
                    "input {} not covered", input
                );
            }
        }

        /// Re-aggregating the output is a fixed point
        #[test]
        fn prop_aggregate_idempotent(prefixes in prefix_vec_strategy(50)) {
            let once = aggregate(&prefixes);
            prop_assert_eq!(aggregate(&once), once);
        }

        /// No output prefix is covered by another output prefix
        #[test]
        fn prop_no_redundant_outputs(prefixes in prefix_vec_strategy(50)) {
            let out = aggregate(&prefixes);
            for (i, a) in out.iter().enumerate() {
                for (j, b) in out.iter().enumerate() {
                    if i != j {
                        prop_assert!(!covers(a, b), "{} covers {}", a, b);
                    }
                }
            }
        }

        /// Output ordering: longest first, ascending address within a length
        #[test]
        fn prop_output_ordered(prefixes in prefix_vec_strategy(50)) {
            let out = aggregate(&prefixes);
            for pair in out.windows(2) {
                prop_assert!(
                    pair[0].len > pair[1].len
                        || (pair[0].len == pair[1].len && pair[0].addr < pair[1].addr)
                );
            }
        }
    }
}
