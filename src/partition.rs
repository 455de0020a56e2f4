//! Key-space partitioning: routes intermediate data to reduce buckets.
//!
//! Words are routed by their first character, so the key space is a fixed
//! 36-symbol alphabet. Each reduce bucket owns a contiguous, near-equal
//! slice of it, assigned once at driver startup and shared verbatim with
//! every worker through the task descriptor.

use std::collections::BTreeMap;
use std::ops::Range;

use anyhow::{ensure, Result};

/// The key alphabet: digits first, then lowercase letters.
pub const ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// Split `0..total` into `parts` contiguous ranges with lengths differing by
/// at most one. The first `total % parts` ranges take the larger length, so
/// concatenating the ranges in order reconstructs `0..total`.
///
/// This one rule drives both the bucket map (alphabet symbols to buckets)
/// and corpus slicing (tokens to map tasks).
///
/// Panics if `parts` is zero; callers validate their task counts first.
pub fn even_spans(total: usize, parts: usize) -> Vec<Range<usize>> {
    let base = total / parts;
    let extra = total % parts;
    let mut spans = Vec::with_capacity(parts);
    let mut lower = 0;
    for i in 0..parts {
        let len = if i < extra { base + 1 } else { base };
        spans.push(lower..lower + len);
        lower += len;
    }
    spans
}

/// Build the routing table for `n_reduce` reduce tasks: every alphabet
/// symbol maps to the id (`"0"` .. `"R-1"`) of the bucket owning it.
///
/// Errors if `n_reduce` is zero. More than 36 reduce tasks is accepted, but
/// the tail buckets then own no symbols and their reduce tasks will never
/// see input.
pub fn bucket_map(n_reduce: u32) -> Result<BTreeMap<char, String>> {
    ensure!(
        n_reduce > 0,
        "number of reduce tasks must be positive, got {n_reduce}"
    );
    let symbols: Vec<char> = ALPHABET.chars().collect();
    let mut map = BTreeMap::new();
    for (bucket, span) in even_spans(symbols.len(), n_reduce as usize)
        .into_iter()
        .enumerate()
    {
        for &symbol in &symbols[span] {
            map.insert(symbol, bucket.to_string());
        }
    }
    Ok(map)
}

/// The bucket owning `symbol`, or `None` for characters outside the alphabet.
pub fn bucket_of(map: &BTreeMap<char, String>, symbol: char) -> Option<&str> {
    map.get(&symbol).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_cover_everything_in_order() {
        for total in [0, 1, 5, 36, 100] {
            for parts in [1, 2, 3, 7, 36, 40] {
                let spans = even_spans(total, parts);
                assert_eq!(spans.len(), parts);
                assert_eq!(spans.iter().map(Range::len).sum::<usize>(), total);
                let mut expected = 0;
                for span in &spans {
                    assert_eq!(span.start, expected);
                    expected = span.end;
                }
                assert_eq!(expected, total);
            }
        }
    }

    #[test]
    fn span_lengths_differ_by_at_most_one() {
        for total in [1, 6, 36, 99] {
            for parts in [1, 2, 5, 36] {
                let lens: Vec<usize> = even_spans(total, parts).iter().map(Range::len).collect();
                let min = lens.iter().min().unwrap();
                let max = lens.iter().max().unwrap();
                assert!(max - min <= 1, "total={total} parts={parts} lens={lens:?}");
            }
        }
    }

    #[test]
    fn larger_spans_come_first() {
        // 36 symbols over 5 buckets: 8, 7, 7, 7, 7.
        let lens: Vec<usize> = even_spans(36, 5).iter().map(Range::len).collect();
        assert_eq!(lens, vec![8, 7, 7, 7, 7]);
    }

    #[test]
    fn bucket_map_covers_alphabet_exactly_once() {
        for n_reduce in 1..=40 {
            let map = bucket_map(n_reduce).unwrap();
            assert_eq!(map.len(), 36);
            for symbol in ALPHABET.chars() {
                let bucket: u32 = map[&symbol].parse().unwrap();
                assert!(bucket < n_reduce);
            }
        }
    }

    #[test]
    fn bucket_ranges_are_contiguous_over_the_alphabet() {
        // BTreeMap iteration follows alphabet order (digits sort before
        // lowercase letters in ASCII), so bucket ids must be non-decreasing
        // and start at 0.
        for n_reduce in [1, 2, 3, 13, 36] {
            let map = bucket_map(n_reduce).unwrap();
            let mut last = 0u32;
            for (i, symbol) in ALPHABET.chars().enumerate() {
                let bucket: u32 = map[&symbol].parse().unwrap();
                if i == 0 {
                    assert_eq!(bucket, 0);
                }
                assert!(bucket == last || bucket == last + 1);
                last = bucket;
            }
            assert_eq!(last, n_reduce.min(36) - 1);
        }
    }

    #[test]
    fn two_way_split_breaks_between_h_and_i() {
        let map = bucket_map(2).unwrap();
        assert_eq!(bucket_of(&map, '0'), Some("0"));
        assert_eq!(bucket_of(&map, 'h'), Some("0"));
        assert_eq!(bucket_of(&map, 'i'), Some("1"));
        assert_eq!(bucket_of(&map, 'z'), Some("1"));
        assert_eq!(bucket_of(&map, 'é'), None);
    }

    #[test]
    fn lookup_is_idempotent() {
        let map = bucket_map(7).unwrap();
        for symbol in ALPHABET.chars() {
            assert_eq!(bucket_of(&map, symbol), bucket_of(&map, symbol));
        }
    }

    #[test]
    fn zero_reduce_tasks_is_a_configuration_error() {
        assert!(bucket_map(0).is_err());
    }

    #[test]
    fn more_buckets_than_symbols_leaves_tail_buckets_empty() {
        let map = bucket_map(40).unwrap();
        let owned: std::collections::BTreeSet<&String> = map.values().collect();
        assert_eq!(owned.len(), 36);
        assert!(!owned.contains(&"36".to_string()));
    }
}
