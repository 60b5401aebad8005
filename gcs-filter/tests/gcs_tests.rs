//! # Golomb-Coded Set Tests
//!
//! This test suite verifies:
//! - No false negatives for any built set
//! - False-positive rate close to 1/P
//! - Deterministic output regardless of insertion order
//! - Bit stream and Golomb-Rice round trips
//! - Early exit of the query scan
//! - Filter files and concurrent readers

use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

use gcs_filter::{
    build, query, read_filter, write_filter, BitReader, BitWriter, GcsBuilder, GcsQuery,
    GolombDecoder, GolombEncoder, GolombRice, HashMapper, Md5Mapper, QueryOutcome,
};

/// Generate a word list with a common prefix
fn words(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{}-{:06}", prefix, i)).collect()
}

#[test]
fn test_alice_and_bob() {
    let filter = build(["alice", "bob"], 1, 2).unwrap();
    assert!(query(&filter, "alice").unwrap());
    assert!(query(&filter, "bob").unwrap());

    // md5("carol") maps to 0 in [0, 2), the sentinel value
    assert_eq!(Md5Mapper.map(b"carol", GcsQuery::new(filter.clone()).unwrap().params()), 0);
    assert!(query(&filter, "carol").unwrap());
    // md5("apple") maps to 1, which nothing encoded
    assert!(!query(&filter, "apple").unwrap());
}

#[test]
fn test_no_false_negatives() {
    for &(count, p) in &[(1usize, 1u32), (10, 2), (100, 16), (1000, 1024), (3000, 1 << 20)] {
        let members = words("member", count);
        let filter = build(&members, count as u32, p).unwrap();
        let gcs = GcsQuery::new(filter).unwrap();

        for word in &members {
            assert!(gcs.query(word), "{} missing with N={}, P={}", word, count, p);
        }
    }
}

#[test]
fn test_false_positive_rate() {
    let n = 500;
    let p = 32u32;
    let samples = 20_000;

    let filter = build(words("member", n), n as u32, p).unwrap();
    let gcs = GcsQuery::new(filter).unwrap();

    let hits = words("absent", samples)
        .iter()
        .filter(|w| gcs.query(w))
        .count();

    let rate = hits as f64 / samples as f64;
    let expected = 1.0 / p as f64;
    println!("False positive rate: {:.4} (expected ~{:.4})", rate, expected);
    assert!(rate > expected * 0.7 && rate < expected * 1.3);
}

#[test]
fn test_insertion_order_does_not_matter() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut members = words("word", 2000);
    let reference = build(&members, 2000, 256).unwrap();

    for _ in 0..5 {
        members.shuffle(&mut rng);
        assert_eq!(build(&members, 2000, 256).unwrap(), reference);
    }
}

#[test]
fn test_duplicate_items_do_not_grow_filter() {
    let members = words("dup", 300);
    let mut doubled = members.clone();
    doubled.extend(members.iter().cloned());

    let mut builder = GcsBuilder::new(300, 64).unwrap();
    builder.extend(&doubled);
    let (filter, info) = builder.finish().unwrap();

    assert_eq!(info.items_added, 600);
    assert!(info.encoded_deltas <= 300);
    assert_eq!(filter, build(&members, 300, 64).unwrap());
}

#[test]
fn test_bitstream_random_widths() {
    let mut rng = StdRng::seed_from_u64(7);
    let fields: Vec<(u32, u64)> = (0..5000)
        .map(|_| {
            let width = rng.gen_range(1..=64u32);
            let value = rng.gen::<u64>() >> (64 - width);
            (width, value)
        })
        .collect();

    let mut writer = BitWriter::new();
    for &(width, value) in &fields {
        writer.write(width, value).unwrap();
    }
    let total_bits: u64 = fields.iter().map(|&(w, _)| w as u64).sum();
    assert_eq!(writer.bits_written(), total_bits);

    let bytes = writer.into_bytes().unwrap();
    assert_eq!(bytes.len() as u64, (total_bits + 7) / 8);

    let mut reader = BitReader::new(&bytes);
    for &(width, value) in &fields {
        assert_eq!(reader.read(width).unwrap(), value);
    }
    assert!(reader.remaining_bits() < 8);
}

#[test]
fn test_golomb_random_values() {
    let mut rng = StdRng::seed_from_u64(99);
    for log_p in [0u32, 1, 5, 10, 20, 31] {
        let codec = GolombRice::new(1u64 << log_p).unwrap();
        let values: Vec<u64> = (0..500)
            .map(|_| rng.gen_range(0..64u64) * codec.p() + rng.gen_range(0..codec.p()))
            .collect();

        let mut encoder = GolombEncoder::new(codec);
        for &v in &values {
            encoder.encode(v).unwrap();
        }
        let expected_bits: u64 = values.iter().map(|&v| codec.encoded_bits(v)).sum();
        assert_eq!(encoder.bits_written(), expected_bits);

        let bytes = encoder.finish().unwrap();
        let decoded: Vec<u64> = GolombDecoder::new(&bytes, codec).take(values.len()).collect();
        assert_eq!(decoded, values);
    }
}

#[test]
fn test_scan_stops_at_first_sum_reaching_target() {
    let mut rng = StdRng::seed_from_u64(3);
    let filter = build(words("scan", 400), 400, 128).unwrap();
    let gcs = GcsQuery::new(filter).unwrap();
    let range = gcs.params().range();

    let stored: Vec<u64> = gcs.values().collect();
    assert!(stored.windows(2).all(|w| w[0] < w[1]));

    let mut targets: Vec<u64> = (0..2000).map(|_| rng.gen_range(1..range)).collect();
    targets.extend(stored.iter().copied().step_by(7));
    targets.push(range - 1);

    for target in targets {
        let trace = gcs.scan(target);
        let rank = stored.partition_point(|&v| v < target);

        if rank == stored.len() {
            assert_eq!(trace.outcome, QueryOutcome::Exhausted);
            assert_eq!(trace.deltas_consumed, stored.len() as u64);
        } else {
            assert_eq!(trace.deltas_consumed, rank as u64 + 1);
            if stored[rank] == target {
                assert_eq!(trace.outcome, QueryOutcome::Found);
            } else {
                assert_eq!(trace.outcome, QueryOutcome::Overshot);
            }
        }
    }
}

#[test]
fn test_large_p_and_n() {
    let members = words("big", 50);
    let filter = build(&members, u32::MAX, 1 << 31).unwrap();
    let gcs = GcsQuery::new(filter).unwrap();
    assert_eq!(gcs.params().range(), u32::MAX as u64 * (1u64 << 31));
    for word in &members {
        assert!(gcs.query(word));
    }
}

#[test]
fn test_filter_file_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("table.gcs");

    let members = words("disk", 1000);
    let mut builder = GcsBuilder::new(1000, 1024).unwrap();
    builder.extend(&members);
    let (filter, info) = builder.finish().unwrap();
    write_filter(&path, &filter).unwrap();

    let loaded = read_filter(&path).unwrap();
    assert_eq!(loaded.len() as u64, info.filter_bytes);

    let gcs = GcsQuery::open(&path).unwrap();
    assert!(members.iter().all(|w| gcs.query(w)));
    // roughly log2(P) + 2 bits per item
    assert!(info.bits_per_item > 10.0 && info.bits_per_item < 14.0);
}

#[test]
fn test_concurrent_queries() {
    let members = words("shared", 2000);
    let gcs = Arc::new(GcsQuery::new(build(&members, 2000, 512).unwrap()).unwrap());
    let members = Arc::new(members);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let gcs = Arc::clone(&gcs);
            let members = Arc::clone(&members);
            thread::spawn(move || {
                members
                    .iter()
                    .skip(t)
                    .step_by(4)
                    .filter(|w| !gcs.query(w))
                    .count()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 0);
    }
}

#[test]
fn test_corrupted_payload_never_panics() {
    let mut rng = StdRng::seed_from_u64(11);
    let filter = build(words("fuzz", 200), 200, 64).unwrap();

    for _ in 0..200 {
        let mut corrupted = filter.to_vec();
        let idx = rng.gen_range(8..corrupted.len());
        corrupted[idx] ^= 1 << rng.gen_range(0..8);
        let gcs = GcsQuery::new(corrupted).unwrap();
        for word in words("fuzz", 20) {
            let _ = gcs.query(&word);
        }
    }
}

// Property-based testing
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_bitstream_roundtrip(fields in prop::collection::vec((1u32..=64, any::<u64>()), 0..200)) {
            let fields: Vec<(u32, u64)> = fields
                .into_iter()
                .map(|(width, value)| (width, if width == 64 { value } else { value & ((1u64 << width) - 1) }))
                .collect();

            let mut writer = BitWriter::new();
            for &(width, value) in &fields {
                writer.write(width, value).unwrap();
            }
            let total_bits: u64 = fields.iter().map(|&(w, _)| w as u64).sum();
            let bytes = writer.into_bytes().unwrap();
            prop_assert_eq!(bytes.len() as u64, (total_bits + 7) / 8);

            let mut reader = BitReader::new(&bytes);
            for &(width, value) in &fields {
                prop_assert_eq!(reader.read(width).unwrap(), value);
            }
        }

        #[test]
        fn test_golomb_roundtrip(log_p in 0u32..=24, parts in prop::collection::vec((0u64..40, any::<u64>()), 1..64)) {
            let codec = GolombRice::new(1u64 << log_p).unwrap();
            let values: Vec<u64> = parts
                .iter()
                .map(|&(q, r)| q * codec.p() + (r & (codec.p() - 1)))
                .collect();

            let mut encoder = GolombEncoder::new(codec);
            for &v in &values {
                encoder.encode(v).unwrap();
            }
            let bytes = encoder.finish().unwrap();
            let decoded: Vec<u64> = GolombDecoder::new(&bytes, codec).take(values.len()).collect();
            prop_assert_eq!(decoded, values);
        }

        #[test]
        fn test_members_always_found(items in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 1..100), log_p in 0u32..=12) {
            let n = items.len() as u32;
            let filter = build(&items, n, 1 << log_p).unwrap();
            let gcs = GcsQuery::new(filter).unwrap();
            for item in &items {
                prop_assert!(gcs.query(item));
            }
        }
    }
}
