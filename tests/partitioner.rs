use vnring::{placement_key, DefaultPartitioner, Partitioner, Xxh3Partitioner, DEFAULT_SEED};

#[test]
fn default_partitioner() {
    let default = DefaultPartitioner::new();
    let seeded = Xxh3Partitioner::with_seed(DEFAULT_SEED);
    let inputs: [&[u8]; 4] = [b"", b"a", b"server-10", b"some longer key with spaces"];
    for data in inputs {
        assert_eq!(default.position(data), seeded.position(data));
    }
}

#[test]
fn deterministic() {
    // Fresh instances agree, there is no per-process randomness.
    let data = placement_key("server-1", 42);
    assert_eq!(
        Xxh3Partitioner::new().position(&data),
        Xxh3Partitioner::new().position(&data)
    );
}

#[test]
fn spreads_placements() {
    let partitioner = Xxh3Partitioner::new();
    let buckets = 16;
    let mut counts = vec![0usize; buckets];
    for i in 0..16_000 {
        let position = partitioner.position(&placement_key("node", i));
        counts[(position >> 60) as usize] += 1;
    }
    for (bucket, count) in counts.iter().enumerate() {
        assert!(
            (700..=1300).contains(count),
            "bucket {bucket} got {count} placements (expected ~1000)"
        );
    }
}

#[test]
fn distinct_placement_labels() {
    let partitioner = Xxh3Partitioner::new();
    let a = partitioner.position(&placement_key("server-1", 0));
    let b = partitioner.position(&placement_key("server-1", 1));
    let c = partitioner.position(&placement_key("server-2", 0));
    assert_ne!(a, b);
    assert_ne!(a, c);
    assert_ne!(b, c);
}
