use super::*;

fn inclusive(ranges: &[FrameRange]) -> Vec<(u64, u64)> {
    ranges
        .iter()
        .map(|r| (r.start.0, r.last().map(|l| l.0).unwrap_or(r.start.0)))
        .collect()
}

fn assert_exact_cover(ranges: &[FrameRange], frame_count: u64) {
    let mut seen = vec![0u32; frame_count as usize];
    for r in ranges {
        for f in r.iter() {
            seen[f.0 as usize] += 1;
        }
    }
    assert!(
        seen.iter().all(|&n| n == 1),
        "frame_count={frame_count} ranges={ranges:?}"
    );
}

#[test]
fn ten_frames_three_workers_last_absorbs_remainder() {
    let ranges = partition(10, 3).unwrap();
    assert_eq!(inclusive(&ranges), vec![(0, 2), (3, 5), (6, 9)]);
}

#[test]
fn hundred_frames_four_workers_is_even() {
    let ranges = partition(100, 4).unwrap();
    assert_eq!(
        inclusive(&ranges),
        vec![(0, 24), (25, 49), (50, 74), (75, 99)]
    );
}

#[test]
fn naive_split_can_be_heavily_imbalanced() {
    // 11 / 6 = 1: five workers get one frame, the last gets six.
    let ranges = partition(11, 6).unwrap();
    let lens: Vec<u64> = ranges.iter().map(|r| r.len_frames()).collect();
    assert_eq!(lens, vec![1, 1, 1, 1, 1, 6]);
}

#[test]
fn more_workers_than_frames_leaves_leading_ranges_empty() {
    let ranges = partition(2, 4).unwrap();
    assert_eq!(ranges.len(), 4);
    assert!(ranges[..3].iter().all(|r| r.is_empty()));
    assert_eq!(ranges[3].to_string(), "[0, 1]");
}

#[test]
fn zero_frames_yields_only_empty_ranges() {
    let ranges = partition(0, 3).unwrap();
    assert_eq!(ranges.len(), 3);
    assert!(ranges.iter().all(|r| r.is_empty()));
}

#[test]
fn zero_workers_is_rejected() {
    assert!(partition(10, 0).is_err());
    assert!(partition_balanced(10, 0).is_err());
}

#[test]
fn both_policies_cover_every_frame_exactly_once() {
    for frame_count in 1..=64u64 {
        for workers in 1..=12usize {
            for policy in [PartitionPolicy::Naive, PartitionPolicy::Balanced] {
                let ranges = policy.split(frame_count, workers).unwrap();
                assert_eq!(ranges.len(), workers);
                assert_exact_cover(&ranges, frame_count);
                for pair in ranges.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start, "ranges must be contiguous");
                }
            }
        }
    }
}

#[test]
fn balanced_lengths_differ_by_at_most_one() {
    let ranges = partition_balanced(11, 6).unwrap();
    let lens: Vec<u64> = ranges.iter().map(|r| r.len_frames()).collect();
    assert_eq!(lens, vec![2, 2, 2, 2, 2, 1]);
    assert_eq!(
        inclusive(&partition_balanced(10, 3).unwrap()),
        vec![(0, 3), (4, 6), (7, 9)]
    );
}

#[test]
fn policy_deserializes_from_snake_case() {
    let p: PartitionPolicy = serde_json::from_str("\"balanced\"").unwrap();
    assert_eq!(p, PartitionPolicy::Balanced);
    assert_eq!(PartitionPolicy::default(), PartitionPolicy::Naive);
}
