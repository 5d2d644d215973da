use crate::BuildError;
use std::ops::Range;

/// Static split of `0..number_of_items` into one contiguous range per worker.
///
/// Ranges differ in length by at most one, the longer ranges going to the lower ranks.
/// When there are more workers than items the trailing workers receive empty ranges and
/// are counted as inactive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    ranges: Vec<Range<usize>>,
}

impl Partition {
    pub fn new(number_of_items: usize, number_of_workers: usize) -> Result<Self, BuildError> {
        if number_of_workers == 0 {
            return Err(BuildError::NoWorkers);
        }
        let base = number_of_items / number_of_workers;
        let remainder = number_of_items % number_of_workers;

        let mut start = 0;
        let ranges = (0..number_of_workers)
            .map(|rank| {
                let length = base + usize::from(rank < remainder);
                let range = start..start + length;
                start += length;
                range
            })
            .collect();
        Ok(Self { ranges })
    }

    pub fn range(&self, rank: usize) -> Range<usize> {
        self.ranges[rank].clone()
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn number_of_workers(&self) -> usize {
        self.ranges.len()
    }

    /// Workers holding at least one item
    pub fn active_workers(&self) -> usize {
        self.ranges.iter().filter(|range| !range.is_empty()).count()
    }
}

#[cfg(test)]
mod test {
    use super::Partition;
    use crate::BuildError;
    use proptest::prelude::*;

    fn assert_exact_cover(partition: &Partition, number_of_items: usize) {
        let mut next = 0;
        for range in partition.ranges() {
            if range.is_empty() {
                continue;
            }
            assert_eq!(range.start, next, "gap or overlap before {:?}", range);
            next = range.end;
        }
        assert_eq!(next, number_of_items);
    }

    #[test]
    fn zero_workers_is_a_construction_error() {
        assert!(matches!(Partition::new(10, 0), Err(BuildError::NoWorkers)));
        assert!(matches!(Partition::new(0, 0), Err(BuildError::NoWorkers)));
    }

    #[test]
    fn zero_items_leaves_every_worker_inactive() {
        let partition = Partition::new(0, 4).unwrap();
        assert_eq!(partition.active_workers(), 0);
        assert!(partition.ranges().iter().all(|range| range.is_empty()));
    }

    #[test]
    fn fewer_items_than_workers_gives_empty_trailing_ranges() {
        let partition = Partition::new(3, 5).unwrap();
        assert_eq!(partition.active_workers(), 3);
        assert_eq!(partition.range(0), 0..1);
        assert_eq!(partition.range(2), 2..3);
        assert!(partition.range(3).is_empty());
        assert!(partition.range(4).is_empty());
        assert_exact_cover(&partition, 3);
    }

    #[test]
    fn uneven_split_differs_by_at_most_one() {
        let partition = Partition::new(10, 4).unwrap();
        let lengths: Vec<usize> = partition.ranges().iter().map(|range| range.len()).collect();
        assert_eq!(lengths, vec![3, 3, 2, 2]);
        assert_exact_cover(&partition, 10);
    }

    proptest! {
        #[test]
        fn ranges_partition_the_items(items in 0usize..500, workers in 1usize..64) {
            let partition = Partition::new(items, workers).unwrap();
            prop_assert_eq!(partition.number_of_workers(), workers);
            prop_assert_eq!(partition.active_workers(), items.min(workers));
            let lengths: Vec<usize> = partition.ranges().iter().map(|range| range.len()).collect();
            let longest = lengths.iter().copied().max().unwrap_or(0);
            let shortest = lengths.iter().copied().min().unwrap_or(0);
            prop_assert!(longest - shortest <= 1);
            prop_assert_eq!(lengths.iter().sum::<usize>(), items);
            assert_exact_cover(&partition, items);
        }
    }
}
