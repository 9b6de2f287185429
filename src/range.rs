use {
    crate::RingPosition,
    num_traits::Bounded,
    std::ops::{RangeFrom, RangeTo},
};

/// A (half-open) range of ring positions, `[start..end)`.
///
/// If `start >= end`, the range wraps past the top of the ring and covers
/// `[start..MAX_VALUE]` together with `[0..end)`. The special case
/// `start == end` covers the whole ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyRange<Idx = RingPosition>
where
    Idx: Bounded,
{
    pub start: Idx,
    pub end: Idx,
}

impl<Idx: Bounded> KeyRange<Idx> {
    pub fn new(start: Idx, end: Idx) -> Self {
        Self { start, end }
    }
}

impl<Idx> KeyRange<Idx>
where
    Idx: Bounded + Ord,
{
    /// Returns `true` if `start >= end`.
    pub fn is_inverted(&self) -> bool {
        self.start >= self.end
    }

    /// Returns `true` if the range ends exactly at the origin.
    ///
    /// Such a range is inverted but does not actually cross zero.
    pub fn ends_at_origin(&self) -> bool {
        self.end == Idx::min_value()
    }

    /// Returns `true` if the range crosses the origin.
    pub fn is_wrapping(&self) -> bool {
        self.is_inverted() && !self.ends_at_origin()
    }

    pub fn covers_whole_ring(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if `item` falls into the range.
    pub fn contains(&self, item: &Idx) -> bool {
        if self.is_inverted() {
            self.range_from().contains(&item) || self.range_to().contains(&item)
        } else {
            self.range_from().contains(&item) && self.range_to().contains(&item)
        }
    }

    /// Joins `other` onto the end of this range, if it starts exactly where
    /// this one ends.
    pub fn joined(&self, other: &Self) -> Option<Self>
    where
        Idx: Clone,
    {
        if self.covers_whole_ring() || other.covers_whole_ring() || self.end != other.start {
            return None;
        }
        Some(Self::new(self.start.clone(), other.end.clone()))
    }

    fn range_from(&self) -> RangeFrom<&Idx> {
        &self.start..
    }

    fn range_to(&self) -> RangeTo<&Idx> {
        ..&self.end
    }
}

impl KeyRange<RingPosition> {
    /// Returns the range of keys owned by a placement at `pos`, given the
    /// placement `prev` immediately preceding it on the ring.
    ///
    /// A key hashing to `h` belongs to the first placement `>= h`, so the
    /// placement owns `(prev, pos]`, i.e. `[prev + 1, pos + 1)` on the ring.
    pub fn owned_by(prev: RingPosition, pos: RingPosition) -> Self {
        Self::new(prev.wrapping_add(1), pos.wrapping_add(1))
    }

    /// Number of positions covered by the range.
    ///
    /// The whole ring is reported as `RingPosition::MAX`, since its true size
    /// does not fit.
    pub fn size(&self) -> RingPosition {
        if self.covers_whole_ring() {
            RingPosition::MAX
        } else {
            self.end.wrapping_sub(self.start)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains() {
        let range = KeyRange::new(10u64, 5);
        assert!(range.is_wrapping());
        assert!(range.contains(&0));
        assert!(range.contains(&4));
        assert!(!range.contains(&5));
        assert!(!range.contains(&9));
        assert!(range.contains(&10));
        assert!(range.contains(&u64::MAX));

        let range = KeyRange::new(5u64, 10);
        assert!(!range.is_wrapping());
        assert!(!range.contains(&4));
        assert!(range.contains(&5));
        assert!(range.contains(&9));
        assert!(!range.contains(&10));

        let range = KeyRange::new(u64::MAX - 5, 0);
        assert!(range.ends_at_origin());
        assert!(!range.is_wrapping());
        assert!(range.contains(&u64::MAX));
        assert!(!range.contains(&0));
    }

    #[test]
    fn ownership() {
        // Inclusive at the placement, exclusive at its predecessor.
        let range = KeyRange::owned_by(100, 200);
        assert!(!range.contains(&100));
        assert!(range.contains(&101));
        assert!(range.contains(&200));
        assert!(!range.contains(&201));
        assert_eq!(range.size(), 100);

        // Placement at the very top of the ring.
        let range = KeyRange::owned_by(100, u64::MAX);
        assert!(range.ends_at_origin());
        assert!(range.contains(&u64::MAX));
        assert!(!range.contains(&0));

        // Lowest placement owns everything past the highest one.
        let range = KeyRange::owned_by(u64::MAX - 10, 10);
        assert!(range.is_wrapping());
        assert!(range.contains(&u64::MAX));
        assert!(range.contains(&0));
        assert!(range.contains(&10));
        assert!(!range.contains(&11));
        assert_eq!(range.size(), 21);

        // A lone placement owns the whole ring.
        let range = KeyRange::owned_by(42, 42);
        assert!(range.covers_whole_ring());
        assert!(range.contains(&0));
        assert!(range.contains(&u64::MAX));
        assert_eq!(range.size(), u64::MAX);
    }

    #[test]
    fn joined() {
        let a = KeyRange::new(5u64, 10);
        let b = KeyRange::new(10u64, 20);
        assert_eq!(a.joined(&b), Some(KeyRange::new(5, 20)));
        assert_eq!(b.joined(&a), None);

        let wrapping = KeyRange::new(u64::MAX - 10, 5);
        assert_eq!(wrapping.joined(&a), Some(KeyRange::new(u64::MAX - 10, 10)));

        let whole = KeyRange::new(7u64, 7);
        assert_eq!(whole.joined(&a), None);
    }
}
