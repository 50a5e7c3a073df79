//! Fixed-width time buckets.
//!
//! Buckets are aligned to UTC midnight. Bucket `i` covers
//! `[start + i * width, start + (i + 1) * width)`.

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Width of a single bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketWidth {
    Day,
    Week,
}

impl BucketWidth {
    /// Width in whole days.
    #[must_use]
    pub const fn days(self) -> i64 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
        }
    }
}

/// `count` contiguous buckets of the same width starting at `start`.
///
/// ```
/// use chrono::NaiveDate;
/// use foodbridge_core::analytics::{BucketWidth, Buckets};
///
/// let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// let days = Buckets::ending_on(today, BucketWidth::Day, 3);
/// assert_eq!(days.labels(), ["2025-03-08", "2025-03-09", "2025-03-10"]);
/// assert_eq!(days.index_of_date(today), Some(2));
/// assert_eq!(days.index_of_date(today.succ_opt().unwrap()), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buckets {
    start: NaiveDate,
    width: BucketWidth,
    count: usize,
}

impl Buckets {
    #[must_use]
    pub const fn new(start: NaiveDate, width: BucketWidth, count: usize) -> Self {
        Self {
            start,
            width,
            count,
        }
    }

    /// Buckets whose last one starts on `last`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn ending_on(last: NaiveDate, width: BucketWidth, count: usize) -> Self {
        let back = count.saturating_sub(1) as i64 * width.days();
        let start = last - Duration::days(back);
        Self::new(start, width, count)
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn width(&self) -> BucketWidth {
        self.width
    }

    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// First day of bucket `index`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn bucket_start(&self, index: usize) -> NaiveDate {
        let offset = index as i64 * self.width.days();
        self.start + Duration::days(offset)
    }

    /// Exclusive end of the last bucket.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.bucket_start(self.count)
    }

    /// Index of the bucket containing `date`, if any.
    #[must_use]
    pub fn index_of_date(&self, date: NaiveDate) -> Option<usize> {
        let elapsed = (date - self.start).num_days();
        if elapsed < 0 {
            return None;
        }
        let index = usize::try_from(elapsed / self.width.days()).ok()?;
        (index < self.count).then_some(index)
    }

    /// Index of the bucket containing the UTC calendar date of `at`.
    #[must_use]
    pub fn index_of(&self, at: DateTime<Utc>) -> Option<usize> {
        self.index_of_date(at.date_naive())
    }

    /// ISO-8601 date label for every bucket.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        (0..self.count)
            .map(|i| self.bucket_start(i).to_string())
            .collect()
    }

    /// Count timestamps per bucket; timestamps outside every bucket are ignored.
    pub fn tally<I>(&self, stamps: I) -> Vec<usize>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut counts = vec![0; self.count];
        for at in stamps {
            if let Some(slot) = self.index_of(at).and_then(|i| counts.get_mut(i)) {
                *slot += 1;
            }
        }
        counts
    }
}
