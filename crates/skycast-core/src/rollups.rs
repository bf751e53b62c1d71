//! Per-day bucketing and rollup calculations over 3-hourly samples

use crate::types::WeatherSample;
use chrono::NaiveDate;

/// Reduction applied to one numeric column of a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rollup {
    Min,
    Max,
    Sum,
}

impl Rollup {
    /// Reduce `values`; `None` for an empty input
    pub fn apply<I>(self, values: I) -> Option<f64>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut iter = values.into_iter();
        let first = iter.next()?;
        Some(iter.fold(first, |acc, v| match self {
            Rollup::Min => acc.min(v),
            Rollup::Max => acc.max(v),
            Rollup::Sum => acc + v,
        }))
    }
}

/// All samples sharing one calendar date, in input order
#[derive(Debug, Clone)]
pub struct DayBucket<'a> {
    date: NaiveDate,
    samples: Vec<&'a WeatherSample>,
}

impl<'a> DayBucket<'a> {
    /// Buckets are only ever created from a sample, so they are never empty
    pub fn new(date: NaiveDate, first: &'a WeatherSample) -> Self {
        Self {
            date,
            samples: vec![first],
        }
    }

    pub fn push(&mut self, sample: &'a WeatherSample) {
        self.samples.push(sample);
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> &'a WeatherSample {
        self.samples[0]
    }

    /// Sample at index `len / 2`; this is the representative sample for the day
    pub fn middle(&self) -> &'a WeatherSample {
        self.samples[self.samples.len() / 2]
    }

    pub fn temperature(&self, rollup: Rollup) -> f64 {
        rollup
            .apply(self.samples.iter().map(|s| s.temperature))
            .unwrap_or_default()
    }

    /// Number of samples reporting measurable precipitation
    pub fn rainy_samples(&self) -> usize {
        self.samples.iter().filter(|s| s.reports_rain()).count()
    }

    /// Total precipitation across rain-reporting samples (mm), zero if none
    pub fn rainfall(&self) -> f64 {
        Rollup::Sum
            .apply(
                self.samples
                    .iter()
                    .filter(|s| s.reports_rain())
                    .filter_map(|s| s.precipitation_mm),
            )
            .unwrap_or(0.0)
    }
}

/// Group samples by calendar date in first-seen order.
///
/// Samples dated `skip` are ignored and at most `max_days` buckets are
/// produced; samples for any later date are discarded.
pub fn bucket_by_day(
    samples: &[WeatherSample],
    skip: NaiveDate,
    max_days: usize,
) -> Vec<DayBucket<'_>> {
    let mut buckets: Vec<DayBucket<'_>> = Vec::with_capacity(max_days);

    for sample in samples {
        let date = sample.timestamp.date_naive();
        if date == skip {
            continue;
        }
        match buckets.iter().position(|b| b.date == date) {
            Some(i) => buckets[i].push(sample),
            None if buckets.len() < max_days => buckets.push(DayBucket::new(date, sample)),
            None => {}
        }
    }

    buckets
}
