use crate::months::Month;
use crate::schema::InstallmentRecord;
use log::debug;

/// Installments grouped by the month-of-year of their due date.
///
/// Always holds exactly twelve buckets in reporting order. Years are merged: a record
/// due 2023-03-10 and one due 2024-03-28 share the Marzo bucket. Records without a due
/// date are not placed anywhere; their count is kept in [`MonthlyBuckets::dropped`].
#[derive(Debug, Clone)]
pub struct MonthlyBuckets<'a> {
    buckets: [Vec<&'a InstallmentRecord>; 12],
    dropped: usize,
}

impl<'a> MonthlyBuckets<'a> {
    pub fn from_records(records: &'a [InstallmentRecord]) -> Self {
        Self::from_filtered(records, |_| true)
    }

    /// Buckets only the records accepted by `keep`.
    pub fn from_filtered<F>(records: &'a [InstallmentRecord], keep: F) -> Self
    where
        F: Fn(&InstallmentRecord) -> bool,
    {
        let mut buckets: [Vec<&'a InstallmentRecord>; 12] = Default::default();
        let mut dropped = 0;

        for record in records.iter().filter(|r| keep(*r)) {
            match record.due_date {
                Some(due) => buckets[Month::from_date(due).index()].push(record),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!("{} installment(s) without due date left out of monthly buckets", dropped);
        }

        Self { buckets, dropped }
    }

    pub fn get(&self, month: Month) -> &[&'a InstallmentRecord] {
        &self.buckets[month.index()]
    }

    pub fn len(&self, month: Month) -> usize {
        self.buckets[month.index()].len()
    }

    /// Buckets in reporting order, Enero first.
    pub fn iter(&self) -> impl Iterator<Item = (Month, &[&'a InstallmentRecord])> + '_ {
        Month::ALL
            .iter()
            .map(move |month| (*month, self.get(*month)))
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Sums `f` over each bucket's records.
    pub fn sum_by<F>(&self, f: F) -> [f64; 12]
    where
        F: Fn(&InstallmentRecord) -> f64,
    {
        let mut sums = [0.0; 12];
        for (month, records) in self.iter() {
            sums[month.index()] = records.iter().map(|r| f(*r)).sum();
        }
        sums
    }

    /// Owned copy of the grouping, keyed by month name.
    pub fn to_named_lists(&self) -> Vec<(Month, Vec<InstallmentRecord>)> {
        self.iter()
            .map(|(month, records)| (month, records.iter().map(|r| (*r).clone()).collect()))
            .collect()
    }
}
