use crate::catalog::demo_catalog;
use crate::errors::{CoreError, CoreResult};
use crate::models::{DayRecord, HabitDetail};
use crate::storage::KeyValueStore;
use chrono::{Duration, NaiveDate};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use std::str::FromStr;
use tracing::{debug, info, warn};

pub const DATASET_KEY: &str = "habitTracker_90DaysData";
pub const DATASET_DAYS: usize = 90;

/// How days are filled when no dataset exists yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedMode {
    /// Random completions drawn from the demo catalog.
    #[default]
    Demo,
    /// Every day scores zero.
    Blank,
}

impl FromStr for SeedMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(SeedMode::Demo),
            "blank" => Ok(SeedMode::Blank),
            other => Err(format!("unknown history seed '{other}'")),
        }
    }
}

/// Owns the historical dataset for the session.
///
/// The dataset is loaded from the store or synthesized once, then served from memory
/// until [`invalidate`](Self::invalidate) is called.
pub struct HistoryCache {
    days: usize,
    seed: SeedMode,
    rng: StdRng,
    dataset: Option<Vec<DayRecord>>,
}

impl HistoryCache {
    pub fn new(seed: SeedMode) -> Self {
        Self::with_rng(seed, StdRng::from_entropy())
    }

    pub fn with_rng(seed: SeedMode, rng: StdRng) -> Self {
        Self {
            days: DATASET_DAYS,
            seed,
            rng,
            dataset: None,
        }
    }

    pub fn cached(&self) -> Option<&[DayRecord]> {
        self.dataset.as_deref()
    }

    /// Returns the dataset covering the days ending `today`, loading or synthesizing it on first use.
    pub fn ensure_dataset<S>(&mut self, store: &mut S, today: NaiveDate) -> CoreResult<&[DayRecord]>
    where
        S: KeyValueStore + ?Sized,
    {
        let dataset = match self.dataset.take() {
            Some(dataset) => dataset,
            None => match load_dataset(store)? {
                Some(dataset) => dataset,
                None => {
                    let dataset = self.generate(today);
                    save_dataset(store, &dataset)?;
                    info!(days = dataset.len(), seed = ?self.seed, "generated history");
                    dataset
                }
            },
        };

        let dataset = self.fit_window(store, dataset, today)?;
        Ok(self.dataset.insert(dataset).as_slice())
    }

    /// Replaces the record for `date` with the given roster snapshot.
    ///
    /// Dates outside the window ending `today` are ignored.
    pub fn record_day<S>(
        &mut self,
        store: &mut S,
        today: NaiveDate,
        date: NaiveDate,
        details: Vec<HabitDetail>,
    ) -> CoreResult<()>
    where
        S: KeyValueStore + ?Sized,
    {
        self.ensure_dataset(store, today)?;
        let Some(dataset) = self.dataset.as_mut() else {
            return Ok(());
        };

        let Ok(index) = dataset.binary_search_by_key(&date, |day| day.date) else {
            debug!(%date, %today, "ignoring record outside the history window");
            return Ok(());
        };
        dataset[index] = DayRecord::from_details(date, details);
        save_dataset(store, dataset)
    }

    /// Drops the cached and stored dataset; the next read regenerates it.
    pub fn invalidate<S>(&mut self, store: &mut S) -> CoreResult<()>
    where
        S: KeyValueStore + ?Sized,
    {
        self.dataset = None;
        store.remove(DATASET_KEY)?;
        debug!("history invalidated");
        Ok(())
    }

    fn generate(&mut self, today: NaiveDate) -> Vec<DayRecord> {
        (0..self.days)
            .rev()
            .map(|offset| {
                let date = today - Duration::days(offset as i64);
                let details = match self.seed {
                    SeedMode::Demo => random_day(&mut self.rng),
                    SeedMode::Blank => Vec::new(),
                };
                DayRecord::from_details(date, details)
            })
            .collect()
    }

    /// Reshapes `dataset` into exactly one record per day of the window ending `today`.
    ///
    /// Records dated after `today` or before the window are dropped. Missing days become
    /// zero-score records carrying the nearest earlier roster, all incomplete.
    fn fit_window<S>(
        &self,
        store: &mut S,
        dataset: Vec<DayRecord>,
        today: NaiveDate,
    ) -> CoreResult<Vec<DayRecord>>
    where
        S: KeyValueStore + ?Sized,
    {
        let start = today - Duration::days(self.days as i64 - 1);
        let fitted = dataset.len() == self.days
            && dataset.first().is_some_and(|day| day.date == start)
            && dataset.last().is_some_and(|day| day.date == today);
        if fitted {
            return Ok(dataset);
        }

        let mut roster = dataset
            .first()
            .map(|day| incomplete(&day.habit_details))
            .unwrap_or_default();
        let mut known = dataset.into_iter().filter(|day| day.date <= today).peekable();
        let mut window = Vec::with_capacity(self.days);
        for offset in (0..self.days).rev() {
            let date = today - Duration::days(offset as i64);
            while let Some(day) = known.next_if(|day| day.date < date) {
                roster = incomplete(&day.habit_details);
            }
            match known.next_if(|day| day.date == date) {
                Some(day) => {
                    roster = incomplete(&day.habit_details);
                    window.push(day);
                }
                None => window.push(DayRecord::from_details(date, roster.clone())),
            }
        }

        save_dataset(store, &window)?;
        debug!(%today, "fitted history window");
        Ok(window)
    }
}

fn incomplete(details: &[HabitDetail]) -> Vec<HabitDetail> {
    details
        .iter()
        .map(|detail| HabitDetail {
            completed: false,
            ..detail.clone()
        })
        .collect()
}

/// Trailing `period_days` records; the whole dataset when it is shorter.
pub fn slice(dataset: &[DayRecord], period_days: usize) -> &[DayRecord] {
    &dataset[dataset.len().saturating_sub(period_days)..]
}

pub fn find_by_date(dataset: &[DayRecord], date: NaiveDate) -> Option<&DayRecord> {
    dataset.iter().find(|day| day.date == date)
}

/// Demo catalog with a random number of randomly chosen habits completed, completed first.
fn random_day<R: Rng + ?Sized>(rng: &mut R) -> Vec<HabitDetail> {
    let mut details = demo_catalog();
    let completed = rng.gen_range(0..=details.len());
    details.shuffle(rng);
    for detail in details.iter_mut().take(completed) {
        detail.completed = true;
    }
    details
}

/// `None` when nothing usable is stored. Corrupt data is logged and treated as absent.
fn load_dataset<S>(store: &S) -> CoreResult<Option<Vec<DayRecord>>>
where
    S: KeyValueStore + ?Sized,
{
    let Some(text) = store.get(DATASET_KEY)? else {
        return Ok(None);
    };
    match decode_dataset(&text) {
        Ok(dataset) if dataset.is_empty() => Ok(None),
        Ok(dataset) => Ok(Some(dataset)),
        Err(err) => {
            warn!("{err}; regenerating history");
            Ok(None)
        }
    }
}

pub fn decode_dataset(text: &str) -> CoreResult<Vec<DayRecord>> {
    let dataset: Vec<DayRecord> =
        serde_json::from_str(text).map_err(|err| CoreError::corrupt(DATASET_KEY, err))?;
    if let Some(pair) = dataset.windows(2).find(|pair| pair[0].date >= pair[1].date) {
        return Err(CoreError::corrupt(
            DATASET_KEY,
            format!("dates out of order at {}", pair[1].date),
        ));
    }
    Ok(dataset)
}

fn save_dataset<S>(store: &mut S, dataset: &[DayRecord]) -> CoreResult<()>
where
    S: KeyValueStore + ?Sized,
{
    let text = serde_json::to_string(dataset).map_err(|source| CoreError::Encode {
        key: DATASET_KEY.to_string(),
        source,
    })?;
    store.set(DATASET_KEY, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn cache(seed: SeedMode) -> HistoryCache {
        HistoryCache::with_rng(seed, StdRng::seed_from_u64(42))
    }

    #[test]
    fn generated_dataset_covers_ninety_days_ending_today() {
        let mut store = MemoryStore::new();
        let mut history = cache(SeedMode::Demo);
        let dataset = history.ensure_dataset(&mut store, today()).unwrap();

        assert_eq!(dataset.len(), DATASET_DAYS);
        assert_eq!(dataset.last().unwrap().date, today());
        assert_eq!(dataset[0].date, today() - Duration::days(89));
        for pair in dataset.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
        assert!(store.has(DATASET_KEY).unwrap());
    }

    #[test]
    fn demo_days_are_consistent_snapshots() {
        let mut store = MemoryStore::new();
        let mut history = cache(SeedMode::Demo);
        let dataset = history.ensure_dataset(&mut store, today()).unwrap();

        for day in dataset {
            assert_eq!(day.habit_details.len(), 8);
            assert!(day.total_score <= 8);
            assert_eq!(day.completed_habits.len() as u32, day.total_score);
            let leading = day.habit_details.iter().take_while(|d| d.completed).count();
            assert_eq!(leading as u32, day.total_score);
        }
    }

    #[test]
    fn second_call_returns_cached_dataset() {
        let mut store = MemoryStore::new();
        let mut history = cache(SeedMode::Demo);
        let first = history.ensure_dataset(&mut store, today()).unwrap().to_vec();
        let second = history.ensure_dataset(&mut store, today()).unwrap().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn stored_dataset_is_reused_by_a_fresh_cache() {
        let mut store = MemoryStore::new();
        let first = cache(SeedMode::Demo)
            .ensure_dataset(&mut store, today())
            .unwrap()
            .to_vec();

        let mut other = HistoryCache::with_rng(SeedMode::Demo, StdRng::seed_from_u64(9));
        let second = other.ensure_dataset(&mut store, today()).unwrap().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn blank_seed_scores_zero() {
        let mut store = MemoryStore::new();
        let mut history = cache(SeedMode::Blank);
        let dataset = history.ensure_dataset(&mut store, today()).unwrap();
        assert!(dataset.iter().all(|day| day.total_score == 0));
    }

    #[test]
    fn stale_dataset_is_shifted_to_end_today() {
        let mut store = MemoryStore::new();
        let three_days_ago = today() - Duration::days(3);
        let original = cache(SeedMode::Demo)
            .ensure_dataset(&mut store, three_days_ago)
            .unwrap()
            .to_vec();

        let mut history = cache(SeedMode::Demo);
        let dataset = history.ensure_dataset(&mut store, today()).unwrap();
        assert_eq!(dataset.len(), DATASET_DAYS);
        assert_eq!(dataset.last().unwrap().date, today());
        assert_eq!(dataset[..87], original[3..]);
        assert!(dataset[87..].iter().all(|day| day.total_score == 0));
    }

    #[test]
    fn corrupt_dataset_is_regenerated() {
        let mut store = MemoryStore::new();
        store.set(DATASET_KEY, "[{\"date\":".to_string()).unwrap();

        let mut history = cache(SeedMode::Demo);
        let dataset = history.ensure_dataset(&mut store, today()).unwrap();
        assert_eq!(dataset.len(), DATASET_DAYS);
        assert!(decode_dataset(&store.get(DATASET_KEY).unwrap().unwrap()).is_ok());
    }

    #[test]
    fn out_of_order_dates_are_corrupt() {
        let a = DayRecord::from_details(today(), Vec::new());
        let b = DayRecord::from_details(today() - Duration::days(1), Vec::new());
        let text = serde_json::to_string(&vec![a, b]).unwrap();
        assert!(decode_dataset(&text).unwrap_err().is_corrupt());
    }

    #[test]
    fn record_day_replaces_todays_entry() {
        let mut store = MemoryStore::new();
        let mut history = cache(SeedMode::Blank);
        let details = vec![HabitDetail {
            id: "1".to_string(),
            name: "Meditate".to_string(),
            emoji: "🧘‍♀️".to_string(),
            completed: true,
        }];
        history.record_day(&mut store, today(), today(), details).unwrap();

        let dataset = history.cached().unwrap();
        assert_eq!(dataset.len(), DATASET_DAYS);
        assert_eq!(dataset.last().unwrap().total_score, 1);
        let stored = decode_dataset(&store.get(DATASET_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored.last().unwrap().completed_habits, vec!["1"]);
    }

    #[test]
    fn invalidate_forces_regeneration() {
        let mut store = MemoryStore::new();
        let mut history = cache(SeedMode::Demo);
        history.ensure_dataset(&mut store, today()).unwrap();
        history.invalidate(&mut store).unwrap();

        assert!(history.cached().is_none());
        assert!(!store.has(DATASET_KEY).unwrap());
        assert_eq!(history.ensure_dataset(&mut store, today()).unwrap().len(), DATASET_DAYS);
    }

    #[test]
    fn slice_takes_trailing_days() {
        let mut store = MemoryStore::new();
        let mut history = cache(SeedMode::Demo);
        let dataset = history.ensure_dataset(&mut store, today()).unwrap();

        let week = slice(dataset, 7);
        assert_eq!(week.len(), 7);
        assert_eq!(week, &dataset[83..]);
        assert_eq!(slice(dataset, 365).len(), DATASET_DAYS);
        assert!(slice(&[], 7).is_empty());
    }

    #[test]
    fn find_by_date_is_exact() {
        let mut store = MemoryStore::new();
        let mut history = cache(SeedMode::Demo);
        let dataset = history.ensure_dataset(&mut store, today()).unwrap();

        let yesterday = today() - Duration::days(1);
        assert_eq!(find_by_date(dataset, yesterday).unwrap().date, yesterday);
        assert!(find_by_date(dataset, today() + Duration::days(1)).is_none());
    }

    fn stored(store: &mut MemoryStore, dates: impl IntoIterator<Item = NaiveDate>) -> Vec<DayRecord> {
        let details = vec![HabitDetail {
            id: "1".to_string(),
            name: "Meditate".to_string(),
            emoji: "🧘‍♀️".to_string(),
            completed: true,
        }];
        let dataset: Vec<DayRecord> = dates
            .into_iter()
            .map(|date| DayRecord::from_details(date, details.clone()))
            .collect();
        save_dataset(store, &dataset).unwrap();
        dataset
    }

    fn assert_window(dataset: &[DayRecord], end: NaiveDate) {
        assert_eq!(dataset.len(), DATASET_DAYS);
        assert_eq!(dataset.last().unwrap().date, end);
        for pair in dataset.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }

    #[test]
    fn short_dataset_is_padded_to_full_window() {
        let mut store = MemoryStore::new();
        let kept = stored(&mut store, (0..3).rev().map(|n| today() - Duration::days(n)));

        let mut history = cache(SeedMode::Demo);
        let dataset = history.ensure_dataset(&mut store, today()).unwrap();
        assert_window(dataset, today());
        assert_eq!(dataset[87..], kept[..]);
        assert!(dataset[..87].iter().all(|day| day.total_score == 0));
        assert_eq!(dataset[0].habit_details.len(), 1);

        let saved = decode_dataset(&store.get(DATASET_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved.len(), DATASET_DAYS);
    }

    #[test]
    fn future_days_are_dropped_when_the_clock_moves_back() {
        let mut store = MemoryStore::new();
        let tomorrow = today() + Duration::days(1);
        let kept = stored(&mut store, (0..90).rev().map(|n| tomorrow - Duration::days(n)));

        let mut history = cache(SeedMode::Demo);
        let dataset = history.ensure_dataset(&mut store, today()).unwrap();
        assert_window(dataset, today());
        assert_eq!(dataset[1..], kept[..89]);
        assert_eq!(dataset[0].total_score, 0);
        assert!(find_by_date(dataset, tomorrow).is_none());
    }

    #[test]
    fn gaps_inside_the_window_are_filled() {
        let mut store = MemoryStore::new();
        let dates = (0..90).rev().map(|n| today() - Duration::days(n)).filter(|d| *d != today() - Duration::days(10));
        stored(&mut store, dates);

        let mut history = cache(SeedMode::Demo);
        let dataset = history.ensure_dataset(&mut store, today()).unwrap();
        assert_window(dataset, today());
        let gap = find_by_date(dataset, today() - Duration::days(10)).unwrap();
        assert_eq!(gap.total_score, 0);
        assert_eq!(gap.habit_details.len(), 1);
    }

    #[test]
    fn record_day_ignores_dates_outside_the_window() {
        let mut store = MemoryStore::new();
        let mut history = cache(SeedMode::Blank);
        let before = history.ensure_dataset(&mut store, today()).unwrap().to_vec();

        let details = vec![HabitDetail {
            id: "1".to_string(),
            name: "Meditate".to_string(),
            emoji: "🧘‍♀️".to_string(),
            completed: true,
        }];
        let too_old = today() - Duration::days(DATASET_DAYS as i64);
        history.record_day(&mut store, today(), too_old, details.clone()).unwrap();
        history
            .record_day(&mut store, today(), today() + Duration::days(1), details)
            .unwrap();

        assert_eq!(history.cached().unwrap(), &before[..]);
    }
}
