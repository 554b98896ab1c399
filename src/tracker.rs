use crate::errors::CoreResult;
use crate::history::{self, HistoryCache, SeedMode};
use crate::models::{DayRecord, Habit, HabitDetail, HistoryView, Overview, Period};
use crate::repository::HabitRepository;
use crate::stats::{percent_complete, statistics, todays_score};
use crate::storage::KeyValueStore;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Habit roster and history over one store.
///
/// The live roster is authoritative for the current day: every roster change and every
/// history read rewrites today's [`DayRecord`] from the roster when they differ.
pub struct Tracker<S> {
    habits: HabitRepository<S>,
    history: HistoryCache,
}

impl<S: KeyValueStore> Tracker<S> {
    pub fn new(store: S, seed: SeedMode) -> Self {
        Self::with_history(store, HistoryCache::new(seed))
    }

    pub fn with_history(store: S, history: HistoryCache) -> Self {
        Self {
            habits: HabitRepository::new(store),
            history,
        }
    }

    pub fn repository(&self) -> &HabitRepository<S> {
        &self.habits
    }

    pub fn overview(&self) -> CoreResult<Overview> {
        let (habits, fault) = match self.habits.try_list() {
            Ok(habits) => (habits, None),
            Err(err) if err.is_corrupt() => (self.habits.list()?, Some(err.to_string())),
            Err(err) => return Err(err),
        };

        let score = todays_score(&habits);
        let total = habits.len() as u32;
        Ok(Overview {
            score,
            total,
            percent: percent_complete(score, total),
            habits,
            fault,
        })
    }

    pub fn create(&mut self, name: &str, emoji: &str, today: NaiveDate) -> CoreResult<Option<Habit>> {
        let created = self.habits.create(name, emoji)?;
        if let Some(habit) = &created {
            info!(id = %habit.id, name = %habit.name, "habit created");
            self.sync_today(today)?;
        }
        Ok(created)
    }

    pub fn rename(&mut self, id: &str, name: &str, emoji: &str, today: NaiveDate) -> CoreResult<bool> {
        let changed = self.habits.rename(id, name, emoji)?;
        self.after_mutation("renamed", id, changed, today)
    }

    pub fn delete(&mut self, id: &str, today: NaiveDate) -> CoreResult<bool> {
        let changed = self.habits.delete(id)?;
        self.after_mutation("deleted", id, changed, today)
    }

    pub fn toggle_completion(&mut self, id: &str, today: NaiveDate) -> CoreResult<bool> {
        let changed = self.habits.toggle_completion(id)?;
        self.after_mutation("toggled", id, changed, today)
    }

    /// Trailing `period` of history with its statistics.
    pub fn history(&mut self, period: Period, today: NaiveDate) -> CoreResult<HistoryView> {
        self.sync_today(today)?;
        let dataset = self.history.ensure_dataset(self.habits.store_mut(), today)?;
        let days = history::slice(dataset, period.days()).to_vec();
        Ok(HistoryView {
            period,
            stats: statistics(&days),
            days,
        })
    }

    pub fn day(&mut self, date: NaiveDate, today: NaiveDate) -> CoreResult<Option<DayRecord>> {
        self.sync_today(today)?;
        let dataset = self.history.ensure_dataset(self.habits.store_mut(), today)?;
        Ok(history::find_by_date(dataset, date).cloned())
    }

    /// Discards the dataset, regenerates it, and re-records today from the roster.
    pub fn reset_history(&mut self, today: NaiveDate) -> CoreResult<()> {
        self.history.invalidate(self.habits.store_mut())?;
        info!("history reset");
        self.sync_today(today)
    }

    fn after_mutation(&mut self, action: &str, id: &str, changed: bool, today: NaiveDate) -> CoreResult<bool> {
        if changed {
            info!(%id, "habit {action}");
            self.sync_today(today)?;
        } else {
            debug!(%id, "habit not {action}: no-op");
        }
        Ok(changed)
    }

    /// A corrupt roster is never recorded; today's record keeps its last good snapshot.
    fn sync_today(&mut self, today: NaiveDate) -> CoreResult<()> {
        let habits = match self.habits.try_list() {
            Ok(habits) => habits,
            Err(err) if err.is_corrupt() => {
                warn!("{err}; not recording today's history");
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let details: Vec<HabitDetail> = habits.iter().map(HabitDetail::from).collect();
        let dataset = self.history.ensure_dataset(self.habits.store_mut(), today)?;
        let current = history::find_by_date(dataset, today);
        if current.is_some_and(|day| day.habit_details == details) {
            return Ok(());
        }
        self.history
            .record_day(self.habits.store_mut(), today, today, details)
    }
}
