use crate::catalog::seed_habits;
use crate::errors::{CoreError, CoreResult};
use crate::models::Habit;
use crate::storage::KeyValueStore;
use chrono::{SecondsFormat, Utc};
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, warn};

pub const HABITS_KEY: &str = "habitTrackerHabits";

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_RANDOM_LEN: usize = 9;

/// Habit roster persisted as one JSON array. Every mutation rewrites the whole roster.
pub struct HabitRepository<S> {
    store: S,
    seeded_at: String,
}

impl<S: KeyValueStore> HabitRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            seeded_at: iso_timestamp(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Stored roster, or the seed roster if nothing is stored yet.
    ///
    /// Fails with [`CoreError::CorruptState`] when the stored text does not decode
    /// or repeats an id.
    pub fn try_list(&self) -> CoreResult<Vec<Habit>> {
        match self.store.get(HABITS_KEY)? {
            Some(text) => decode_roster(&text),
            None => Ok(seed_habits(&self.seeded_at)),
        }
    }

    /// Like [`try_list`](Self::try_list), but a corrupt roster falls back to the seed roster.
    pub fn list(&self) -> CoreResult<Vec<Habit>> {
        match self.try_list() {
            Err(err) if err.is_corrupt() => {
                warn!("{err}; falling back to seed habits");
                Ok(seed_habits(&self.seeded_at))
            }
            other => other,
        }
    }

    /// Adds a habit. Returns `None` without touching storage when the trimmed name is empty.
    pub fn create(&mut self, name: &str, emoji: &str) -> CoreResult<Option<Habit>> {
        self.create_with(name, emoji, &mut rand::thread_rng())
    }

    pub fn create_with<R: Rng + ?Sized>(
        &mut self,
        name: &str,
        emoji: &str,
        rng: &mut R,
    ) -> CoreResult<Option<Habit>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let mut habits = self.list()?;
        let id = loop {
            let candidate = generate_id(Utc::now().timestamp_millis(), rng);
            if !habits.iter().any(|habit| habit.id == candidate) {
                break candidate;
            }
        };

        let habit = Habit {
            id,
            name: name.to_string(),
            emoji: emoji.trim().to_string(),
            completed: false,
            created_at: iso_timestamp(),
        };
        habits.push(habit.clone());
        self.save(&habits)?;
        debug!(id = %habit.id, "created habit");
        Ok(Some(habit))
    }

    /// Replaces name and emoji. No-op on an empty trimmed name or an unknown id.
    pub fn rename(&mut self, id: &str, name: &str, emoji: &str) -> CoreResult<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        self.update(|habits| match habits.iter_mut().find(|habit| habit.id == id) {
            Some(habit) => {
                habit.name = name.to_string();
                habit.emoji = emoji.trim().to_string();
                true
            }
            None => false,
        })
    }

    pub fn delete(&mut self, id: &str) -> CoreResult<bool> {
        self.update(|habits| {
            let before = habits.len();
            habits.retain(|habit| habit.id != id);
            habits.len() != before
        })
    }

    pub fn toggle_completion(&mut self, id: &str) -> CoreResult<bool> {
        self.update(|habits| match habits.iter_mut().find(|habit| habit.id == id) {
            Some(habit) => {
                habit.completed = !habit.completed;
                true
            }
            None => false,
        })
    }

    fn update(&mut self, apply: impl FnOnce(&mut Vec<Habit>) -> bool) -> CoreResult<bool> {
        let mut habits = self.list()?;
        if !apply(&mut habits) {
            return Ok(false);
        }
        self.save(&habits)?;
        Ok(true)
    }

    fn save(&mut self, habits: &[Habit]) -> CoreResult<()> {
        let text = serde_json::to_string(habits).map_err(|source| CoreError::Encode {
            key: HABITS_KEY.to_string(),
            source,
        })?;
        self.store.set(HABITS_KEY, text)
    }
}

fn decode_roster(text: &str) -> CoreResult<Vec<Habit>> {
    let habits: Vec<Habit> =
        serde_json::from_str(text).map_err(|err| CoreError::corrupt(HABITS_KEY, err))?;
    {
        let mut seen = HashSet::with_capacity(habits.len());
        for habit in &habits {
            if !seen.insert(habit.id.as_str()) {
                return Err(CoreError::corrupt(
                    HABITS_KEY,
                    format!("duplicate habit id '{}'", habit.id),
                ));
            }
        }
    }
    Ok(habits)
}

/// Millisecond timestamp followed by nine random base-36 characters.
///
/// Unique enough for one local user; not collision-resistant.
pub fn generate_id<R: Rng + ?Sized>(now_millis: i64, rng: &mut R) -> String {
    let suffix: String = (0..ID_RANDOM_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{now_millis}{suffix}")
}

fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
