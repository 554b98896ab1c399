use crate::models::{Habit, HabitDetail};

/// Sample habits: (id, name, emoji, completed).
const SEED_HABITS: [(&str, &str, &str, bool); 5] = [
    ("1", "Drink 8 glasses of water", "💧", false),
    ("2", "Exercise for 30 minutes", "🏃‍♂️", true),
    ("3", "Read for 20 minutes", "📚", false),
    ("4", "Meditate", "🧘‍♀️", true),
    ("5", "Write in journal", "✍️", false),
];

/// Habits used when synthesizing demo history. Superset of the seed roster.
const DEMO_CATALOG: [(&str, &str, &str); 8] = [
    ("1", "Drink 8 glasses of water", "💧"),
    ("2", "Exercise for 30 minutes", "🏃‍♂️"),
    ("3", "Read for 20 minutes", "📚"),
    ("4", "Meditate", "🧘‍♀️"),
    ("5", "Write in journal", "✍️"),
    ("6", "Eat healthy meals", "🥗"),
    ("7", "Get 8 hours sleep", "😴"),
    ("8", "Practice gratitude", "🙏"),
];

pub const SUGGESTED_EMOJIS: [&str; 16] = [
    "💧", "🏃‍♂️", "📚", "🧘‍♀️", "✍️", "🥗", "😴", "🎯", "💪", "🚴‍♀️", "🎵", "🌱", "🧠", "❤️", "☀️", "🌙",
];

pub fn seed_habits(created_at: &str) -> Vec<Habit> {
    SEED_HABITS
        .iter()
        .map(|&(id, name, emoji, completed)| Habit {
            id: id.to_string(),
            name: name.to_string(),
            emoji: emoji.to_string(),
            completed,
            created_at: created_at.to_string(),
        })
        .collect()
}

/// Catalog entries as incomplete details.
pub fn demo_catalog() -> Vec<HabitDetail> {
    DEMO_CATALOG
        .iter()
        .map(|&(id, name, emoji)| HabitDetail {
            id: id.to_string(),
            name: name.to_string(),
            emoji: emoji.to_string(),
            completed: false,
        })
        .collect()
}
