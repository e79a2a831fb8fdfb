//! In-process store implementing every repository port.
//!
//! Used when no database URL is configured and by HTTP integration tests. All
//! state lives behind one mutex, which gives the vote path the same
//! check-then-write atomicity the SQL adapter gets from a row lock.

mod store;

pub use store::InMemoryStore;

/// Departments seeded into a fresh store, matching the SQL seed migration.
pub const SEED_DEPARTMENTS: &[(i32, &str, &str)] = &[
    (1, "CSE", "Computer Science and Engineering"),
    (2, "ECE", "Electronics and Communication Engineering"),
    (3, "EEE", "Electrical and Electronics Engineering"),
    (4, "MECH", "Mechanical Engineering"),
    (5, "CIV", "Civil Engineering"),
    (6, "IT", "Information Technology"),
];

/// Tag slugs seeded into a fresh store, matching the SQL seed migration.
pub const SEED_TAGS: &[&str] = &["general", "cse", "ece", "eee", "mech", "civ", "it"];
