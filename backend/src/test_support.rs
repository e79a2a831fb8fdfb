//! Shared fixtures for unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::RegisterAccountRequest;
use crate::domain::{
    Account, AccountFlags, AccountProfile, EmailPolicy, Question, QuestionId, RegistrationInput,
    Scope, TagSlug, UserId,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 15, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

/// Valid registration input for roll number `1602-18-733-0NN`.
pub(crate) fn registration_input(n: u8) -> RegistrationInput {
    RegistrationInput {
        email: Some(format!("1602-18-733-{n:03}@vce.ac.in")),
        username: Some(format!("student{n}")),
        first_name: Some("Asha".into()),
        middle_name: None,
        last_name: Some("Reddy".into()),
        date_of_birth: Some("2000-01-15".into()),
        grad_year: Some(2022),
        roll_number: Some(format!("1602-18-733-{n:03}")),
        phone: Some(format!("98765432{n:02}")),
        department: Some(1),
    }
}

pub(crate) fn registration(n: u8) -> RegisterAccountRequest {
    RegisterAccountRequest {
        input: registration_input(n),
        password: Some("hunter2".into()),
    }
}

pub(crate) fn account(n: u8, flags: AccountFlags) -> Account {
    let profile = AccountProfile::try_from_input(registration_input(n), &EmailPolicy::default())
        .expect("fixture profile is valid");
    Account {
        id: UserId::random(),
        profile,
        flags,
        created_at: fixture_timestamp(),
    }
}

pub(crate) fn question(owner: UserId) -> Question {
    Question {
        id: QuestionId::random(),
        owner,
        title: "Where is the library?".into(),
        body: None,
        scope: Scope::College,
        tags: vec![TagSlug::from_trusted("general")],
        is_active: true,
        created_at: fixture_timestamp(),
    }
}
