//! Regression coverage for account validation.

use super::*;
use rstest::{fixture, rstest};

#[fixture]
fn input() -> RegistrationInput {
    RegistrationInput {
        email: Some("1602-18-733-010@vce.ac.in".into()),
        username: Some("ravi".into()),
        first_name: Some("Ravi".into()),
        middle_name: None,
        last_name: Some("Kumar".into()),
        date_of_birth: Some("2000-04-12".into()),
        grad_year: Some(2022),
        roll_number: Some("1602-18-733-010".into()),
        phone: Some("9876543210".into()),
        department: Some(1),
    }
}

#[fixture]
fn policy() -> EmailPolicy {
    EmailPolicy::default()
}

#[rstest]
fn valid_input_builds_profile(input: RegistrationInput, policy: EmailPolicy) {
    let profile = AccountProfile::try_from_input(input, &policy).expect("valid profile");
    assert_eq!(profile.roll_number.as_ref(), "1602-18-733-010");
    assert_eq!(profile.grad_year.value(), 2022);
    assert_eq!(profile.department, DepartmentId::new(1));
    assert!(profile.middle_name.is_none());
}

#[rstest]
fn email_domain_is_lower_cased(mut input: RegistrationInput, policy: EmailPolicy) {
    input.email = Some("1602-18-733-010@VCE.AC.IN".into());
    let profile = AccountProfile::try_from_input(input, &policy).expect("valid profile");
    assert_eq!(profile.email.as_ref(), "1602-18-733-010@vce.ac.in");
}

#[rstest]
#[case("foo@vce.ac.in")]
#[case("1602-18-733-010@gmail.com")]
#[case("no-at-sign")]
fn non_institutional_email_is_rejected(
    mut input: RegistrationInput,
    policy: EmailPolicy,
    #[case] email: &str,
) {
    input.email = Some(email.into());
    let err = AccountProfile::try_from_input(input, &policy).expect_err("invalid email");
    assert_eq!(err, AccountValidationError::InvalidEmail);
    assert_eq!(err.field(), Some(AccountField::Email));
}

#[rstest]
#[case("1602-18-733-010", true)]
#[case("1602-18-633-010", false)]
#[case("1603-18-733-010", false)]
#[case("1602-18-733-01", false)]
fn roll_number_pattern(#[case] raw: &str, #[case] ok: bool) {
    assert_eq!(RollNumber::new(raw).is_ok(), ok);
}

#[rstest]
#[case("9876543210", true)]
#[case("987654321", false)]
#[case("98765432101", false)]
#[case("98765abcde", false)]
fn phone_pattern(#[case] raw: &str, #[case] ok: bool) {
    assert_eq!(PhoneNumber::new(raw).is_ok(), ok);
}

#[rstest]
#[case(2022, true)]
#[case(1999, false)]
#[case(3000, false)]
#[case(22, false)]
fn grad_year_range(#[case] year: i32, #[case] ok: bool) {
    assert_eq!(GradYear::new(year).is_ok(), ok);
}

#[rstest]
fn missing_field_is_named(mut input: RegistrationInput, policy: EmailPolicy) {
    input.phone = None;
    let err = AccountProfile::try_from_input(input, &policy).expect_err("missing phone");
    assert_eq!(
        err,
        AccountValidationError::Missing {
            field: AccountField::Phone
        }
    );
    assert_eq!(err.code(), "missing_field");
}

#[rstest]
fn blank_username_is_rejected(mut input: RegistrationInput, policy: EmailPolicy) {
    input.username = Some("   ".into());
    let err = AccountProfile::try_from_input(input, &policy).expect_err("blank username");
    assert_eq!(err.field(), Some(AccountField::Username));
}

#[rstest]
fn overlong_name_is_rejected(mut input: RegistrationInput, policy: EmailPolicy) {
    input.first_name = Some("a".repeat(NAME_MAX + 1));
    let err = AccountProfile::try_from_input(input, &policy).expect_err("long name");
    assert_eq!(
        err,
        AccountValidationError::TooLong {
            field: AccountField::FirstName,
            max: NAME_MAX
        }
    );
}

#[rstest]
fn malformed_birth_date_is_rejected(mut input: RegistrationInput, policy: EmailPolicy) {
    input.date_of_birth = Some("12/04/2000".into());
    let err = AccountProfile::try_from_input(input, &policy).expect_err("bad date");
    assert_eq!(err, AccountValidationError::InvalidDateOfBirth);
}

#[rstest]
fn blank_middle_name_is_treated_as_absent(mut input: RegistrationInput, policy: EmailPolicy) {
    input.middle_name = Some("  ".into());
    let profile = AccountProfile::try_from_input(input, &policy).expect("valid profile");
    assert!(profile.middle_name.is_none());
}

#[rstest]
fn custom_email_policy_is_honoured(input: RegistrationInput) {
    let policy = EmailPolicy::new(r"^[a-z]+@example\.edu$").expect("valid pattern");
    let err = AccountProfile::try_from_input(input, &policy).expect_err("pattern mismatch");
    assert_eq!(err, AccountValidationError::InvalidEmail);
}

#[rstest]
fn regular_flags_are_inactive_and_unprivileged() {
    let flags = AccountFlags::regular();
    assert!(!flags.is_active && !flags.is_staff && !flags.is_superuser);
}

#[rstest]
fn superuser_flags_require_staff() {
    assert_eq!(
        AccountFlags::superuser(false),
        Err(AccountValidationError::SuperuserRequiresStaff)
    );
    let flags = AccountFlags::superuser(true).expect("staff superuser");
    assert!(flags.is_active && flags.is_staff && flags.is_superuser);
}

#[rstest]
#[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", true)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", false)]
#[case("nope", false)]
fn user_id_parsing(#[case] raw: &str, #[case] ok: bool) {
    assert_eq!(UserId::new(raw).is_ok(), ok);
}
