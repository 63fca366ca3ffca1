//! Input rules: what each form checks before it reports completion
//!
//! Every rule is a pure function `input -> Result<(), MistakeReason>`.
//! The ground-truth checks are the same for both interfaces; the bad
//! interface layers its traps on top and reports coarser reasons.
//!
//! One failed submission is one mistake, however many reasons it carries.

use super::{PresentationStyle, CANONICAL_EMAIL, CANONICAL_PASSWORD, MIN_PASSWORD_LEN};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;

static POSTAL_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{3}-?[0-9]{4}$").expect("postal code pattern is valid")
});

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^0[0-9]{1,4}-?[0-9]{1,4}-?[0-9]{3,4}$").expect("phone pattern is valid")
});

/// Fields of the email mission
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmailInput {
    pub address: String,
    pub confirmation: String,
}

/// Fields of the password mission
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PasswordInput {
    pub password: String,
    pub confirmation: String,
    /// Only the bad interface shows (and requires) this checkbox
    pub terms_accepted: bool,
}

/// Fields of the profile mission
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileInput {
    pub family_name: String,
    pub given_name: String,
    pub postal_code: String,
    pub prefecture: String,
    pub city: String,
    pub street: String,
    pub phone: String,
}

/// A completed form handed to the rules on submit
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    Email(EmailInput),
    Password(PasswordInput),
    Profile(ProfileInput),
}

/// A single broken rule
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("the email address has no @")]
    MissingAtSign,
    #[error("the email address does not match the instructed one")]
    AddressMismatch,
    #[error("the confirmation email does not match")]
    EmailConfirmationMismatch,
    #[error("the password must be at least 8 characters")]
    PasswordTooShort,
    #[error("the password does not match the instructed one")]
    PasswordMismatch,
    #[error("the password confirmation does not match")]
    PasswordConfirmationMismatch,
    #[error("the mandatory terms were not accepted")]
    TermsNotAccepted,
    #[error("enter both family and given name")]
    MissingName,
    #[error("check the postal code (123-4567)")]
    InvalidPostalCode,
    #[error("check the phone number (090-1234-5678)")]
    InvalidPhone,
    #[error("complete the address")]
    IncompleteAddress,
    #[error("a required value is empty")]
    NullValue,
    #[error("the phone number may only contain digits")]
    PhoneNotDigitsOnly,
    #[error("the postal code is missing")]
    PostalCodeMissing,
    #[error("the record was rejected")]
    Rejected,
    #[error("the form was cleared")]
    FormCleared,
    #[error("showing the password is not allowed")]
    RevealForbidden,
}

/// Why a submission (or a trap) counted as a mistake; never empty
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MistakeReason {
    violations: Vec<Violation>,
}

impl MistakeReason {
    pub fn single(violation: Violation) -> Self {
        MistakeReason {
            violations: vec![violation],
        }
    }

    /// Batch several violations into one reason, `None` when there are none
    pub fn batch(violations: Vec<Violation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(MistakeReason { violations })
        }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// The first broken rule, which the bad interface reports on its own
    pub fn primary(&self) -> Violation {
        self.violations[0]
    }
}

impl From<Violation> for MistakeReason {
    fn from(violation: Violation) -> Self {
        MistakeReason::single(violation)
    }
}

impl fmt::Display for MistakeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

/// Run the rules of `style`'s form against a submission
pub fn validate(style: PresentationStyle, submission: &Submission) -> Result<(), MistakeReason> {
    match (style, submission) {
        (_, Submission::Email(input)) => check_email(input).map_err(MistakeReason::from),
        (PresentationStyle::Good, Submission::Password(input)) => {
            check_password(input).map_err(MistakeReason::from)
        }
        (PresentationStyle::Bad, Submission::Password(input)) => bad_password(input),
        (PresentationStyle::Good, Submission::Profile(input)) => check_profile(input),
        (PresentationStyle::Bad, Submission::Profile(input)) => bad_profile(input),
    }
}

/// Ground truth for the email mission, first failure wins
pub fn check_email(input: &EmailInput) -> Result<(), Violation> {
    if !input.address.contains('@') {
        return Err(Violation::MissingAtSign);
    }
    if input.address != CANONICAL_EMAIL {
        return Err(Violation::AddressMismatch);
    }
    if input.address != input.confirmation {
        return Err(Violation::EmailConfirmationMismatch);
    }
    Ok(())
}

/// Ground truth for the password mission, first failure wins
pub fn check_password(input: &PasswordInput) -> Result<(), Violation> {
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Violation::PasswordTooShort);
    }
    if input.password != CANONICAL_PASSWORD {
        return Err(Violation::PasswordMismatch);
    }
    if input.password != input.confirmation {
        return Err(Violation::PasswordConfirmationMismatch);
    }
    Ok(())
}

/// Ground truth for the profile mission; every broken field is reported
pub fn check_profile(input: &ProfileInput) -> Result<(), MistakeReason> {
    let mut violations = Vec::new();

    if is_blank(&input.family_name) || is_blank(&input.given_name) {
        violations.push(Violation::MissingName);
    }
    if !POSTAL_CODE.is_match(input.postal_code.trim()) {
        violations.push(Violation::InvalidPostalCode);
    }
    if !PHONE.is_match(input.phone.trim()) {
        violations.push(Violation::InvalidPhone);
    }
    if is_blank(&input.prefecture) || is_blank(&input.city) || is_blank(&input.street) {
        violations.push(Violation::IncompleteAddress);
    }

    match MistakeReason::batch(violations) {
        Some(reason) => Err(reason),
        None => Ok(()),
    }
}

fn bad_password(input: &PasswordInput) -> Result<(), MistakeReason> {
    check_password(input)?;
    if !input.terms_accepted {
        return Err(Violation::TermsNotAccepted.into());
    }
    Ok(())
}

// The legacy form reports one coarse reason per submission, never a field list.
fn bad_profile(input: &ProfileInput) -> Result<(), MistakeReason> {
    let required = [
        &input.family_name,
        &input.given_name,
        &input.prefecture,
        &input.city,
        &input.street,
        &input.phone,
    ];
    if required.iter().any(|field| is_blank(field)) {
        return Err(Violation::NullValue.into());
    }
    if input.phone.contains('-') {
        return Err(Violation::PhoneNotDigitsOnly.into());
    }
    if is_blank(&input.postal_code) {
        return Err(Violation::PostalCodeMissing.into());
    }
    if check_profile(input).is_err() {
        return Err(Violation::Rejected.into());
    }
    Ok(())
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(address: &str, confirmation: &str) -> Submission {
        Submission::Email(EmailInput {
            address: address.to_string(),
            confirmation: confirmation.to_string(),
        })
    }

    fn canonical_profile() -> ProfileInput {
        ProfileInput {
            family_name: "Yamada".to_string(),
            given_name: "Taro".to_string(),
            postal_code: "123-4567".to_string(),
            prefecture: "Tokyo".to_string(),
            city: "Shinjuku".to_string(),
            street: "1-1".to_string(),
            phone: "090-1234-5678".to_string(),
        }
    }

    #[test]
    fn test_email_without_at_is_a_mistake() {
        for style in [PresentationStyle::Bad, PresentationStyle::Good] {
            let result = validate(style, &email("taro.yamada.example.com", ""));
            assert_eq!(result, Err(MistakeReason::single(Violation::MissingAtSign)));
        }
    }

    #[test]
    fn test_canonical_email_completes() {
        for style in [PresentationStyle::Bad, PresentationStyle::Good] {
            assert_eq!(validate(style, &email(CANONICAL_EMAIL, CANONICAL_EMAIL)), Ok(()));
        }
    }

    #[test]
    fn test_email_checks_exit_early_in_order() {
        let wrong = email("taro@example.com", "");
        assert_eq!(
            validate(PresentationStyle::Good, &wrong).unwrap_err().violations(),
            &[Violation::AddressMismatch]
        );
        let unconfirmed = email(CANONICAL_EMAIL, "taro.yamada@example.co");
        assert_eq!(
            validate(PresentationStyle::Bad, &unconfirmed).unwrap_err().primary(),
            Violation::EmailConfirmationMismatch
        );
    }

    #[test]
    fn test_password_rules() {
        let short = PasswordInput {
            password: "M3@z".to_string(),
            confirmation: "M3@z".to_string(),
            terms_accepted: true,
        };
        assert_eq!(check_password(&short), Err(Violation::PasswordTooShort));

        let wrong = PasswordInput {
            password: "password123".to_string(),
            ..short.clone()
        };
        assert_eq!(check_password(&wrong), Err(Violation::PasswordMismatch));

        let ok = PasswordInput {
            password: CANONICAL_PASSWORD.to_string(),
            confirmation: CANONICAL_PASSWORD.to_string(),
            terms_accepted: false,
        };
        assert_eq!(validate(PresentationStyle::Good, &Submission::Password(ok.clone())), Ok(()));
        assert_eq!(
            validate(PresentationStyle::Bad, &Submission::Password(ok)),
            Err(MistakeReason::single(Violation::TermsNotAccepted))
        );
    }

    #[test]
    fn test_good_profile_batches_field_errors() {
        let input = ProfileInput {
            family_name: String::new(),
            postal_code: "1234567x".to_string(),
            phone: "12-34".to_string(),
            ..canonical_profile()
        };
        let reason = check_profile(&input).unwrap_err();
        assert_eq!(
            reason.violations(),
            &[
                Violation::MissingName,
                Violation::InvalidPostalCode,
                Violation::InvalidPhone
            ]
        );
    }

    #[test]
    fn test_profile_patterns_accept_optional_hyphens() {
        let plain = ProfileInput {
            postal_code: "1234567".to_string(),
            phone: "09012345678".to_string(),
            ..canonical_profile()
        };
        assert_eq!(check_profile(&canonical_profile()), Ok(()));
        assert_eq!(check_profile(&plain), Ok(()));
    }

    #[test]
    fn test_bad_profile_is_coarse() {
        let missing = ProfileInput {
            family_name: String::new(),
            phone: String::new(),
            ..canonical_profile()
        };
        assert_eq!(
            validate(PresentationStyle::Bad, &Submission::Profile(missing))
                .unwrap_err()
                .violations(),
            &[Violation::NullValue]
        );

        let hyphenated = Submission::Profile(canonical_profile());
        assert_eq!(
            validate(PresentationStyle::Bad, &hyphenated).unwrap_err().primary(),
            Violation::PhoneNotDigitsOnly
        );

        let no_zip = ProfileInput {
            postal_code: String::new(),
            phone: "09012345678".to_string(),
            ..canonical_profile()
        };
        assert_eq!(
            validate(PresentationStyle::Bad, &Submission::Profile(no_zip))
                .unwrap_err()
                .primary(),
            Violation::PostalCodeMissing
        );

        let malformed = ProfileInput {
            postal_code: "12-34".to_string(),
            phone: "09012345678".to_string(),
            ..canonical_profile()
        };
        assert_eq!(
            validate(PresentationStyle::Bad, &Submission::Profile(malformed))
                .unwrap_err()
                .violations(),
            &[Violation::Rejected]
        );
    }

    #[test]
    fn test_mistake_reason_display_joins_violations() {
        let reason =
            MistakeReason::batch(vec![Violation::MissingName, Violation::IncompleteAddress])
                .unwrap();
        assert_eq!(
            reason.to_string(),
            "enter both family and given name; complete the address"
        );
        assert!(MistakeReason::batch(Vec::new()).is_none());
    }
}
