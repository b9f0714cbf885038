//! Field validation for transaction forms.
//!
//! Rules run in declaration order and the first failure wins; its message is
//! surfaced to the client verbatim. Validation runs before any store access.
//! Note that the category is only checked for being a plausible ID here,
//! existence within the family is left to the store's foreign key constraint.

use time::Date;
use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, transaction::TransactionForm};

/// The minimum length of a transaction description in characters.
const MIN_DESCRIPTION_LENGTH: usize = 3;
/// The maximum length of a transaction description in characters.
const MAX_DESCRIPTION_LENGTH: usize = 300;
/// How many years back a transaction may be dated.
const MAX_DATE_AGE_YEARS: i32 = 100;

/// Check a transaction form against the field rules.
///
/// `today` anchors the date-range rules and should come from
/// [crate::timezone::local_today] so that "today" follows the configured
/// timezone.
///
/// # Errors
///
/// Returns the first failing rule's error:
/// - [Error::NonPositiveAmount] if the amount is zero, negative, or NaN,
/// - [Error::DescriptionTooShort]/[Error::DescriptionTooLong] if the
///   description is outside 3 to 300 characters,
/// - [Error::CategoryRequired] if the category ID is not a positive integer,
/// - [Error::DateTooFarPast]/[Error::DateTooFarAhead] if the date is outside
///   `[today - 100 years, today + 1 day]`.
pub fn validate_transaction(form: &TransactionForm, today: Date) -> Result<(), Error> {
    if !(form.amount > 0.0) {
        return Err(Error::NonPositiveAmount);
    }

    let description_length = form.description.graphemes(true).count();

    if description_length < MIN_DESCRIPTION_LENGTH {
        return Err(Error::DescriptionTooShort);
    }

    if description_length > MAX_DESCRIPTION_LENGTH {
        return Err(Error::DescriptionTooLong);
    }

    if form.category_id <= 0 {
        return Err(Error::CategoryRequired);
    }

    if form.date < earliest_allowed_date(today) {
        return Err(Error::DateTooFarPast);
    }

    if form.date > latest_allowed_date(today) {
        return Err(Error::DateTooFarAhead);
    }

    Ok(())
}

/// The oldest date a transaction may carry: one hundred years before `today`.
fn earliest_allowed_date(today: Date) -> Date {
    // `replace_year` only fails on February 29 of a year that is not a leap
    // year, in which case March 1 is the nearest following day.
    today
        .replace_year(today.year() - MAX_DATE_AGE_YEARS)
        .unwrap_or_else(|_| {
            Date::from_calendar_date(today.year() - MAX_DATE_AGE_YEARS, time::Month::March, 1)
                .expect("March 1 is valid in every year")
        })
}

/// The newest date a transaction may carry: the day after `today`.
fn latest_allowed_date(today: Date) -> Date {
    today.next_day().unwrap_or(today)
}

#[cfg(test)]
mod validate_transaction_tests {
    use time::{Date, Duration, macros::date};

    use crate::{Error, family::Family, transaction::TransactionForm};

    use super::validate_transaction;

    const TODAY: Date = date!(2024 - 03 - 20);

    fn valid_form() -> TransactionForm {
        TransactionForm {
            amount: 50.0,
            description: "Groceries".to_string(),
            category_id: 1,
            date: date!(2024 - 03 - 15),
            family: Family::Expense,
        }
    }

    #[test]
    fn accepts_a_valid_form() {
        assert_eq!(validate_transaction(&valid_form(), TODAY), Ok(()));
    }

    #[test]
    fn rejects_zero_amount() {
        let form = TransactionForm {
            amount: 0.0,
            ..valid_form()
        };

        assert_eq!(
            validate_transaction(&form, TODAY),
            Err(Error::NonPositiveAmount)
        );
    }

    #[test]
    fn rejects_negative_amount() {
        let form = TransactionForm {
            amount: -9.99,
            ..valid_form()
        };

        assert_eq!(
            validate_transaction(&form, TODAY),
            Err(Error::NonPositiveAmount)
        );
    }

    #[test]
    fn rejects_nan_amount() {
        let form = TransactionForm {
            amount: f64::NAN,
            ..valid_form()
        };

        assert_eq!(
            validate_transaction(&form, TODAY),
            Err(Error::NonPositiveAmount)
        );
    }

    #[test]
    fn rejects_two_character_description() {
        let form = TransactionForm {
            description: "ab".to_string(),
            ..valid_form()
        };

        assert_eq!(
            validate_transaction(&form, TODAY),
            Err(Error::DescriptionTooShort)
        );
    }

    #[test]
    fn accepts_three_character_description() {
        let form = TransactionForm {
            description: "abc".to_string(),
            ..valid_form()
        };

        assert_eq!(validate_transaction(&form, TODAY), Ok(()));
    }

    #[test]
    fn rejects_description_over_300_characters() {
        let form = TransactionForm {
            description: "x".repeat(301),
            ..valid_form()
        };

        assert_eq!(
            validate_transaction(&form, TODAY),
            Err(Error::DescriptionTooLong)
        );
    }

    #[test]
    fn accepts_description_of_exactly_300_characters() {
        let form = TransactionForm {
            description: "x".repeat(300),
            ..valid_form()
        };

        assert_eq!(validate_transaction(&form, TODAY), Ok(()));
    }

    #[test]
    fn counts_multi_byte_characters_not_bytes() {
        // Three graphemes, far more than three bytes.
        let form = TransactionForm {
            description: "🍞🥛🧀".to_string(),
            ..valid_form()
        };

        assert_eq!(validate_transaction(&form, TODAY), Ok(()));
    }

    #[test]
    fn rejects_non_positive_category_id() {
        for category_id in [0, -1] {
            let form = TransactionForm {
                category_id,
                ..valid_form()
            };

            assert_eq!(
                validate_transaction(&form, TODAY),
                Err(Error::CategoryRequired)
            );
        }
    }

    #[test]
    fn accepts_tomorrow() {
        let form = TransactionForm {
            date: TODAY.next_day().unwrap(),
            ..valid_form()
        };

        assert_eq!(validate_transaction(&form, TODAY), Ok(()));
    }

    #[test]
    fn rejects_two_days_in_the_future() {
        let form = TransactionForm {
            date: TODAY + Duration::days(2),
            ..valid_form()
        };

        assert_eq!(
            validate_transaction(&form, TODAY),
            Err(Error::DateTooFarAhead)
        );
    }

    #[test]
    fn accepts_exactly_one_hundred_years_ago() {
        let form = TransactionForm {
            date: date!(1924 - 03 - 20),
            ..valid_form()
        };

        assert_eq!(validate_transaction(&form, TODAY), Ok(()));
    }

    #[test]
    fn rejects_more_than_one_hundred_years_ago() {
        let form = TransactionForm {
            date: date!(1924 - 03 - 19),
            ..valid_form()
        };

        assert_eq!(
            validate_transaction(&form, TODAY),
            Err(Error::DateTooFarPast)
        );
    }

    #[test]
    fn amount_rule_wins_over_description_rule() {
        let form = TransactionForm {
            amount: 0.0,
            description: "ab".to_string(),
            ..valid_form()
        };

        assert_eq!(
            validate_transaction(&form, TODAY),
            Err(Error::NonPositiveAmount)
        );
    }
}
