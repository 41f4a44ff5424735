use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::form::FormState;
use crate::submission::{Field, Gender};

/// Maximum number of digits kept in the phone field.
pub const PHONE_DIGITS: usize = 10;

/// Maximum number of digits kept in the pincode field.
pub const PINCODE_DIGITS: usize = 6;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("compile email pattern");
}

/// Strips everything but ASCII digits and keeps at most `max` of them.
///
/// ```
/// use sangrah::validation::keep_digits;
/// assert_eq!(keep_digits("12a3456789xyz0", 10), "1234567890");
/// ```
pub fn keep_digits(value: &str, max: usize) -> String {
    value.chars().filter(char::is_ascii_digit).take(max).collect()
}

/// Field-level error messages for a form state. Empty means submittable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationErrors(BTreeMap<Field, &'static str>);

impl ValidationErrors {
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }

    fn insert(&mut self, field: Field, message: &'static str) {
        self.0.insert(field, message);
    }
}

/// Checks every constraint and returns one message per failing field.
pub fn validate(form: &FormState) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if form.full_name.trim().is_empty() {
        errors.insert(Field::FullName, "पूरा नाम आवश्यक है");
    }

    if form.email.trim().is_empty() {
        errors.insert(Field::Email, "ईमेल आवश्यक है");
    } else if !EMAIL.is_match(&form.email) {
        errors.insert(Field::Email, "मान्य ईमेल दर्ज करें");
    }

    if form.phone.trim().is_empty() {
        errors.insert(Field::Phone, "मोबाइल नंबर आवश्यक है");
    } else if !is_digits(&form.phone, PHONE_DIGITS) {
        errors.insert(Field::Phone, "10 अंकों का नंबर दर्ज करें");
    }

    if form.dob.is_empty() {
        errors.insert(Field::Dob, "जन्म तिथि आवश्यक है");
    }

    if form.gender == Gender::Unset {
        errors.insert(Field::Gender, "लिंग चुनें");
    }

    if form.address.trim().is_empty() {
        errors.insert(Field::Address, "पता आवश्यक है");
    }

    if form.city.trim().is_empty() {
        errors.insert(Field::City, "शहर आवश्यक है");
    }

    if form.state.trim().is_empty() {
        errors.insert(Field::State, "राज्य आवश्यक है");
    }

    if form.pincode.trim().is_empty() {
        errors.insert(Field::Pincode, "पिनकोड आवश्यक है");
    } else if !is_digits(&form.pincode, PINCODE_DIGITS) {
        errors.insert(Field::Pincode, "6 अंकों का पिनकोड दर्ज करें");
    }

    errors
}

fn is_digits(value: &str, count: usize) -> bool {
    value.len() == count && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn valid_form() -> FormState {
        FormState {
            full_name: "राम कुमार".to_owned(),
            email: "ram@example.com".to_owned(),
            phone: "9876543210".to_owned(),
            dob: "1990-05-17".to_owned(),
            gender: Gender::Male,
            address: "12 गांधी मार्ग".to_owned(),
            city: "जयपुर".to_owned(),
            state: "राजस्थान".to_owned(),
            pincode: "302001".to_owned(),
            remarks: String::new(),
        }
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let errors = validate(&FormState::default());

        assert_eq!(errors.len(), 9);
        assert_eq!(errors.get(Field::Remarks), None);
        assert_eq!(errors.get(Field::Email), Some("ईमेल आवश्यक है"));
        assert_eq!(errors.get(Field::Gender), Some("लिंग चुनें"));
    }

    #[test]
    fn valid_form_has_no_errors() {
        assert!(validate(&valid_form()).is_empty());
    }

    #[test]
    fn whitespace_only_text_is_missing() {
        let mut form = valid_form();
        form.full_name = "   ".to_owned();
        form.city = "\t".to_owned();

        let errors = validate(&form);

        assert_eq!(errors.get(Field::FullName), Some("पूरा नाम आवश्यक है"));
        assert_eq!(errors.get(Field::City), Some("शहर आवश्यक है"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn malformed_email_is_reported() {
        for email in &["ram", "ram@example", "ram@example.c", "ram @example.com", "a@b@c.com"] {
            let mut form = valid_form();
            form.email = (*email).to_owned();

            assert_eq!(
                validate(&form).get(Field::Email),
                Some("मान्य ईमेल दर्ज करें"),
                "{:?} must be rejected",
                email
            );
        }
    }

    #[test]
    fn short_numbers_are_reported() {
        let mut form = valid_form();
        form.phone = "98765".to_owned();
        form.pincode = "3020".to_owned();

        let errors = validate(&form);

        assert_eq!(errors.get(Field::Phone), Some("10 अंकों का नंबर दर्ज करें"));
        assert_eq!(errors.get(Field::Pincode), Some("6 अंकों का पिनकोड दर्ज करें"));
    }

    #[test]
    fn keep_digits_truncates() {
        assert_eq!(keep_digits("12a3456789xyz0", PHONE_DIGITS), "1234567890");
        assert_eq!(keep_digits("1234567890", PINCODE_DIGITS), "123456");
        assert_eq!(keep_digits("abc", PINCODE_DIGITS), "");
        assert_eq!(keep_digits("१२३", PINCODE_DIGITS), "");
    }

    proptest! {
        #[test]
        fn keep_digits_output_is_bounded_digits(value in ".*", max in 0usize..12) {
            let kept = keep_digits(&value, max);

            prop_assert!(kept.chars().count() <= max);
            prop_assert!(kept.chars().all(|c| c.is_ascii_digit()));
        }

        #[test]
        fn any_ten_digits_are_a_valid_phone(phone in "[0-9]{10}") {
            let mut form = valid_form();
            form.phone = phone;

            prop_assert!(validate(&form).is_empty());
        }

        #[test]
        fn non_digit_pincodes_are_rejected(pincode in "[0-9]{0,5}[^0-9][0-9]{0,5}") {
            let mut form = valid_form();
            form.pincode = pincode;

            prop_assert!(validate(&form).get(Field::Pincode).is_some());
        }
    }
}
