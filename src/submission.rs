use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One completed form record. Stored newest-first in the local store and
/// never modified once written.
///
/// Decoding is lenient: missing and `null` fields read as empty, and
/// non-string values are kept in their JSON text form.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Submission {
    #[serde(deserialize_with = "lenient_string")]
    pub full_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub dob: String,
    pub gender: Gender,
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pincode: String,
    #[serde(deserialize_with = "lenient_string")]
    pub remarks: String,

    /// ISO-8601 UTC instant at which the form was submitted.
    #[serde(deserialize_with = "lenient_string")]
    pub created_at: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Gender {
    #[serde(rename = "male")]
    Male,
    #[serde(rename = "female")]
    Female,
    #[serde(rename = "other")]
    Other,
    #[serde(rename = "")]
    Unset,
}

impl Gender {
    pub const CHOICES: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    /// Parses a select value. Anything unrecognized counts as no choice.
    pub fn parse(value: &str) -> Gender {
        match value {
            "male" => Gender::Male,
            "female" => Gender::Female,
            "other" => Gender::Other,
            _ => Gender::Unset,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::Unset => "",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "पुरुष",
            Gender::Female => "महिला",
            Gender::Other => "अन्य",
            Gender::Unset => "चुनें",
        }
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Gender::parse(&s),
            _ => Gender::Unset,
        })
    }
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Unset
    }
}

/// The editable fields of the form, in display order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Field {
    FullName,
    Email,
    Phone,
    Dob,
    Gender,
    Address,
    City,
    State,
    Pincode,
    Remarks,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::FullName,
        Field::Email,
        Field::Phone,
        Field::Dob,
        Field::Gender,
        Field::Address,
        Field::City,
        Field::State,
        Field::Pincode,
        Field::Remarks,
    ];

    /// The input name used in HTML forms and in the stored JSON.
    pub fn name(self) -> &'static str {
        match self {
            Field::FullName => "fullName",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Dob => "dob",
            Field::Gender => "gender",
            Field::Address => "address",
            Field::City => "city",
            Field::State => "state",
            Field::Pincode => "pincode",
            Field::Remarks => "remarks",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// The Hindi label shown next to the input.
    pub fn label(self) -> &'static str {
        match self {
            Field::FullName => "पूरा नाम",
            Field::Email => "ईमेल",
            Field::Phone => "मोबाइल नंबर",
            Field::Dob => "जन्म तिथि",
            Field::Gender => "लिंग",
            Field::Address => "पता",
            Field::City => "शहर",
            Field::State => "राज्य",
            Field::Pincode => "पिनकोड",
            Field::Remarks => "टिप्पणी",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let submission = Submission {
            full_name: "सीता देवी".to_owned(),
            gender: Gender::Female,
            created_at: "2024-01-02T03:04:05.678Z".to_owned(),
            ..Default::default()
        };

        let value = serde_json::to_value(&submission).expect("serialize submission");

        assert_eq!(value["fullName"], "सीता देवी");
        assert_eq!(value["gender"], "female");
        assert_eq!(value["createdAt"], "2024-01-02T03:04:05.678Z");
        assert_eq!(value["remarks"], "");
    }

    #[test]
    fn unset_gender_is_an_empty_string() {
        let value = serde_json::to_value(Gender::Unset).expect("serialize gender");
        assert_eq!(value, "");

        let parsed: Gender = serde_json::from_str("\"\"").expect("parse gender");
        assert_eq!(parsed, Gender::Unset);
    }

    #[test]
    fn unexpected_values_still_decode() {
        let parsed: Submission = serde_json::from_str(
            r#"{"fullName":null,"gender":"F","phone":9876543210,"city":"इंदौर","extra":true}"#,
        )
        .expect("parse lenient submission");

        assert_eq!(parsed.full_name, "");
        assert_eq!(parsed.gender, Gender::Unset);
        assert_eq!(parsed.phone, "9876543210");
        assert_eq!(parsed.city, "इंदौर");
        assert_eq!(parsed.created_at, "");

        let parsed: Gender = serde_json::from_str("null").expect("parse null gender");
        assert_eq!(parsed, Gender::Unset);
    }

    #[test]
    fn field_names_round_trip() {
        for field in Field::ALL.iter() {
            assert_eq!(Field::from_name(field.name()), Some(*field));
        }

        assert_eq!(Field::from_name("createdAt"), None);
    }
}
