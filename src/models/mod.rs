pub mod attendance;
pub mod exam;
pub mod notice;
pub mod student;
pub mod timetable;
pub mod user;

/// Deserializers for values the school API sends either as JSON numbers or
/// as strings (roll numbers, grades, marks). They are held as strings.
pub mod de {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Int(i64),
        Float(f64),
        Text(String),
        Bool(bool),
        Null,
    }

    impl Scalar {
        fn into_string(self) -> Option<String> {
            match self {
                Scalar::Int(v) => Some(v.to_string()),
                Scalar::Float(v) => Some(v.to_string()),
                Scalar::Text(v) => Some(v),
                Scalar::Bool(v) => Some(v.to_string()),
                Scalar::Null => None,
            }
        }
    }

    pub fn flexible_string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Scalar::deserialize(deserializer)?
            .into_string()
            .unwrap_or_default())
    }

    pub fn optional_flexible_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Scalar::deserialize(deserializer)?.into_string())
    }
}
