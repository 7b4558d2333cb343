//! Serde adapters for calendar dates (`YYYY-MM-DD`).

pub mod iso_date {
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serializer};
    use time::{format_description::FormatItem, macros::format_description, Date};

    pub(crate) const FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = date.format(FORMAT).map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;
        Date::parse(text.trim(), FORMAT).map_err(D::Error::custom)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Date;

        pub fn serialize<S: Serializer>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Date>, D::Error> {
            #[derive(Deserialize)]
            struct Wrapped(#[serde(with = "super")] Date);

            Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(d)| d))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use time::{macros::date, Date};

    #[derive(Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "super::iso_date")]
        day: Date,
        #[serde(default, with = "super::iso_date::option")]
        maybe: Option<Date>,
    }

    #[test]
    fn writes_plain_calendar_dates() {
        let json = serde_json::to_string(&Holder {
            day: date!(2024 - 02 - 29),
            maybe: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"day":"2024-02-29","maybe":null}"#);
    }

    #[test]
    fn optional_field_may_be_missing() {
        let h: Holder = serde_json::from_str(r#"{"day":"2023-11-05"}"#).unwrap();
        assert_eq!(h.day, date!(2023 - 11 - 05));
        assert!(h.maybe.is_none());
    }
}
