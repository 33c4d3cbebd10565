use chrono::DateTime;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

const TEXT_FIELDS: &[&str] = &[
    "product_promotion_details",
    "product_details",
    "product_exclusions",
];

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Normalize an ingested product record in place.
///
/// `last_update` is canonicalized to `YYYY/MM/DD HH:MM:SS` from either a unix
/// timestamp (number or digit string) or an already-formatted date string;
/// unparseable values are left untouched with a warning. The free-text detail
/// fields get their whitespace collapsed to single spaces.
pub fn data_reformat(mut record: Value) -> Value {
    let Some(object) = record.as_object_mut() else {
        return record;
    };

    if let Some(last_update) = object.get("last_update").cloned() {
        if let Some(normalized) = normalize_last_update(&last_update) {
            object.insert("last_update".to_string(), Value::String(normalized));
        }
    }

    for field in TEXT_FIELDS {
        if let Some(Value::String(text)) = object.get(*field) {
            let collapsed = collapse_whitespace(text);
            object.insert((*field).to_string(), Value::String(collapsed));
        }
    }

    record
}

fn normalize_last_update(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => {
            let seconds = number.as_i64()?;
            format_unix_seconds(seconds)
        }
        Value::String(text) => {
            if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
                let seconds = text.parse::<i64>().ok()?;
                return format_unix_seconds(seconds);
            }

            match chrono::NaiveDateTime::parse_from_str(text, DATE_FORMAT) {
                Ok(parsed) => Some(parsed.format(DATE_FORMAT).to_string()),
                Err(_) => {
                    tracing::warn!(value = %text, "Invalid date format for last_update");
                    None
                }
            }
        }
        _ => None,
    }
}

fn format_unix_seconds(seconds: i64) -> Option<String> {
    let timestamp = DateTime::from_timestamp(seconds, 0)?;
    Some(timestamp.format(DATE_FORMAT).to_string())
}

fn collapse_whitespace(text: &str) -> String {
    whitespace_re().replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unix_timestamp_number() {
        let record = data_reformat(json!({ "last_update": 0 }));
        assert_eq!(record["last_update"], "1970/01/01 00:00:00");
    }

    #[test]
    fn test_unix_timestamp_digit_string() {
        let record = data_reformat(json!({ "last_update": "86400" }));
        assert_eq!(record["last_update"], "1970/01/02 00:00:00");
    }

    #[test]
    fn test_formatted_date_string_passes_through() {
        let record = data_reformat(json!({ "last_update": "2024/03/15 09:30:00" }));
        assert_eq!(record["last_update"], "2024/03/15 09:30:00");
    }

    #[test]
    fn test_invalid_date_left_untouched() {
        let record = data_reformat(json!({ "last_update": "next Tuesday" }));
        assert_eq!(record["last_update"], "next Tuesday");
    }

    #[test]
    fn test_text_fields_whitespace_collapsed() {
        let record = data_reformat(json!({
            "product_details": "  covers\nwater damage\t and   fire  ",
            "product_exclusions": "none",
            "name": "  untouched   field  "
        }));
        assert_eq!(record["product_details"], "covers water damage and fire");
        assert_eq!(record["product_exclusions"], "none");
        assert_eq!(record["name"], "  untouched   field  ");
    }

    #[test]
    fn test_missing_fields_are_ignored() {
        let record = data_reformat(json!({ "sku": "A-1" }));
        assert_eq!(record, json!({ "sku": "A-1" }));
    }

    #[test]
    fn test_non_object_input_returned_unchanged() {
        let record = data_reformat(json!("just a string"));
        assert_eq!(record, json!("just a string"));
    }
}
