use chrono::NaiveDate;

use crate::error::ApiError;

/// Validate a day key of the form `YYYY-MM-DD` naming a real calendar date.
pub fn validate_date(date: Option<&str>) -> Result<NaiveDate, ApiError> {
    let raw = date.ok_or(ApiError::InvalidDate(None))?;
    let well_formed = raw.len() == 10
        && raw.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });
    if !well_formed {
        return Err(ApiError::InvalidDate(Some(raw.to_string())));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ApiError::InvalidDate(Some(raw.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_iso_dates() {
        let date = validate_date(Some("2020-01-28")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 1, 28).unwrap());
        assert!(validate_date(Some("2020-02-29")).is_ok());
    }

    #[test]
    fn rejects_missing_date() {
        assert!(matches!(validate_date(None), Err(ApiError::InvalidDate(None))));
    }

    #[test]
    fn rejects_other_formats() {
        for raw in ["18-10-2019", "1-1-2020", "2020-1-28", "2020/01/28", "2020-01-28T00:00:00Z", ""] {
            assert!(validate_date(Some(raw)).is_err(), "{} should be rejected", raw);
        }
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(validate_date(Some("2019-02-29")).is_err());
        assert!(validate_date(Some("2020-13-01")).is_err());
    }
}
