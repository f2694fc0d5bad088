use chrono::Local;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn get_current_date() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn matches_timestamp_format() {
        let now = get_current_date();
        assert_eq!(now.len(), "YYYY-MM-DD HH:MM:SS".len());
        assert!(NaiveDateTime::parse_from_str(&now, DATE_FORMAT).is_ok());
    }

    #[test]
    fn stable_within_one_second() {
        // Retry in case the two reads straddle a second boundary.
        let equal = (0..3).any(|_| get_current_date() == get_current_date());
        assert!(equal);
    }
}
