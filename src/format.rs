//! Display fields derived from stored job records on every response.

use chrono::{DateTime, Utc};

use crate::models::{Job, JobView};

const COMPETITIVE: &str = "Competitive";
const MINUTES_PER_DAY: i64 = 24 * 60;

/// Builds the response view for `job`. `match_score` is only present on
/// listing responses.
pub fn job_view(job: Job, now: DateTime<Utc>, match_score: Option<u32>) -> JobView {
    JobView {
        salary: salary_range(job.salary_min.as_deref(), job.salary_max.as_deref()),
        logo: company_initials(&job.company),
        posted: posted_ago(job.posted_at, now),
        match_score,
        job,
    }
}

/// `"$100,000 - $150,000"`, or `"Competitive"` unless both bounds hold a number.
pub fn salary_range(min: Option<&str>, max: Option<&str>) -> String {
    match (min.and_then(leading_integer), max.and_then(leading_integer)) {
        (Some(min), Some(max)) => format!(
            "${} - ${}",
            group_thousands(min),
            group_thousands(max)
        ),
        _ => COMPETITIVE.to_string(),
    }
}

/// First letter of up to two space separated words, uppercased.
pub fn company_initials(company: &str) -> String {
    company
        .split(' ')
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Relative age such as `"3 days ago"` or `"2 weeks ago"`. Partial days count
/// as a whole day; seconds are ignored, so a posting from the current minute
/// reads `"0 days ago"`.
pub fn posted_ago(posted_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - posted_at).num_minutes().abs();
    let days = div_ceil(minutes, MINUTES_PER_DAY);

    match days {
        1 => "1 day ago".to_string(),
        0 | 2..=6 => format!("{days} days ago"),
        7..=29 => format!("{} weeks ago", div_ceil(days, 7)),
        _ => format!("{} months ago", div_ceil(days, 30)),
    }
}

fn div_ceil(value: i64, divisor: i64) -> i64 {
    (value + divisor - 1) / divisor
}

/// Integer prefix of a decimal string: `"95000.50"` yields 95000.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn formats_salary_with_separators() {
        assert_eq!(
            salary_range(Some("100000"), Some("150000")),
            "$100,000 - $150,000"
        );
        assert_eq!(salary_range(Some("950.75"), Some("1200")), "$950 - $1,200");
        assert_eq!(
            salary_range(Some("1000000"), Some("12345678")),
            "$1,000,000 - $12,345,678"
        );
    }

    #[test]
    fn missing_or_blank_bound_is_competitive() {
        assert_eq!(salary_range(None, Some("150000")), "Competitive");
        assert_eq!(salary_range(Some("100000"), None), "Competitive");
        assert_eq!(salary_range(Some(""), Some("150000")), "Competitive");
        assert_eq!(salary_range(Some("negotiable"), Some("1")), "Competitive");
    }

    #[test]
    fn initials_take_first_two_words() {
        assert_eq!(company_initials("Acme Corp"), "AC");
        assert_eq!(company_initials("tech corp inc."), "TC");
        assert_eq!(company_initials("Globex"), "G");
        assert_eq!(company_initials("  spaced   out "), "SO");
        assert_eq!(company_initials(""), "");
    }

    #[test]
    fn posted_date_buckets() {
        let now = Utc::now();
        assert_eq!(posted_ago(now - Duration::hours(3), now), "1 day ago");
        assert_eq!(posted_ago(now, now), "0 days ago");
        assert_eq!(posted_ago(now - Duration::seconds(30), now), "0 days ago");
        assert_eq!(posted_ago(now - Duration::minutes(1), now), "1 day ago");
        assert_eq!(posted_ago(now - Duration::days(2), now), "2 days ago");
        assert_eq!(
            posted_ago(now - Duration::days(2) - Duration::hours(1), now),
            "3 days ago"
        );
        assert_eq!(posted_ago(now - Duration::days(7), now), "1 weeks ago");
        assert_eq!(posted_ago(now - Duration::days(10), now), "2 weeks ago");
        assert_eq!(posted_ago(now - Duration::days(45), now), "2 months ago");
    }

    #[test]
    fn posted_date_ignores_sub_minute_drift() {
        let posted = Utc::now() - Duration::days(2);
        let now = posted + Duration::days(2) + Duration::seconds(5);
        assert_eq!(posted_ago(posted, now), "2 days ago");
    }
}
