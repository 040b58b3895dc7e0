use crate::domain::profile::Profile;
use crate::domain::request::{BorrowRequest, PaymentStatus};
use crate::error::Result;
use std::io::Write;

/// Writes the final marketplace state as CSV reports.
///
/// Decimals are normalized (no trailing zeros) and rows are sorted by id so
/// replays produce identical output.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(target: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(target),
        }
    }

    pub fn write_requests(&mut self, mut requests: Vec<BorrowRequest>) -> Result<()> {
        requests.sort_by_key(|request| request.id);
        self.writer.write_record([
            "request", "item", "borrower", "owner", "status", "rate", "days", "total", "paid",
        ])?;
        for request in requests {
            let paid = request.payment_status == PaymentStatus::Completed;
            self.writer.write_record([
                request.id.to_string(),
                request.item_id.to_string(),
                request.borrower.to_string(),
                request.owner.to_string(),
                request.status.to_string(),
                request.effective_rate().to_string(),
                request.effective_days().to_string(),
                request.total_cost.to_string(),
                paid.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_profiles(&mut self, mut profiles: Vec<Profile>) -> Result<()> {
        profiles.sort_by_key(|profile| profile.id);
        self.writer
            .write_record(["profile", "name", "trust_score", "ratings"])?;
        for profile in profiles {
            let trust = profile
                .trust_score
                .map(|score| score.round_dp(2).normalize().to_string())
                .unwrap_or_default();
            self.writer.write_record([
                profile.id.to_string(),
                profile.name,
                trust,
                profile.total_ratings.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::{Item, ItemCategory};
    use crate::domain::money::Rate;
    use crate::domain::review::Rating;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample_request() -> BorrowRequest {
        let item = Item::new_item(
            1,
            10,
            "Cordless drill".to_string(),
            ItemCategory::Tools,
            Rate::new(dec!(6.0)).unwrap(),
            None,
        );
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        BorrowRequest::open(100, &item, 20, start, 3, None, 1).unwrap()
    }

    #[test]
    fn test_requests_report_normalizes_decimals() {
        let mut buffer = Vec::new();
        let mut writer = ReportWriter::new(&mut buffer);
        writer.write_requests(vec![sample_request()]).unwrap();

        drop(writer);
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("request,item,borrower,owner,status,rate,days,total,paid"));
        assert!(output.contains("100,1,20,10,pending,6,3,18,false"));
    }

    #[test]
    fn test_requests_report_sorted_by_id() {
        let mut first = sample_request();
        first.id = 2;
        let mut second = sample_request();
        second.id = 1;

        let mut buffer = Vec::new();
        let mut writer = ReportWriter::new(&mut buffer);
        writer.write_requests(vec![first, second]).unwrap();

        drop(writer);
        let output = String::from_utf8(buffer).unwrap();
        let ids: Vec<&str> = output
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_profiles_report() {
        let mut rated = Profile::new(20, "Jordan".to_string());
        rated.record_rating(Rating::new(4).unwrap());
        rated.record_rating(Rating::new(5).unwrap());
        let unrated = Profile::new(10, "Sam".to_string());

        let mut buffer = Vec::new();
        let mut writer = ReportWriter::new(&mut buffer);
        writer.write_profiles(vec![rated, unrated]).unwrap();

        drop(writer);
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("profile,name,trust_score,ratings"));
        assert!(output.contains("10,Sam,,0"));
        assert!(output.contains("20,Jordan,4.5,2"));
    }
}
