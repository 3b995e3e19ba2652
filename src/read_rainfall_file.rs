use crate::weather::{DailyRainfall, RainfallDay};
use anyhow::Context;
use chrono::NaiveDate;
use csv::ReaderBuilder as CsvReaderBuilder;
use serde::Deserialize;
use std::io::Read;

/// A daily rainfall series as a two-column CSV with a header row:
///
/// ```csv
/// date,rain_mm
/// 2024-06-01,0.0
/// 2024-06-02,12.4
/// ```
///
/// Malformed rows are errors, not skips.
pub fn rainfall_data_from_csv(file: impl Read) -> anyhow::Result<DailyRainfall> {
    let mut reader = CsvReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    let mut days = vec![];
    for (row, record) in reader.deserialize::<RainfallRecord>().enumerate() {
        let record = record.with_context(|| format!("rainfall CSV row {}", row + 1))?;
        days.push(RainfallDay {
            date: record.date,
            rain_mm: record.rain_mm,
        });
    }
    Ok(DailyRainfall::new(days))
}

#[derive(Debug, Deserialize)]
struct RainfallRecord {
    date: NaiveDate,
    rain_mm: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Cursor;

    #[rstest]
    fn should_read_a_daily_series() {
        let csv = "date,rain_mm\n2024-06-01,0.0\n2024-06-02,12.4\n";
        let series = rainfall_data_from_csv(Cursor::new(csv)).unwrap();
        assert_eq!(series.days().len(), 2);
        assert_eq!(
            series.days()[1],
            RainfallDay {
                date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
                rain_mm: 12.4,
            }
        );
    }

    #[rstest]
    fn should_fail_on_unparseable_depth() {
        let csv = "date,rain_mm\n2024-06-01,plenty\n";
        assert!(rainfall_data_from_csv(Cursor::new(csv)).is_err());
    }

    #[rstest]
    fn should_fail_on_unparseable_date() {
        let csv = "date,rain_mm\n01/06/2024,3.0\n";
        assert!(rainfall_data_from_csv(Cursor::new(csv)).is_err());
    }

    #[rstest]
    fn should_read_an_empty_file_as_an_empty_series() {
        let csv = "date,rain_mm\n";
        let series = rainfall_data_from_csv(Cursor::new(csv)).unwrap();
        assert!(series.is_empty());
    }
}
