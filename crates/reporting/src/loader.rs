//! Typed CSV loading. Every row is validated against the campaign schema;
//! the first bad row aborts the load with its line number.

use campaign_core::types::CAMPAIGN_COLUMNS;
use campaign_core::{CampaignError, CampaignRecord, CampaignResult};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Raw rows plus the content digest of the file they came from.
#[derive(Debug, Clone)]
pub struct RawDataset {
    pub records: Vec<CampaignRecord>,
    /// Hex SHA-256 of the file bytes.
    pub digest: String,
}

/// Read and parse the interchange file at `path`.
pub fn read_dataset(path: &Path) -> CampaignResult<RawDataset> {
    let bytes = fs::read(path).map_err(|e| CampaignError::dataset_io(path, e))?;

    let digest = hex::encode(Sha256::digest(&bytes));
    let records = parse_records(bytes.as_slice())?;
    debug!(path = %path.display(), rows = records.len(), digest = %digest, "Dataset parsed");

    Ok(RawDataset { records, digest })
}

/// Parse campaign rows from any CSV source with the interchange header.
pub fn parse_records<R: io::Read>(reader: R) -> CampaignResult<Vec<CampaignRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(malformed)?.clone();
    for column in CAMPAIGN_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(CampaignError::MalformedRow {
                line: 1,
                reason: format!("missing column '{column}'"),
            });
        }
    }

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result.map_err(malformed)?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let record: CampaignRecord = row
            .deserialize(Some(&headers))
            .map_err(|e| CampaignError::MalformedRow {
                line,
                reason: describe(&e),
            })?;
        check_row(&record).map_err(|reason| CampaignError::MalformedRow { line, reason })?;

        records.push(record);
    }
    Ok(records)
}

/// Constraints the derived metrics rely on.
fn check_row(record: &CampaignRecord) -> Result<(), String> {
    if !record.budget_brl.is_finite() {
        return Err(format!("Budget_BRL is not a finite number ({})", record.budget_brl));
    }
    if record.budget_brl < 0.0 {
        return Err(format!("Budget_BRL is negative ({})", record.budget_brl));
    }
    if record.end_date <= record.start_date {
        return Err(format!(
            "EndDate {} is not after StartDate {}",
            record.end_date, record.start_date
        ));
    }
    if record.campaign_id.is_empty() {
        return Err("CampaignID is empty".to_string());
    }
    Ok(())
}

fn malformed(err: csv::Error) -> CampaignError {
    if err.is_io_error() {
        return CampaignError::Csv(err);
    }
    let line = err.position().map(|p| p.line()).unwrap_or_default();
    CampaignError::MalformedRow {
        line,
        reason: describe(&err),
    }
}

fn describe(err: &csv::Error) -> String {
    match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::Channel;

    const HEADER: &str =
        "CampaignID,Channel,StartDate,EndDate,Budget_BRL,Impressions,Clicks,Conversions,Ad_Group,Device,Region\n";

    fn parse(body: &str) -> CampaignResult<Vec<CampaignRecord>> {
        parse_records(format!("{HEADER}{body}").as_bytes())
    }

    fn reason_and_line(err: CampaignError) -> (u64, String) {
        match err {
            CampaignError::MalformedRow { line, reason } => (line, reason),
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn test_parses_valid_rows_with_null_conversions() {
        let rows = parse(
            "CAMP001,Email,2024-02-01,2024-02-20,512.34,90000,4000,,Boas_Vindas,Mobile,Sul\n\
             CAMP002,Paid Ads,2024-03-01,2024-03-09,4000.5,1200000,22000,450,Search_Marca,Desktop,Nacional\n",
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].channel, Channel::Email);
        assert_eq!(rows[0].conversions, None);
        assert_eq!(rows[1].conversions, Some(450));
        assert_eq!(rows[1].budget_brl, 4000.5);
        assert_eq!(rows[1].start_date.to_string(), "2024-03-01");
    }

    #[test]
    fn test_non_numeric_budget_is_rejected_with_line() {
        let err = parse(
            "CAMP001,Email,2024-02-01,2024-02-20,512.34,90000,4000,10,Boas_Vindas,Mobile,Sul\n\
             CAMP002,Email,2024-02-01,2024-02-20,lots,90000,4000,10,Boas_Vindas,Mobile,Sul\n",
        )
        .unwrap_err();
        let (line, reason) = reason_and_line(err);
        assert_eq!(line, 3);
        assert!(reason.contains("field 4"), "{reason}");
    }

    #[test]
    fn test_unknown_channel_is_rejected() {
        let err = parse("CAMP001,Radio,2024-02-01,2024-02-20,512.34,90000,4000,10,X,Mobile,Sul\n")
            .unwrap_err();
        let (line, _) = reason_and_line(err);
        assert_eq!(line, 2);
    }

    #[test]
    fn test_negative_clicks_are_rejected() {
        let err = parse("CAMP001,Email,2024-02-01,2024-02-20,512.34,90000,-4,10,X,Mobile,Sul\n")
            .unwrap_err();
        assert!(matches!(err, CampaignError::MalformedRow { .. }));
    }

    #[test]
    fn test_end_date_must_follow_start_date() {
        let err = parse("CAMP001,Email,2024-02-20,2024-02-20,512.34,90000,40,10,X,Mobile,Sul\n")
            .unwrap_err();
        let (_, reason) = reason_and_line(err);
        assert!(reason.contains("EndDate"), "{reason}");
    }

    #[test]
    fn test_nan_budget_is_rejected() {
        let err = parse("CAMP001,Email,2024-02-01,2024-02-20,NaN,90000,40,10,X,Mobile,Sul\n")
            .unwrap_err();
        let (_, reason) = reason_and_line(err);
        assert!(reason.contains("finite"), "{reason}");
    }

    #[test]
    fn test_short_row_is_rejected() {
        let err = parse("CAMP001,Email,2024-02-01\n").unwrap_err();
        let (line, reason) = reason_and_line(err);
        assert_eq!(line, 2);
        assert!(reason.contains("expected 11 fields"), "{reason}");
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let err = parse_records(
            "CampaignID,Channel,StartDate,EndDate,Budget_BRL,Impressions,Clicks,Ad_Group,Device,Region\n"
                .as_bytes(),
        )
        .unwrap_err();
        let (line, reason) = reason_and_line(err);
        assert_eq!(line, 1);
        assert!(reason.contains("Conversions"));
    }

    #[test]
    fn test_missing_file_is_dataset_missing() {
        let path = std::env::temp_dir().join("campaign-reporting-does-not-exist.csv");
        let err = read_dataset(&path).unwrap_err();
        assert!(err.is_dataset_missing());
    }
}
