use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug)]
pub(crate) struct LedgerRecord {
    pub(crate) id: Option<String>,
    pub(crate) name: String,
    pub(crate) client: String,
    pub(crate) current_stage: u8,
    pub(crate) estimated_value: f64,
    pub(crate) deadline: Option<DateTime<Utc>>,
    pub(crate) status: String,
    pub(crate) created_at: Option<DateTime<Utc>>,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<LedgerRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for record in csv_reader.deserialize::<LedgerRow>() {
        let row = record?;
        records.push(LedgerRecord {
            id: row.id.clone(),
            name: row.name.clone(),
            client: row.client.clone().unwrap_or_default(),
            current_stage: row.current_stage,
            estimated_value: row.estimated_value.unwrap_or(0.0),
            deadline: row.deadline.as_deref().and_then(parse_datetime),
            status: row.status.clone().unwrap_or_else(|| "active".to_string()),
            created_at: row.created_at.as_deref().and_then(parse_datetime),
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct LedgerRow {
    #[serde(rename = "Project ID", default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Client", default, deserialize_with = "empty_string_as_none")]
    client: Option<String>,
    #[serde(rename = "Current Stage")]
    current_stage: u8,
    #[serde(rename = "Estimated Value", default)]
    estimated_value: Option<f64>,
    #[serde(rename = "Deadline", default, deserialize_with = "empty_string_as_none")]
    deadline: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(rename = "Created At", default, deserialize_with = "empty_string_as_none")]
    created_at: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc));
    }

    None
}

#[cfg(test)]
pub(crate) fn parse_datetime_for_tests(value: &str) -> Option<DateTime<Utc>> {
    parse_datetime(value)
}
