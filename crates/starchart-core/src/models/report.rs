//! Report records. Payloads are produced by the backend and only rendered here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ReportSection {
    pub id: String,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AstrologyReportPayload {
    pub generated_at: String,
    pub sign: String,
    pub sun: String,
    pub moon: String,
    pub rising: String,
    #[serde(default)]
    pub sections: Vec<ReportSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AstrologyReportRecord {
    pub id: i64,
    pub report_type: String,
    pub generated_at: String,
    pub payload: AstrologyReportPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ZodiacReportPayload {
    pub generated_at: String,
    pub zodiac: String,
    pub element: String,
    pub summary: String,
    pub year: i32,
    #[serde(default)]
    pub sections: Vec<ReportSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ZodiacReportRecord {
    pub id: i64,
    pub year: i32,
    pub generated_at: String,
    pub payload: ZodiacReportPayload,
}
