use serde::{Deserialize, Serialize};

/// One sign's entry in the insight browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ZodiacInterpretationRecord {
    pub id: i64,
    pub sign: String,
    pub title: String,
    pub date_range: String,
    pub element: String,
    pub modality: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub summary: String,
    pub love: String,
    pub career: String,
    pub wellbeing: String,
    pub ritual: String,
    pub mantra: String,
    pub lucky_color: String,
    pub updated_at: String,
}
