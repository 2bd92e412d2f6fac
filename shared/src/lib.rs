use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar code for solar (Gregorian) birthdays
pub const SOLAR_TYPE: &str = "a";
/// Calendar code for lunar birthdays
pub const LUNAR_TYPE: &str = "b";

/// One line of the birthday text store.
///
/// Line format: `name[-year]-month-day-type[-department]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthdayRecord {
    pub name: String,
    /// Birth year, informational only (never used for matching)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub month: String,
    pub day: String,
    /// `a` = solar, `b` = lunar; other values are matched as solar
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// The exact source line; acts as the record key for edits
    pub original_line: String,
}

impl BirthdayRecord {
    /// Whether this record is matched against the lunar calendar
    pub fn is_lunar(&self) -> bool {
        self.record_type == LUNAR_TYPE
    }
}

/// Record fields as supplied by a client, without the source line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFields {
    pub name: String,
    #[serde(default)]
    pub year: Option<String>,
    pub month: String,
    pub day: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub department: Option<String>,
}

/// A department label with the number of records referencing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub name: String,
    pub count: usize,
}

/// A record confirmed to have its birthday today
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayBirthday {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub is_lunar: bool,
}

/// A date in the Chinese lunisolar calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LunarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// True when the day lies in an intercalary month
    pub is_leap: bool,
}

impl fmt::Display for LunarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let leap = if self.is_leap { "leap " } else { "" };
        write!(f, "{}-{}{:02}-{:02}", self.year, leap, self.month, self.day)
    }
}

/// Why a line was flagged by the strict parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticReason {
    /// Fewer than four `-` separated fields; the line was dropped
    TooFewFields,
    EmptyName,
    MissingType,
    NonNumericDate,
    UnknownCalendarType,
}

/// A problem found in one line of the text store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseDiagnostic {
    /// 1-based position in the submitted text, blank lines included
    pub line_number: usize,
    pub line: String,
    pub reason: DiagnosticReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// Generic acknowledgement body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// JSON error body used across the admin API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentListResponse {
    pub departments: Vec<Department>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveDepartmentResponse {
    pub success: bool,
    /// Number of records dropped along with the department
    pub removed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayResponse {
    pub today: Vec<TodayBirthday>,
    /// Solar date the match was computed for (YYYY-MM-DD)
    pub date: String,
    pub lunar: LunarDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateApiKeyRequest {
    #[serde(default)]
    pub custom_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateApiKeyResponse {
    pub success: bool,
    pub api_key: String,
    pub endpoint: String,
}

/// Parsed view of the text store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordListResponse {
    pub records: Vec<BirthdayRecord>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordRequest {
    pub original_line: String,
    pub record: RecordFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordResponse {
    pub success: bool,
    pub record: BirthdayRecord,
}

/// Returned with 422 when strict saving finds problems
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsResponse {
    pub error: String,
    pub code: String,
    pub diagnostics: Vec<ParseDiagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarDateResponse {
    pub date: String,
}
