use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeEntry {
    pub id: u64,
    #[serde(default)]
    pub client_id: u64,
    pub duration: i64,
    pub started_at: String,
    #[serde(default)]
    pub local_started_at: Option<String>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub billable: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientRecord {
    pub id: u64,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub fname: String,
    #[serde(default)]
    pub lname: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Project {
    pub id: u64,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Service {
    pub id: u64,
    pub name: String,
}

/// A monetary amount as the API represents it: a decimal string plus a
/// currency code.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Money {
    pub amount: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct InvoiceLine {
    #[serde(rename = "type")]
    pub line_type: u8,
    pub name: String,
    pub description: String,
    pub qty: String,
    pub unit_cost: Money,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Invoice {
    pub invoiceid: u64,
    pub invoice_number: String,
    pub amount: Money,
    #[serde(default)]
    pub v3_status: String,
}
