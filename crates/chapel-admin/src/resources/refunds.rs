//! Refund requests
//!
//! Members ask for a refund against a transaction; an admin approves or
//! rejects it. A rejection must carry a reason.

use super::{list_with, non_blank, require, Draft, Id, Resource};
use crate::client::{Ack, ApiClient};
use crate::error::{AdminError, Result};
use crate::filters::DateRangeFilter;
use crate::pagination::{Page, Pagination};
use chapel_forms::money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundRequest {
    pub id: Id,
    pub transaction_id: Id,
    #[serde(with = "money::amount")]
    pub amount: Decimal,
    #[serde(default)]
    pub reason: String,
    pub status: RefundStatus,
    #[serde(default)]
    pub requester_name: Option<String>,
    #[serde(default)]
    pub admin_note: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefundRequestDraft {
    pub transaction_id: Id,
    #[serde(with = "money::amount")]
    pub amount: Decimal,
    pub reason: String,
}

impl Draft for RefundRequestDraft {
    type Record = RefundRequest;

    fn from_record(record: &RefundRequest) -> Self {
        Self {
            transaction_id: record.transaction_id,
            amount: record.amount,
            reason: record.reason.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.transaction_id <= 0 {
            return Err(AdminError::validation("Select a transaction"));
        }
        if self.amount <= Decimal::ZERO {
            return Err(AdminError::validation("Refund amount must be greater than zero"));
        }
        require(&self.reason, "Reason")
    }

    fn normalize(&self) -> Self {
        Self { reason: self.reason.trim().to_string(), ..self.clone() }
    }
}

pub struct RefundRequests;

impl Resource for RefundRequests {
    const PATH: &'static str = "/refund-requests";
    const NAME: &'static str = "refunds";
    type Record = RefundRequest;
    type Draft = RefundRequestDraft;

    fn id(record: &RefundRequest) -> Id {
        record.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct RefundFilter {
    pub status: Option<RefundStatus>,
    pub dates: DateRangeFilter,
}

pub async fn list_filtered(client: &ApiClient, page: Pagination, filter: &RefundFilter) -> Result<Page<RefundRequest>> {
    filter.dates.validate()?;
    let mut query = filter.dates.query("start_date", "end_date");
    if let Some(status) = filter.status {
        query.push(("status", status.as_str().to_string()));
    }
    list_with::<RefundRequests>(client, page, query).await
}

#[derive(Debug, Serialize)]
struct Decision {
    #[serde(skip_serializing_if = "Option::is_none")]
    admin_note: Option<String>,
}

pub async fn approve(client: &ApiClient, id: Id, note: Option<&str>) -> Result<Ack> {
    let body = Decision { admin_note: non_blank(&note.map(String::from)) };
    let ack = client.post(&format!("{}/{}/approve", RefundRequests::PATH, id), &body).await?;
    info!(id, "refund request approved");
    Ok(ack)
}

pub async fn reject(client: &ApiClient, id: Id, reason: &str) -> Result<Ack> {
    require(reason, "Rejection reason")?;
    let body = Decision { admin_note: Some(reason.trim().to_string()) };
    let ack = client.post(&format!("{}/{}/reject", RefundRequests::PATH, id), &body).await?;
    info!(id, "refund request rejected");
    Ok(ack)
}
