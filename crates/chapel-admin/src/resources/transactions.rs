//! Giving transactions
//!
//! Online gifts arrive from the payment processor; admins record offline
//! gifts (cash, check) by hand and may refund any completed gift up to its
//! remaining amount.

use super::{list_with, non_blank, Draft, Id, Resource};
use crate::client::ApiClient;
use crate::error::{AdminError, Result};
use crate::filters::DateRangeFilter;
use crate::pagination::{Page, Pagination};
use chapel_forms::money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
    PartiallyRefunded,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
            Self::PartiallyRefunded => "partially_refunded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Id,
    #[serde(with = "money::amount")]
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub status: TransactionStatus,
    #[serde(default)]
    pub donor_name: Option<String>,
    #[serde(default)]
    pub donor_email: Option<String>,
    #[serde(default)]
    pub fund: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default, with = "money::amount")]
    pub refunded_amount: Decimal,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_currency() -> String {
    "USD".into()
}

impl Transaction {
    pub fn refundable(&self) -> Decimal {
        match self.status {
            TransactionStatus::Completed | TransactionStatus::PartiallyRefunded => {
                self.amount
                    .checked_sub(self.refunded_amount)
                    .unwrap_or(Decimal::ZERO)
                    .max(Decimal::ZERO)
            }
            _ => Decimal::ZERO,
        }
    }
}

/// Manually recorded gift
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    #[serde(with = "money::amount")]
    pub amount: Decimal,
    pub currency: String,
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    pub fund: Option<String>,
    pub payment_method: Option<String>,
}

impl Draft for TransactionDraft {
    type Record = Transaction;

    fn from_record(record: &Transaction) -> Self {
        Self {
            amount: record.amount,
            currency: record.currency.clone(),
            donor_name: record.donor_name.clone(),
            donor_email: record.donor_email.clone(),
            fund: record.fund.clone(),
            payment_method: record.payment_method.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(AdminError::validation("Amount must be greater than zero"));
        }
        if let Some(email) = non_blank(&self.donor_email) {
            if !email.contains('@') {
                return Err(AdminError::validation("Donor email is not valid"));
            }
        }
        Ok(())
    }

    fn normalize(&self) -> Self {
        let currency = self.currency.trim().to_ascii_uppercase();
        Self {
            amount: self.amount.round_dp(2),
            currency: if currency.is_empty() { default_currency() } else { currency },
            donor_name: non_blank(&self.donor_name),
            donor_email: non_blank(&self.donor_email),
            fund: Some(non_blank(&self.fund).unwrap_or_else(|| "general".into())),
            payment_method: Some(non_blank(&self.payment_method).unwrap_or_else(|| "cash".into())),
        }
    }
}

pub struct Transactions;

impl Resource for Transactions {
    const PATH: &'static str = "/transactions";
    const NAME: &'static str = "transactions";
    type Record = Transaction;
    type Draft = TransactionDraft;

    fn id(record: &Transaction) -> Id {
        record.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub search: Option<String>,
    pub status: Option<TransactionStatus>,
    pub dates: DateRangeFilter,
}

pub async fn list_filtered(client: &ApiClient, page: Pagination, filter: &TransactionFilter) -> Result<Page<Transaction>> {
    filter.dates.validate()?;
    let mut query = filter.dates.query("start_date", "end_date");
    if let Some(search) = non_blank(&filter.search) {
        query.push(("search", search));
    }
    if let Some(status) = filter.status {
        query.push(("status", status.as_str().to_string()));
    }
    list_with::<Transactions>(client, page, query).await
}

#[derive(Debug, Serialize)]
struct RefundBody<'a> {
    #[serde(with = "money::amount")]
    amount: Decimal,
    reason: &'a str,
}

/// Refund part or all of a gift
///
/// `amount` defaults to everything still refundable.
pub async fn refund(client: &ApiClient, transaction: &Transaction, amount: Option<Decimal>, reason: &str) -> Result<Transaction> {
    let refundable = transaction.refundable();
    let amount = amount.unwrap_or(refundable);
    if refundable <= Decimal::ZERO {
        return Err(AdminError::validation("This transaction cannot be refunded"));
    }
    if amount <= Decimal::ZERO || amount > refundable {
        return Err(AdminError::Validation(format!("Refund amount must be between 0 and {}", refundable)));
    }
    super::require(reason, "Refund reason")?;

    let path = format!("{}/{}/refund", Transactions::PATH, transaction.id);
    let updated = client.post(&path, &RefundBody { amount, reason: reason.trim() }).await?;
    info!(id = transaction.id, %amount, "transaction refunded");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;
    use axum::{extract::Path, routing::post, Json, Router};
    use serde_json::{json, Value};

    fn gift(status: TransactionStatus, refunded: i64) -> Transaction {
        Transaction {
            id: 5,
            amount: Decimal::new(100, 0),
            currency: "USD".into(),
            status,
            donor_name: Some("Lee".into()),
            donor_email: None,
            fund: None,
            payment_method: Some("card".into()),
            refunded_amount: Decimal::new(refunded, 0),
            created_at: None,
        }
    }

    #[test]
    fn test_refundable() {
        assert_eq!(gift(TransactionStatus::Completed, 0).refundable(), Decimal::new(100, 0));
        assert_eq!(gift(TransactionStatus::PartiallyRefunded, 40).refundable(), Decimal::new(60, 0));
        assert_eq!(gift(TransactionStatus::Failed, 0).refundable(), Decimal::ZERO);

        let mut odd = gift(TransactionStatus::Completed, 0);
        odd.amount = Decimal::MAX;
        odd.refunded_amount = Decimal::MIN;
        assert_eq!(odd.refundable(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_refund_checks_before_sending() {
        let client = ApiClient::new("http://127.0.0.1:9", None);
        let partial = gift(TransactionStatus::PartiallyRefunded, 40);
        assert!(matches!(refund(&client, &partial, Some(Decimal::new(61, 0)), "dup").await, Err(AdminError::Validation(_))));
        assert!(refund(&client, &partial, None, " ").await.is_err());
        assert!(refund(&client, &gift(TransactionStatus::Refunded, 100), None, "dup").await.is_err());
    }

    #[tokio::test]
    async fn test_refund_posts_remaining_amount() {
        let router = Router::new().route(
            "/transactions/:id/refund",
            post(|Path(id): Path<Id>, Json(body): Json<Value>| async move {
                Json(json!({
                    "id": id, "amount": 100, "status": "refunded",
                    "refunded_amount": body["amount"].as_f64().unwrap_or_default() + 40.0
                }))
            }),
        );
        let client = ApiClient::new(&mock::serve(router).await, None);
        let updated = refund(&client, &gift(TransactionStatus::PartiallyRefunded, 40), None, "Duplicate gift").await.unwrap();
        assert_eq!(updated.status, TransactionStatus::Refunded);
        assert_eq!(updated.refunded_amount, Decimal::new(100, 0));
        assert_eq!(updated.currency, "USD");
    }

    #[test]
    fn test_manual_gift_normalize() {
        let draft = TransactionDraft { amount: Decimal::new(12346, 3), currency: " usd".into(), ..Default::default() };
        assert!(draft.validate().is_ok());
        let payload = draft.normalize();
        assert_eq!(payload.amount, Decimal::new(1235, 2));
        assert_eq!(payload.currency, "USD");
        assert_eq!(payload.fund.as_deref(), Some("general"));
        assert_eq!(payload.payment_method.as_deref(), Some("cash"));
    }
}
