//! Worship services
//!
//! Services are shown in a drag-reorderable table. A reorder sends the
//! full id order; the server's list is then taken as authoritative.

use super::{list_all, non_blank, require, Draft, Id, Resource};
use crate::client::ApiClient;
use crate::error::Result;
use crate::reorder::{Ordered, ReorderableList};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub day_of_week: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}

impl Ordered for Service {
    fn id(&self) -> Id {
        self.id
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDraft {
    pub title: String,
    pub description: String,
    pub day_of_week: Option<String>,
    pub start_time: Option<String>,
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    pub is_active: bool,
}

impl Default for ServiceDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            day_of_week: None,
            start_time: None,
            location: None,
            order: None,
            is_active: true,
        }
    }
}

impl Draft for ServiceDraft {
    type Record = Service;

    fn from_record(record: &Service) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            day_of_week: record.day_of_week.clone(),
            start_time: record.start_time.clone(),
            location: record.location.clone(),
            order: Some(record.order),
            is_active: record.is_active,
        }
    }

    fn validate(&self) -> Result<()> {
        require(&self.title, "Service title")
    }

    fn normalize(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            day_of_week: non_blank(&self.day_of_week),
            start_time: non_blank(&self.start_time),
            location: non_blank(&self.location),
            ..self.clone()
        }
    }
}

pub struct Services;

impl Resource for Services {
    const PATH: &'static str = "/services";
    const NAME: &'static str = "services";
    type Record = Service;
    type Draft = ServiceDraft;

    fn id(record: &Service) -> Id {
        record.id
    }
}

#[derive(Debug, Serialize)]
struct ReorderRequest<'a> {
    ids: &'a [Id],
}

/// Load the services table
pub async fn load(client: &ApiClient) -> Result<ReorderableList<Service>> {
    let mut items = list_all::<Services>(client).await?;
    items.sort_by_key(|s| s.order);
    Ok(ReorderableList::new(items))
}

/// Move a row and persist the new order
///
/// The list shows the new order immediately. On success it is replaced by
/// the server's copy; on failure it is rolled back and the error returned.
pub async fn reorder(client: &ApiClient, list: &mut ReorderableList<Service>, from: usize, to: usize) -> Result<()> {
    let Some(pending) = list.move_item(from, to)? else {
        return Ok(());
    };

    let path = format!("{}/reorder", Services::PATH);
    if let Err(e) = client.put::<serde_json::Value, _>(&path, &ReorderRequest { ids: &pending.ids }).await {
        warn!(error = %e, "service reorder rejected, rolling back");
        list.rollback();
        return Err(e);
    }

    match list_all::<Services>(client).await {
        Ok(mut fresh) => {
            fresh.sort_by_key(|s| s.order);
            list.confirm(fresh);
            info!(count = pending.ids.len(), "service order saved");
            Ok(())
        }
        Err(e) => {
            // Server accepted the order; keep the optimistic copy
            warn!(error = %e, "service reorder saved but refresh failed");
            list.commit();
            Err(e)
        }
    }
}
