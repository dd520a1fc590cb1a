use super::models::{ActiveModel, ActivityType};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use serde_json::{Value, json};
use uuid::Uuid;

/// The record an activity is about
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedObject {
    pub kind: &'static str,
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub activity_type: ActivityType,
    pub title: String,
    pub description: String,
    pub related: Option<RelatedObject>,
    pub extra_data: Value,
}

impl NewActivity {
    fn about(
        activity_type: ActivityType,
        kind: &'static str,
        id: Uuid,
        name: &str,
        title: String,
        description: String,
        extra_data: Value,
    ) -> Self {
        Self {
            activity_type,
            title,
            description,
            related: Some(RelatedObject {
                kind,
                id,
                name: name.to_string(),
            }),
            extra_data,
        }
    }
}

pub fn client_created(id: Uuid, name: &str) -> NewActivity {
    NewActivity::about(
        ActivityType::ClientCreated,
        "client",
        id,
        name,
        format!("New client: {name}"),
        format!("Client {name} was added"),
        json!({ "client_id": id, "client_name": name }),
    )
}

pub fn farm_created(
    id: Uuid,
    name: &str,
    client_name: &str,
    contractor_name: Option<&str>,
) -> NewActivity {
    let contractor = contractor_name
        .map(|c| format!(" with contractor {c}"))
        .unwrap_or_default();
    NewActivity::about(
        ActivityType::FarmCreated,
        "farm",
        id,
        name,
        format!("New farm: {name}"),
        format!("Farm {name} was added for client {client_name}{contractor}"),
        json!({
            "farm_id": id,
            "farm_name": name,
            "client_name": client_name,
            "contractor_name": contractor_name,
        }),
    )
}

pub fn parcel_created(
    id: Uuid,
    name: &str,
    area_hectares: Decimal,
    farm_name: &str,
) -> NewActivity {
    NewActivity::about(
        ActivityType::ParcelCreated,
        "parcel",
        id,
        name,
        format!("New parcel: {name}"),
        format!("Parcel {name} ({area_hectares} ha) was added to farm {farm_name}"),
        json!({
            "parcel_id": id,
            "parcel_name": name,
            "area_hectares": area_hectares.to_string(),
            "farm_name": farm_name,
        }),
    )
}

pub fn product_created(id: Uuid, name: &str, unit: &str, ingredients: &[String]) -> NewActivity {
    NewActivity::about(
        ActivityType::ProductCreated,
        "product",
        id,
        name,
        format!("New product: {name}"),
        format!(
            "Product {name} ({unit}) was added with active ingredients: {}",
            ingredients.join(", ")
        ),
        json!({
            "product_id": id,
            "product_name": name,
            "unit_of_measure": unit,
            "active_ingredients": ingredients,
        }),
    )
}

pub fn contractor_created(id: Uuid, name: &str, email: Option<&str>) -> NewActivity {
    NewActivity::about(
        ActivityType::ContractorCreated,
        "contractor",
        id,
        name,
        format!("New contractor: {name}"),
        format!("Contractor {name} was added"),
        json!({ "contractor_id": id, "contractor_name": name, "email": email }),
    )
}

pub fn contact_created(id: Uuid, name: &str, email: &str, client_id: Uuid) -> NewActivity {
    NewActivity::about(
        ActivityType::ContactCreated,
        "contact",
        id,
        name,
        format!("New contact: {name}"),
        format!("Contact {name} ({email}) was added"),
        json!({ "contact_id": id, "contact_name": name, "email": email, "client_id": client_id }),
    )
}

pub fn treatment_created(
    id: Uuid,
    client_name: &str,
    area_hectares: Decimal,
    scope: &str,
) -> NewActivity {
    NewActivity::about(
        ActivityType::TreatmentCreated,
        "treatment",
        id,
        client_name,
        format!("New treatment for {client_name}"),
        format!("A treatment was scheduled for {client_name} on {area_hectares} hectares"),
        json!({
            "treatment_id": id,
            "client_name": client_name,
            "area_hectares": area_hectares.to_string(),
            "scope_level": scope,
            "status": "scheduled",
        }),
    )
}

/// `changes` names the edited fields, e.g. `["status"]` or `["notes", "planned_date"]`
pub fn treatment_updated(
    id: Uuid,
    client_name: &str,
    changes: &[&str],
    extra: Value,
) -> NewActivity {
    NewActivity::about(
        ActivityType::TreatmentUpdated,
        "treatment",
        id,
        client_name,
        format!("Treatment updated for {client_name}"),
        format!("Changed: {}", changes.join(", ")),
        json!({ "treatment_id": id, "changes": changes, "details": extra }),
    )
}

pub fn communication_sent(id: Uuid, client_name: &str, recipient_count: usize) -> NewActivity {
    NewActivity::about(
        ActivityType::CommunicationSent,
        "treatment",
        id,
        client_name,
        format!("Communication sent for treatment #{}", &id.simple().to_string()[..8]),
        format!(
            "The treatment communication for {client_name} was sent to {recipient_count} recipients"
        ),
        json!({
            "treatment_id": id,
            "client_name": client_name,
            "recipient_count": recipient_count,
            "sent_at": Utc::now().to_rfc3339(),
        }),
    )
}

/// Appends to the feed. A failed write is logged and swallowed so the action
/// that triggered it still succeeds.
pub async fn record<C: ConnectionTrait>(db: &C, activity: NewActivity) {
    let (kind, id, name) = match activity.related {
        Some(related) => (
            Some(related.kind.to_string()),
            Some(related.id),
            Some(related.name),
        ),
        None => (None, None, None),
    };

    let row = ActiveModel {
        id: Set(Uuid::new_v4()),
        activity_type: Set(activity.activity_type),
        title: Set(activity.title.clone()),
        description: Set(activity.description),
        related_object_type: Set(kind),
        related_object_id: Set(id),
        related_object_name: Set(name),
        extra_data: Set(activity.extra_data),
        created_at: Set(Utc::now()),
    };

    match row.insert(db).await {
        Ok(_) => tracing::debug!(title = %activity.title, "Activity recorded"),
        Err(e) => tracing::warn!(title = %activity.title, error = %e, "Failed to record activity"),
    }
}
