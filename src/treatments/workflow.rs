//! Multi-treatment workflows: communication to the client, bulk status
//! actions, the pre-communication preview and the status counters.

use super::communications::models as communications;
use super::communications::models::TreatmentCommunication;
use super::models::{Model, ScopeLevel, Treatment, TreatmentStatus};
use super::services;
use super::status::BulkAction;
use crate::common::errors::{BusinessError, BusinessResult, DbErrorExt};
use crate::common::state::AppState;
use crate::external::documents::{CommunicationDocument, DocumentProduct, DocumentTreatment};
use crate::external::notifier::{self, OutgoingMessage};
use crate::{activity, business_rule_violation, clients, validation_error};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema, Deserialize, Debug, Clone, Default)]
pub struct CommunicateRequest {
    /// Free text appended to the document
    #[serde(default)]
    pub notes: String,
    /// Send even when the treatment is already in execution or closed.
    /// The status of such treatments is left untouched.
    #[serde(default)]
    pub force: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct CommunicationResult {
    pub client_id: Uuid,
    pub treatment_ids: Vec<Uuid>,
    pub recipients: Vec<String>,
    pub subject: String,
    pub attachment_name: Option<String>,
    pub delivered: bool,
    pub error: Option<String>,
    pub communications: Vec<TreatmentCommunication>,
}

#[derive(ToSchema, Deserialize, Debug, Clone)]
pub struct BulkRequest {
    pub action: BulkAction,
    pub treatment_ids: Vec<Uuid>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BulkItemError {
    pub treatment_id: Uuid,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct BulkResult {
    pub action: BulkAction,
    pub selected: usize,
    pub succeeded: usize,
    pub errors: Vec<BulkItemError>,
}

#[derive(ToSchema, Deserialize, Debug, Clone)]
pub struct PreviewRequest {
    pub treatment_ids: Vec<Uuid>,
    #[serde(default)]
    pub exclude_communicated: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PreviewProduct {
    pub name: String,
    pub dosage_per_hectare: Decimal,
    pub unit: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct PreviewTreatment {
    pub id: Uuid,
    pub scope_level: ScopeLevel,
    pub farm_name: Option<String>,
    pub parcel_names: Vec<String>,
    pub area_hectares: Decimal,
    pub status: TreatmentStatus,
    pub planned_date: Option<chrono::NaiveDate>,
    pub products: Vec<PreviewProduct>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct ClientPreview {
    pub client_id: Uuid,
    pub client_name: String,
    pub total_area_hectares: Decimal,
    pub treatments: Vec<PreviewTreatment>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub scheduled: u64,
    pub communicated: u64,
    pub in_execution: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub total: u64,
}

fn dedup(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Client contacts (by name) followed by the responsible contractors'
/// addresses, without case-insensitive duplicates
pub async fn resolve_recipients<C: ConnectionTrait>(
    db: &C,
    client_id: Uuid,
    treatments: &[Model],
) -> BusinessResult<Vec<String>> {
    let contacts = clients::contacts::models::Entity::find()
        .filter(clients::contacts::models::Column::ClientId.eq(client_id))
        .order_by_asc(clients::contacts::models::Column::Name)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("contact"))?;

    let mut addresses: Vec<String> = contacts.into_iter().map(|c| c.email).collect();
    for treatment in treatments {
        if let Some(email) = services::responsible_contractor(db, treatment)
            .await?
            .and_then(|c| c.email)
        {
            addresses.push(email);
        }
    }

    let mut seen = HashSet::new();
    Ok(addresses
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty() && seen.insert(a.to_lowercase()))
        .collect())
}

fn scope_label(detail: &Treatment) -> String {
    match detail.scope_level {
        ScopeLevel::Client => format!("All farms of {}", detail.client_name),
        ScopeLevel::Farm => format!("Farm {}", detail.farm_name.as_deref().unwrap_or("?")),
        ScopeLevel::Parcels => {
            let names: Vec<&str> = detail.parcels.iter().map(|p| p.name.as_str()).collect();
            format!("Parcels {}", names.join(", "))
        }
    }
}

fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

fn subject_for(details: &[Treatment], client_name: &str) -> String {
    match details {
        [single] => match single.planned_date {
            Some(date) => format!(
                "Treatment #{} - {client_name} - Planned: {}",
                short_id(single.id),
                date.format("%d/%m/%Y")
            ),
            None => format!("Treatment #{} - {client_name}", short_id(single.id)),
        },
        _ => format!("{} treatments - {client_name}", details.len()),
    }
}

fn reference_for(first: Uuid, client_name: &str) -> String {
    let client: String = client_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("Treatment_{}_{client}", short_id(first))
}

fn document_treatment(detail: &Treatment) -> DocumentTreatment {
    DocumentTreatment {
        id: detail.id,
        scope_label: scope_label(detail),
        area_hectares: detail.interested_area_hectares,
        planned_date: detail.planned_date,
        contractor: detail.contractor.as_ref().map(|c| c.name.clone()),
        notes: detail.notes.clone(),
        products: detail
            .products
            .iter()
            .map(|line| DocumentProduct {
                name: line.product_name.clone(),
                unit: line.unit_of_measure.clone(),
                dosage_per_hectare: line.dosage_per_hectare,
                total_quantity: line.total_quantity,
            })
            .collect(),
    }
}

/// Sends one communication covering `treatment_ids`, which must all belong
/// to the same client.
///
/// A delivery failure is not an error: it is logged per treatment and
/// reported in the result, and no status changes. On success every
/// scheduled or communicated treatment moves to `communicated`.
pub async fn communicate(
    state: &AppState,
    treatment_ids: &[Uuid],
    notes: &str,
    force: bool,
) -> BusinessResult<CommunicationResult> {
    let ids = dedup(treatment_ids);
    if ids.is_empty() {
        return Err(validation_error!("treatment_ids", "must not be empty"));
    }

    let mut treatments = Vec::with_capacity(ids.len());
    for id in &ids {
        treatments.push(services::find_treatment(&state.db, *id).await?);
    }

    let client_id = treatments[0].client_id;
    if treatments.iter().any(|t| t.client_id != client_id) {
        return Err(validation_error!(
            "treatment_ids",
            "all treatments of a communication must belong to the same client"
        ));
    }

    if !force {
        if let Some(closed) = treatments.iter().find(|t| {
            !matches!(
                t.status,
                TreatmentStatus::Scheduled | TreatmentStatus::Communicated
            )
        }) {
            return Err(business_rule_violation!(
                "communicate_status",
                format!(
                    "treatment {} is {} and can no longer be communicated",
                    closed.id,
                    closed.status.as_str()
                )
            ));
        }
    }

    let recipients = resolve_recipients(&state.db, client_id, &treatments).await?;
    if recipients.is_empty() {
        return Err(validation_error!(
            "recipients",
            "the client has no contact address and no contractor e-mail is known"
        ));
    }

    let mut details = Vec::with_capacity(treatments.len());
    for treatment in &treatments {
        details.push(services::to_detail(&state.db, treatment.clone()).await?);
    }
    let client_name = details[0].client_name.clone();

    let document = CommunicationDocument {
        reference: reference_for(ids[0], &client_name),
        client_name: client_name.clone(),
        generated_at: Utc::now(),
        notes: notes.to_string(),
        treatments: details.iter().map(document_treatment).collect(),
    };
    let rendered = state
        .renderer
        .render(&document)
        .map_err(|message| BusinessError::ExternalServiceError {
            service: "document_renderer".to_string(),
            message,
        })?;

    let subject = subject_for(&details, &client_name);
    let attachment_name = rendered.filename.clone();
    let message = OutgoingMessage {
        recipients: recipients.clone(),
        subject: subject.clone(),
        body: format!(
            "Please find attached the communication for {} treatment(s) of {client_name}.",
            details.len()
        ),
        attachment: Some(rendered),
    };

    let outcome = notifier::deliver(state.notifier.as_ref(), &message).await;

    let txn = state
        .db
        .begin()
        .await
        .map_err(|e| e.to_business_error("treatment_communication"))?;

    let sent_at = Utc::now();
    let mut log = Vec::with_capacity(treatments.len());
    for treatment in &treatments {
        let row = communications::ActiveModel {
            id: Set(Uuid::new_v4()),
            treatment_id: Set(treatment.id),
            sent_at: Set(sent_at),
            recipients: Set(recipients.join(",")),
            subject: Set(subject.clone()),
            attachment_name: Set(Some(attachment_name.clone())),
            delivered: Set(outcome.delivered),
            error: Set(outcome.error.clone()),
        }
        .insert(&txn)
        .await
        .map_err(|e| e.to_business_error("treatment_communication"))?;
        log.push(TreatmentCommunication::from(row));

        if outcome.delivered
            && matches!(
                treatment.status,
                TreatmentStatus::Scheduled | TreatmentStatus::Communicated
            )
        {
            services::set_status(&txn, treatment.id, TreatmentStatus::Communicated).await?;
        }
    }

    txn.commit()
        .await
        .map_err(|e| e.to_business_error("treatment_communication"))?;

    if outcome.delivered {
        for id in &ids {
            activity::services::record(
                &state.db,
                activity::services::communication_sent(*id, &client_name, recipients.len()),
            )
            .await;
        }
    }

    Ok(CommunicationResult {
        client_id,
        treatment_ids: ids,
        recipients,
        subject,
        attachment_name: Some(attachment_name),
        delivered: outcome.delivered,
        error: outcome.error,
        communications: log,
    })
}

/// Communication log of one treatment, most recent first
pub async fn communication_log(
    db: &DatabaseConnection,
    treatment_id: Uuid,
) -> BusinessResult<Vec<TreatmentCommunication>> {
    services::find_treatment(db, treatment_id).await?;
    let rows = communications::Entity::find()
        .filter(communications::Column::TreatmentId.eq(treatment_id))
        .order_by_desc(communications::Column::SentAt)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("treatment_communication"))?;
    Ok(rows.into_iter().map(TreatmentCommunication::from).collect())
}

/// Applies `action` to each treatment independently; failures are collected
/// per item instead of aborting the batch
pub async fn run_bulk(state: &AppState, request: BulkRequest) -> BusinessResult<BulkResult> {
    let ids = dedup(&request.treatment_ids);
    if ids.is_empty() {
        return Err(validation_error!("treatment_ids", "select at least one treatment"));
    }

    let mut errors = Vec::new();
    let mut eligible: Vec<Model> = Vec::new();
    for id in &ids {
        match services::find_treatment(&state.db, *id).await {
            Ok(treatment) if request.action.allows(treatment.status) => eligible.push(treatment),
            Ok(treatment) => errors.push(BulkItemError {
                treatment_id: *id,
                message: format!(
                    "status '{}' does not allow this action",
                    treatment.status.as_str()
                ),
            }),
            Err(err) => errors.push(BulkItemError {
                treatment_id: *id,
                message: err.to_string(),
            }),
        }
    }

    let mut succeeded = 0;
    match request.action {
        BulkAction::Communicate => {
            let mut groups: Vec<(Uuid, Vec<Uuid>)> = Vec::new();
            for treatment in &eligible {
                match groups.iter_mut().find(|(client, _)| *client == treatment.client_id) {
                    Some((_, members)) => members.push(treatment.id),
                    None => groups.push((treatment.client_id, vec![treatment.id])),
                }
            }

            for (_, members) in groups {
                match communicate(state, &members, "", false).await {
                    Ok(result) if result.delivered => succeeded += members.len(),
                    Ok(result) => errors.extend(members.iter().map(|id| BulkItemError {
                        treatment_id: *id,
                        message: format!(
                            "delivery failed: {}",
                            result.error.as_deref().unwrap_or("unknown reason")
                        ),
                    })),
                    Err(err) => errors.extend(members.iter().map(|id| BulkItemError {
                        treatment_id: *id,
                        message: err.to_string(),
                    })),
                }
            }
        }
        BulkAction::Complete | BulkAction::Cancel => {
            for treatment in &eligible {
                let target = request.action.target_status();
                match services::change_status(&state.db, treatment.id, target).await {
                    Ok(_) => succeeded += 1,
                    Err(err) => errors.push(BulkItemError {
                        treatment_id: treatment.id,
                        message: err.to_string(),
                    }),
                }
            }
        }
    }

    tracing::info!(
        action = ?request.action,
        selected = ids.len(),
        succeeded,
        failed = errors.len(),
        "Bulk treatment action finished"
    );

    Ok(BulkResult {
        action: request.action,
        selected: ids.len(),
        succeeded,
        errors,
    })
}

/// What a communication of `treatment_ids` would contain, grouped by client.
/// Unknown ids are skipped.
pub async fn communication_preview(
    db: &DatabaseConnection,
    request: &PreviewRequest,
) -> BusinessResult<Vec<ClientPreview>> {
    let mut groups: Vec<ClientPreview> = Vec::new();

    for id in dedup(&request.treatment_ids) {
        let treatment = match services::find_treatment(db, id).await {
            Ok(treatment) => treatment,
            Err(BusinessError::NotFound { .. }) => continue,
            Err(err) => return Err(err),
        };
        if request.exclude_communicated && treatment.status == TreatmentStatus::Communicated {
            continue;
        }

        let detail = services::to_detail(db, treatment).await?;
        let item = PreviewTreatment {
            id: detail.id,
            scope_level: detail.scope_level,
            farm_name: detail.farm_name.clone(),
            parcel_names: detail.parcels.iter().map(|p| p.name.clone()).collect(),
            area_hectares: detail.interested_area_hectares,
            status: detail.status,
            planned_date: detail.planned_date,
            products: detail
                .products
                .iter()
                .map(|line| PreviewProduct {
                    name: line.product_name.clone(),
                    dosage_per_hectare: line.dosage_per_hectare,
                    unit: line.unit_of_measure.clone(),
                })
                .collect(),
        };

        match groups.iter_mut().find(|g| g.client_id == detail.client_id) {
            Some(group) => {
                group.total_area_hectares += item.area_hectares;
                group.treatments.push(item);
            }
            None => groups.push(ClientPreview {
                client_id: detail.client_id,
                client_name: detail.client_name,
                total_area_hectares: item.area_hectares,
                treatments: vec![item],
            }),
        }
    }

    Ok(groups)
}

pub async fn status_summary(db: &DatabaseConnection) -> BusinessResult<StatusSummary> {
    let mut summary = StatusSummary::default();
    for status in TreatmentStatus::ALL {
        let count = super::models::Entity::find()
            .filter(super::models::Column::Status.eq(status))
            .count(db)
            .await
            .map_err(|e| e.to_business_error("treatment"))?;
        match status {
            TreatmentStatus::Scheduled => summary.scheduled = count,
            TreatmentStatus::Communicated => summary.communicated = count,
            TreatmentStatus::InExecution => summary.in_execution = count,
            TreatmentStatus::Completed => summary.completed = count,
            TreatmentStatus::Cancelled => summary.cancelled = count,
        }
        summary.total += count;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_replaces_unsafe_characters() {
        let id = Uuid::parse_str("1a2b3c4d-0000-4000-8000-000000000000").unwrap();
        assert_eq!(
            reference_for(id, "Acme S.r.l."),
            "Treatment_1a2b3c4d_Acme_S_r_l_"
        );
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup(&[a, b, a, b]), vec![a, b]);
    }
}
