use super::communications::models::TreatmentCommunication;
use super::models::{
    DosageChange, ProductDosage, ResponsibleContractor, StatusChange, Treatment, TreatmentArea,
    TreatmentCreate, TreatmentProductLine, TreatmentQuery, TreatmentSummary, TreatmentUpdate,
};
use super::services;
use super::workflow::{
    self, BulkRequest, BulkResult, ClientPreview, CommunicateRequest, CommunicationResult,
    PreviewRequest, StatusSummary,
};
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_treatments, create_treatment))
        .routes(routes!(treatment_status_summary))
        .routes(routes!(bulk_action))
        .routes(routes!(communication_preview))
        .routes(routes!(get_treatment, update_treatment, delete_treatment))
        .routes(routes!(change_status))
        .routes(routes!(get_interested_area))
        .routes(routes!(get_responsible_contractor))
        .routes(routes!(list_products, add_product))
        .routes(routes!(update_product_dosage, remove_product))
        .routes(routes!(communicate_treatment))
        .routes(routes!(list_communications))
        .with_state(state.clone())
}

#[utoipa::path(
    get,
    path = "/",
    params(TreatmentQuery),
    responses((status = 200, description = "Treatments, newest first", body = Vec<TreatmentSummary>)),
    tag = "treatments",
    summary = "List treatments"
)]
pub async fn list_treatments(
    State(state): State<AppState>,
    Query(query): Query<TreatmentQuery>,
) -> Result<Json<Vec<TreatmentSummary>>, BusinessError> {
    Ok(Json(services::list_treatments(&state.db, &query).await?))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = TreatmentCreate,
    responses(
        (status = 201, description = "Treatment scheduled", body = Treatment),
        (status = 400, description = "Scope, ownership or dosage is invalid"),
        (status = 404, description = "Client, farm, parcel or product not found"),
        (status = 409, description = "The same product is listed twice")
    ),
    tag = "treatments",
    summary = "Create treatment",
    description = "Creates the treatment, its parcel set and its product dosages in one transaction."
)]
pub async fn create_treatment(
    State(state): State<AppState>,
    Json(data): Json<TreatmentCreate>,
) -> Result<(StatusCode, Json<Treatment>), BusinessError> {
    let treatment = services::create_treatment(&state.db, data).await?;
    let detail = services::to_detail(&state.db, treatment).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/summary",
    responses((status = 200, description = "Number of treatments per status", body = StatusSummary)),
    tag = "treatments",
    summary = "Status counters"
)]
pub async fn treatment_status_summary(
    State(state): State<AppState>,
) -> Result<Json<StatusSummary>, BusinessError> {
    Ok(Json(workflow::status_summary(&state.db).await?))
}

#[utoipa::path(
    post,
    path = "/bulk",
    request_body = BulkRequest,
    responses(
        (status = 200, description = "Per-treatment outcome of the action", body = BulkResult),
        (status = 400, description = "No treatment selected")
    ),
    tag = "treatments",
    summary = "Bulk action",
    description = "Communicates scheduled treatments (one message per client), completes communicated or running ones, or cancels open ones."
)]
pub async fn bulk_action(
    State(state): State<AppState>,
    Json(request): Json<BulkRequest>,
) -> Result<Json<BulkResult>, BusinessError> {
    Ok(Json(workflow::run_bulk(&state, request).await?))
}

#[utoipa::path(
    post,
    path = "/communication_preview",
    request_body = PreviewRequest,
    responses((status = 200, description = "Treatments grouped by client", body = Vec<ClientPreview>)),
    tag = "treatments",
    summary = "Preview communication"
)]
pub async fn communication_preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<Vec<ClientPreview>>, BusinessError> {
    Ok(Json(workflow::communication_preview(&state.db, &request).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Treatment ID")),
    responses(
        (status = 200, description = "Treatment with scope, area, contractor and products", body = Treatment),
        (status = 404, description = "Treatment not found")
    ),
    tag = "treatments",
    summary = "Get treatment"
)]
pub async fn get_treatment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Treatment>, BusinessError> {
    Ok(Json(services::get_treatment(&state.db, id).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Treatment ID")),
    request_body = TreatmentUpdate,
    responses(
        (status = 200, description = "Notes or planned date updated", body = Treatment),
        (status = 404, description = "Treatment not found")
    ),
    tag = "treatments",
    summary = "Edit treatment"
)]
pub async fn update_treatment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<TreatmentUpdate>,
) -> Result<Json<Treatment>, BusinessError> {
    let treatment = services::update_treatment(&state.db, id, data).await?;
    Ok(Json(services::to_detail(&state.db, treatment).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Treatment ID")),
    responses(
        (status = 204, description = "Treatment deleted"),
        (status = 404, description = "Treatment not found")
    ),
    tag = "treatments",
    summary = "Delete treatment"
)]
pub async fn delete_treatment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BusinessError> {
    services::delete_treatment(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/status",
    params(("id" = Uuid, Path, description = "Treatment ID")),
    request_body = StatusChange,
    responses(
        (status = 200, description = "Status changed, timestamps latched on first arrival", body = Treatment),
        (status = 404, description = "Treatment not found")
    ),
    tag = "treatments",
    summary = "Change status"
)]
pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(change): Json<StatusChange>,
) -> Result<Json<Treatment>, BusinessError> {
    let treatment = services::change_status(&state.db, id, change.status).await?;
    Ok(Json(services::to_detail(&state.db, treatment).await?))
}

#[utoipa::path(
    get,
    path = "/{id}/area",
    params(("id" = Uuid, Path, description = "Treatment ID")),
    responses(
        (status = 200, description = "Hectares covered by the treatment scope", body = TreatmentArea),
        (status = 404, description = "Treatment not found")
    ),
    tag = "treatments",
    summary = "Interested area"
)]
pub async fn get_interested_area(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TreatmentArea>, BusinessError> {
    let treatment = services::find_treatment(&state.db, id).await?;
    let area_hectares = services::interested_area(&state.db, &treatment).await?;
    Ok(Json(TreatmentArea {
        treatment_id: id,
        scope_level: treatment.scope_level,
        area_hectares,
    }))
}

#[utoipa::path(
    get,
    path = "/{id}/contractor",
    params(("id" = Uuid, Path, description = "Treatment ID")),
    responses(
        (status = 200, description = "Responsible contractor, null when the farm has none", body = Option<ResponsibleContractor>),
        (status = 404, description = "Treatment not found")
    ),
    tag = "treatments",
    summary = "Responsible contractor"
)]
pub async fn get_responsible_contractor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Option<ResponsibleContractor>>, BusinessError> {
    let treatment = services::find_treatment(&state.db, id).await?;
    let contractor = services::responsible_contractor(&state.db, &treatment).await?;
    Ok(Json(contractor.map(ResponsibleContractor::from)))
}

#[utoipa::path(
    get,
    path = "/{id}/products",
    params(("id" = Uuid, Path, description = "Treatment ID")),
    responses(
        (status = 200, description = "Products with total quantity over the interested area", body = Vec<TreatmentProductLine>),
        (status = 404, description = "Treatment not found")
    ),
    tag = "treatments",
    summary = "List treatment products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TreatmentProductLine>>, BusinessError> {
    let treatment = services::find_treatment(&state.db, id).await?;
    let area = services::interested_area(&state.db, &treatment).await?;
    Ok(Json(services::product_lines(&state.db, id, area).await?))
}

#[utoipa::path(
    post,
    path = "/{id}/products",
    params(("id" = Uuid, Path, description = "Treatment ID")),
    request_body = ProductDosage,
    responses(
        (status = 201, description = "Product added", body = Vec<TreatmentProductLine>),
        (status = 400, description = "Dosage is not positive"),
        (status = 404, description = "Treatment or product not found"),
        (status = 409, description = "Product already part of the treatment")
    ),
    tag = "treatments",
    summary = "Add product"
)]
pub async fn add_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(item): Json<ProductDosage>,
) -> Result<(StatusCode, Json<Vec<TreatmentProductLine>>), BusinessError> {
    services::add_product(&state.db, id, &item).await?;
    let treatment = services::find_treatment(&state.db, id).await?;
    let area = services::interested_area(&state.db, &treatment).await?;
    let lines = services::product_lines(&state.db, id, area).await?;
    Ok((StatusCode::CREATED, Json(lines)))
}

#[utoipa::path(
    put,
    path = "/{id}/products/{product_id}",
    params(
        ("id" = Uuid, Path, description = "Treatment ID"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    request_body = DosageChange,
    responses(
        (status = 200, description = "Dosage updated", body = Vec<TreatmentProductLine>),
        (status = 400, description = "Dosage is not positive"),
        (status = 404, description = "Treatment or product row not found")
    ),
    tag = "treatments",
    summary = "Change dosage"
)]
pub async fn update_product_dosage(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
    Json(change): Json<DosageChange>,
) -> Result<Json<Vec<TreatmentProductLine>>, BusinessError> {
    services::update_dosage(&state.db, id, product_id, change.dosage_per_hectare).await?;
    let treatment = services::find_treatment(&state.db, id).await?;
    let area = services::interested_area(&state.db, &treatment).await?;
    Ok(Json(services::product_lines(&state.db, id, area).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}/products/{product_id}",
    params(
        ("id" = Uuid, Path, description = "Treatment ID"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product removed from the treatment"),
        (status = 404, description = "Treatment or product row not found")
    ),
    tag = "treatments",
    summary = "Remove product"
)]
pub async fn remove_product(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, BusinessError> {
    services::remove_product(&state.db, id, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/communicate",
    params(("id" = Uuid, Path, description = "Treatment ID")),
    request_body = CommunicateRequest,
    responses(
        (status = 200, description = "Communication attempted; check `delivered`", body = CommunicationResult),
        (status = 400, description = "No recipient available"),
        (status = 404, description = "Treatment not found"),
        (status = 422, description = "Treatment is past the communication stage")
    ),
    tag = "treatments",
    summary = "Communicate treatment"
)]
pub async fn communicate_treatment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CommunicateRequest>,
) -> Result<Json<CommunicationResult>, BusinessError> {
    Ok(Json(
        workflow::communicate(&state, &[id], &request.notes, request.force).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/communications",
    params(("id" = Uuid, Path, description = "Treatment ID")),
    responses(
        (status = 200, description = "Delivery attempts, most recent first", body = Vec<TreatmentCommunication>),
        (status = 404, description = "Treatment not found")
    ),
    tag = "treatments",
    summary = "Communication log"
)]
pub async fn list_communications(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TreatmentCommunication>>, BusinessError> {
    Ok(Json(workflow::communication_log(&state.db, id).await?))
}
