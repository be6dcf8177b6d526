use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, HttpServer, get, post, web};

use crate::app_state::{AppConfig, AppState, SchemaVariant};
use crate::io_struct::{
    ChurnResponse, CustomerRecord, LeadRecord, LeadResponse, ValidationError,
};

const DECISION_THRESHOLD: f64 = 0.5;

#[get("/health")]
pub async fn health(_req: HttpRequest, _: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().body("Ok")
}

#[post("/predict")]
pub async fn predict_churn(
    record: web::Json<CustomerRecord>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ValidationError> {
    let record = record.into_inner();
    record.validate()?;
    let probability = app_state.scorer.positive_probability(&record.to_features());
    Ok(HttpResponse::Ok().json(ChurnResponse {
        churn_probability: probability,
        churn: probability >= DECISION_THRESHOLD,
    }))
}

#[post("/predict")]
pub async fn predict_lead(
    record: web::Json<LeadRecord>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ValidationError> {
    let record = record.into_inner();
    record.validate()?;
    let probability = app_state.scorer.positive_probability(&record.to_features());
    Ok(HttpResponse::Ok().json(LeadResponse {
        lead_probability: probability,
        lead: probability >= DECISION_THRESHOLD,
    }))
}

/// Bodies serde refuses to map onto the record struct (malformed JSON,
/// missing fields, wrong types) get the same 422 shape as range failures.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ValidationError::single("body", err.to_string()).into()
}

/// Mounts the routes for one schema variant plus the shared surface.
pub fn configure(variant: SchemaVariant) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(health);
        match variant {
            SchemaVariant::Churn => cfg.service(predict_churn),
            SchemaVariant::Lead => cfg.service(predict_lead),
        };
    }
}

pub async fn startup(config: AppConfig, app_state: AppState) -> std::io::Result<()> {
    let app_state = web::Data::new(app_state);
    let variant = config.variant;

    log::info!(
        "starting {} prediction service at {}:{}",
        variant.as_str(),
        config.host,
        config.port
    );

    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(app_state.clone())
            .configure(configure(variant))
    })
    .bind((config.host, config.port))?
    .run()
    .await?;

    std::io::Result::Ok(())
}
