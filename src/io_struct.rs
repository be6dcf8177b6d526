use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::scorer::{FeatureMap, FeatureValue};

const GENDER: &[&str] = &["female", "male"];
const YES_NO: &[&str] = &["yes", "no"];
const MULTIPLE_LINES: &[&str] = &["yes", "no", "no_phone_service"];
const INTERNET_SERVICE: &[&str] = &["dsl", "fiber_optic", "no"];
const INTERNET_ADDON: &[&str] = &["yes", "no", "no_internet_service"];
const CONTRACT: &[&str] = &["month-to-month", "one_year", "two_year"];
const PAYMENT_METHOD: &[&str] = &[
    "electronic_check",
    "mailed_check",
    "bank_transfer_(automatic)",
    "credit_card_(automatic)",
];
const LEAD_SOURCE: &[&str] = &["paid_ads", "organic_search"];

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Rejection of a request body, one entry per offending field.
/// Rendered as HTTP 422 with a `detail` list.
#[derive(Debug, Serialize)]
pub struct ValidationError {
    pub detail: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self {
            detail: vec![FieldError {
                field: field.to_string(),
                message: message.into(),
            }],
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let summary = self
            .detail
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "invalid request: {}", summary)
    }
}

impl actix_web::ResponseError for ValidationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNPROCESSABLE_ENTITY
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

fn check_choice(detail: &mut Vec<FieldError>, field: &str, value: &str, allowed: &[&str]) {
    if !allowed.contains(&value) {
        detail.push(FieldError {
            field: field.to_string(),
            message: format!("must be one of: {}", allowed.join(", ")),
        });
    }
}

fn check_non_negative(detail: &mut Vec<FieldError>, field: &str, value: f64) {
    if value < 0.0 {
        detail.push(FieldError {
            field: field.to_string(),
            message: "must be greater than or equal to 0".to_string(),
        });
    }
}

fn finish(detail: Vec<FieldError>) -> Result<(), ValidationError> {
    if detail.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { detail })
    }
}

/// Telco customer record, the churn variant's input schema.
///
/// Field names and category literals match the training data after its
/// lowercase/underscore normalization, so a record flattens into the
/// same one-hot keys the pipeline was fitted on.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomerRecord {
    pub gender: String,
    pub seniorcitizen: i64,
    pub partner: String,
    pub dependents: String,
    pub phoneservice: String,
    pub multiplelines: String,
    pub internetservice: String,
    pub onlinesecurity: String,
    pub onlinebackup: String,
    pub deviceprotection: String,
    pub techsupport: String,
    pub streamingtv: String,
    pub streamingmovies: String,
    pub contract: String,
    pub paperlessbilling: String,
    pub paymentmethod: String,
    pub tenure: i64,
    pub monthlycharges: f64,
    pub totalcharges: f64,
}

impl CustomerRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut detail = Vec::new();
        check_choice(&mut detail, "gender", &self.gender, GENDER);
        if !(0..=1).contains(&self.seniorcitizen) {
            detail.push(FieldError {
                field: "seniorcitizen".to_string(),
                message: "must be 0 or 1".to_string(),
            });
        }
        check_choice(&mut detail, "partner", &self.partner, YES_NO);
        check_choice(&mut detail, "dependents", &self.dependents, YES_NO);
        check_choice(&mut detail, "phoneservice", &self.phoneservice, YES_NO);
        check_choice(&mut detail, "multiplelines", &self.multiplelines, MULTIPLE_LINES);
        check_choice(&mut detail, "internetservice", &self.internetservice, INTERNET_SERVICE);
        check_choice(&mut detail, "onlinesecurity", &self.onlinesecurity, INTERNET_ADDON);
        check_choice(&mut detail, "onlinebackup", &self.onlinebackup, INTERNET_ADDON);
        check_choice(&mut detail, "deviceprotection", &self.deviceprotection, INTERNET_ADDON);
        check_choice(&mut detail, "techsupport", &self.techsupport, INTERNET_ADDON);
        check_choice(&mut detail, "streamingtv", &self.streamingtv, INTERNET_ADDON);
        check_choice(&mut detail, "streamingmovies", &self.streamingmovies, INTERNET_ADDON);
        check_choice(&mut detail, "contract", &self.contract, CONTRACT);
        check_choice(&mut detail, "paperlessbilling", &self.paperlessbilling, YES_NO);
        check_choice(&mut detail, "paymentmethod", &self.paymentmethod, PAYMENT_METHOD);
        if self.tenure < 0 {
            detail.push(FieldError {
                field: "tenure".to_string(),
                message: "must be greater than or equal to 0".to_string(),
            });
        }
        check_non_negative(&mut detail, "monthlycharges", self.monthlycharges);
        check_non_negative(&mut detail, "totalcharges", self.totalcharges);
        finish(detail)
    }

    pub fn to_features(&self) -> FeatureMap {
        let mut features = FeatureMap::new();
        let text = [
            ("gender", &self.gender),
            ("partner", &self.partner),
            ("dependents", &self.dependents),
            ("phoneservice", &self.phoneservice),
            ("multiplelines", &self.multiplelines),
            ("internetservice", &self.internetservice),
            ("onlinesecurity", &self.onlinesecurity),
            ("onlinebackup", &self.onlinebackup),
            ("deviceprotection", &self.deviceprotection),
            ("techsupport", &self.techsupport),
            ("streamingtv", &self.streamingtv),
            ("streamingmovies", &self.streamingmovies),
            ("contract", &self.contract),
            ("paperlessbilling", &self.paperlessbilling),
            ("paymentmethod", &self.paymentmethod),
        ];
        for (name, value) in text {
            features.insert(name.to_string(), FeatureValue::Text(value.clone()));
        }
        features.insert(
            "seniorcitizen".to_string(),
            FeatureValue::Number(self.seniorcitizen as f64),
        );
        features.insert("tenure".to_string(), FeatureValue::Number(self.tenure as f64));
        features.insert(
            "monthlycharges".to_string(),
            FeatureValue::Number(self.monthlycharges),
        );
        features.insert(
            "totalcharges".to_string(),
            FeatureValue::Number(self.totalcharges),
        );
        features
    }
}

/// Sales lead record, the lead variant's input schema.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeadRecord {
    pub lead_source: String,
    pub number_of_courses_viewed: i64,
    pub annual_income: f64,
}

impl LeadRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut detail = Vec::new();
        check_choice(&mut detail, "lead_source", &self.lead_source, LEAD_SOURCE);
        if self.number_of_courses_viewed < 0 {
            detail.push(FieldError {
                field: "number_of_courses_viewed".to_string(),
                message: "must be greater than or equal to 0".to_string(),
            });
        }
        check_non_negative(&mut detail, "annual_income", self.annual_income);
        finish(detail)
    }

    pub fn to_features(&self) -> FeatureMap {
        FeatureMap::from([
            (
                "lead_source".to_string(),
                FeatureValue::Text(self.lead_source.clone()),
            ),
            (
                "number_of_courses_viewed".to_string(),
                FeatureValue::Number(self.number_of_courses_viewed as f64),
            ),
            (
                "annual_income".to_string(),
                FeatureValue::Number(self.annual_income),
            ),
        ])
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChurnResponse {
    pub churn_probability: f64,
    pub churn: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LeadResponse {
    pub lead_probability: f64,
    pub lead: bool,
}
