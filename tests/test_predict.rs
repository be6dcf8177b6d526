use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::{App, test, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use tabserve::app_state::{AppState, SchemaVariant};
use tabserve::scorer::{ConstantBaseline, FeatureMap, LinearPipeline, Scorer};
use tabserve::server;

/// Counts invocations so tests can prove the model is never consulted
/// for a rejected record.
#[derive(Debug, Default, Deserialize, Serialize)]
struct SpyScorer {
    #[serde(skip)]
    calls: Arc<AtomicUsize>,
}

#[typetag::serde]
impl Scorer for SpyScorer {
    fn positive_probability(&self, _features: &FeatureMap) -> f64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        0.5
    }

    fn kind(&self) -> &'static str {
        "spy"
    }
}

macro_rules! service {
    ($variant:expr, $scorer:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::with_scorer($scorer, $variant)))
                .configure(server::configure($variant)),
        )
        .await
    };
}

fn walkthrough_customer() -> serde_json::Value {
    json!({
        "gender": "female",
        "seniorcitizen": 0,
        "partner": "yes",
        "dependents": "no",
        "phoneservice": "no",
        "multiplelines": "no_phone_service",
        "internetservice": "dsl",
        "onlinesecurity": "no",
        "onlinebackup": "yes",
        "deviceprotection": "no",
        "techsupport": "no",
        "streamingtv": "no",
        "streamingmovies": "no",
        "contract": "month-to-month",
        "paperlessbilling": "yes",
        "paymentmethod": "electronic_check",
        "tenure": 1,
        "monthlycharges": 29.85,
        "totalcharges": 29.85
    })
}

fn churn_pipeline() -> Arc<dyn Scorer> {
    Arc::new(LinearPipeline {
        weights: std::collections::BTreeMap::from([
            ("contract=month-to-month".to_string(), 0.6),
            ("internetservice=fiber_optic".to_string(), 0.3),
            ("tenure".to_string(), -0.04),
            ("monthlycharges".to_string(), 0.01),
        ]),
        intercept: -0.8,
    })
}

#[actix_web::test]
async fn churn_walkthrough_record_is_scored() {
    let app = service!(SchemaVariant::Churn, churn_pipeline());

    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(walkthrough_customer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    let probability = body["churn_probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&probability));
    assert_eq!(body["churn"].as_bool().unwrap(), probability >= 0.5);
}

#[actix_web::test]
async fn identical_records_get_identical_answers() {
    let app = service!(SchemaVariant::Churn, churn_pipeline());

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(walkthrough_customer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        bodies.push(test::read_body_json::<serde_json::Value, _>(resp).await);
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[actix_web::test]
async fn decision_is_true_exactly_at_the_threshold() {
    let app = service!(
        SchemaVariant::Lead,
        Arc::new(ConstantBaseline { probability: 0.5 }) as Arc<dyn Scorer>
    );

    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({
            "lead_source": "paid_ads",
            "number_of_courses_viewed": 5,
            "annual_income": 45000.0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["lead_probability"].as_f64().unwrap(), 0.5);
    assert_eq!(body["lead"], json!(true));
}

#[actix_web::test]
async fn decision_is_false_below_the_threshold() {
    let app = service!(
        SchemaVariant::Lead,
        Arc::new(ConstantBaseline {
            probability: 0.4999,
        }) as Arc<dyn Scorer>
    );

    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({
            "lead_source": "organic_search",
            "number_of_courses_viewed": 0,
            "annual_income": 0.0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["lead"], json!(false));
}

#[actix_web::test]
async fn negative_course_count_is_rejected_without_scoring() {
    let spy = Arc::new(SpyScorer::default());
    let calls = spy.calls.clone();
    let app = service!(SchemaVariant::Lead, spy as Arc<dyn Scorer>);

    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({
            "lead_source": "paid_ads",
            "number_of_courses_viewed": -1,
            "annual_income": 45000.0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 422);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"][0]["field"], "number_of_courses_viewed");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn lead_source_outside_the_enum_is_rejected() {
    let app = service!(
        SchemaVariant::Lead,
        Arc::new(ConstantBaseline { probability: 0.9 }) as Arc<dyn Scorer>
    );

    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({
            "lead_source": "referral",
            "number_of_courses_viewed": 5,
            "annual_income": 45000.0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 422);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"][0]["field"], "lead_source");
}

#[actix_web::test]
async fn missing_field_is_rejected_without_scoring() {
    let spy = Arc::new(SpyScorer::default());
    let calls = spy.calls.clone();
    let app = service!(SchemaVariant::Lead, spy as Arc<dyn Scorer>);

    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({
            "number_of_courses_viewed": 5,
            "annual_income": 45000.0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 422);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let message = body["detail"][0]["message"].as_str().unwrap();
    assert!(message.contains("lead_source"), "message was: {}", message);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn churn_record_with_bad_category_is_rejected() {
    let app = service!(SchemaVariant::Churn, churn_pipeline());

    let mut record = walkthrough_customer();
    record["paymentmethod"] = json!("cash");
    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(record)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 422);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"][0]["field"], "paymentmethod");
}

#[actix_web::test]
async fn health_answers_ok() {
    let app = service!(SchemaVariant::Churn, churn_pipeline());

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(test::read_body(resp).await, "Ok");
}
