//! Sends one customer to a running churn service and branches on the
//! decision, the way a promo-email campaign job would.

use serde_json::json;

use tabserve::io_struct::ChurnResponse;

fn main() -> anyhow::Result<()> {
    let url = "http://localhost:9696/predict";
    let customer_id = "xyz-123";
    let customer = json!({
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
    });

    let response: ChurnResponse = reqwest::blocking::Client::new()
        .post(url)
        .json(&customer)
        .send()?
        .error_for_status()?
        .json()?;

    println!(
        "churn probability for {}: {:.3}",
        customer_id, response.churn_probability
    );
    if response.churn {
        println!("sending promo email to {}", customer_id);
    } else {
        println!("not sending promo email to {}", customer_id);
    }
    Ok(())
}
