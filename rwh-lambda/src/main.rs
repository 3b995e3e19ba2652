use lambda_http::{run, service_fn, tracing, Body, Error, Request, Response};
use rwh::errors::RwhError;
use rwh::input::ingest_request;
use rwh::report::Report;
use rwh::run_report;
use rwh::weather::OpenMeteoArchive;
use serde_json::json;
use uuid::Uuid;

async fn function_handler(event: Request) -> Result<Response<Body>, Error> {
    let input = match event.body() {
        Body::Empty => "",
        Body::Text(text) => text.as_str(),
        Body::Binary(_) => unimplemented!(),
    }
    .as_bytes();

    let resp = match handle(input) {
        Ok(report) => Response::builder()
            .status(200)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&report)?))
            .map_err(Box::new)?,
        Err(e) => {
            let status = status_for(&e);
            Response::builder()
                .status(status)
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&json!({"errors": [{"id": Uuid::new_v4(), "status": status.to_string(), "detail": e.to_string()}]}))?))
                .map_err(Box::new)?
        }
    };

    Ok(resp)
}

fn handle(input: &[u8]) -> Result<Report, RwhError> {
    let request = ingest_request(input)?;
    run_report(&request, &OpenMeteoArchive::default())
}

/// Callers can tell bad input, an unavailable upstream and an internal
/// defect apart by status class.
fn status_for(error: &RwhError) -> u16 {
    match error {
        RwhError::InvalidRequest(_)
        | RwhError::UnknownRoofType(_)
        | RwhError::UnknownTariff(_) => 400,
        RwhError::WeatherFetch(_) => 502,
        RwhError::FailureInCalculation(_) => 500,
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    run(service_fn(function_handler)).await
}
