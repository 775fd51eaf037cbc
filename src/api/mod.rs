use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    BudgetSolveConfig, BudgetSolveResult, LoanTerm, MortgageEngine, Quote, clamp_amount,
    clamp_rate, solve_budget,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Parser, Debug)]
#[command(
    name = "mortgage",
    about = "Mortgage monthly payment calculator (amortized annuity + affordability search)"
)]
struct Cli {
    #[arg(long, default_value_t = 0.0, help = "Property price, capped at 1,000,000")]
    property_price: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Deposit; clamped down to the property price"
    )]
    deposit: f64,
    #[arg(
        long,
        default_value_t = 35,
        help = "Loan term in years: 35, 30, 25, 20 or 15"
    )]
    loan_term: u32,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Annual interest rate in percent, e.g. 4.5"
    )]
    interest_rate: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct QuotePayload {
    property_price: Option<f64>,
    deposit: Option<f64>,
    loan_term: Option<u32>,
    interest_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BudgetPayload {
    target_monthly_payment: Option<u64>,
    deposit: Option<f64>,
    loan_term: Option<u32>,
    interest_rate: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BudgetResponse {
    target_monthly_payment: u64,
    deposit: f64,
    loan_term_years: u32,
    interest_rate: f64,
    max_affordable_price: f64,
    achieved_monthly_payment: u64,
    iterations: u32,
    converged: bool,
    message: String,
    quote: Quote,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_engine(cli: Cli) -> Result<MortgageEngine, String> {
    if !cli.property_price.is_finite() {
        return Err("--property-price must be a finite number".to_string());
    }
    if !cli.deposit.is_finite() {
        return Err("--deposit must be a finite number".to_string());
    }
    if !cli.interest_rate.is_finite() {
        return Err("--interest-rate must be a finite number".to_string());
    }
    let Some(term) = LoanTerm::from_years(cli.loan_term) else {
        return Err("--loan-term must be one of 35, 30, 25, 20 or 15".to_string());
    };

    let mut engine = MortgageEngine::new();
    engine.set_property_price(cli.property_price);
    engine.set_deposit(cli.deposit);
    engine.set_loan_term(term);
    engine.set_interest_rate(cli.interest_rate / 100.0);
    Ok(engine)
}

fn default_cli_for_api() -> Cli {
    Cli {
        property_price: 0.0,
        deposit: 0.0,
        loan_term: 35,
        interest_rate: 0.0,
    }
}

fn engine_from_payload(payload: QuotePayload) -> Result<MortgageEngine, String> {
    let mut cli = default_cli_for_api();
    if let Some(v) = payload.property_price {
        cli.property_price = v;
    }
    if let Some(v) = payload.deposit {
        cli.deposit = v;
    }
    if let Some(v) = payload.loan_term {
        cli.loan_term = v;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }
    build_engine(cli)
}

fn budget_config_from_payload(payload: BudgetPayload) -> Result<BudgetSolveConfig, String> {
    let deposit = payload.deposit.unwrap_or(0.0);
    let interest_rate = payload.interest_rate.unwrap_or(0.0);
    if !deposit.is_finite() {
        return Err("deposit must be a finite number".to_string());
    }
    if !interest_rate.is_finite() {
        return Err("interestRate must be a finite number".to_string());
    }
    let years = payload.loan_term.unwrap_or(35);
    let Some(loan_term) = LoanTerm::from_years(years) else {
        return Err("loanTerm must be one of 35, 30, 25, 20 or 15".to_string());
    };

    Ok(BudgetSolveConfig {
        target_monthly_payment: payload.target_monthly_payment.unwrap_or(0),
        deposit: clamp_amount(deposit),
        loan_term,
        interest_rate: clamp_rate(interest_rate / 100.0),
        tolerance: payload.tolerance.unwrap_or(1.0),
        max_iterations: payload.max_iterations.unwrap_or(48),
    })
}

pub fn run_quote_cli(args: impl Iterator<Item = String>) -> Result<(), String> {
    let cli = Cli::parse_from(args);
    let engine = build_engine(cli)?;
    let json = serde_json::to_string_pretty(&engine.quote())
        .map_err(|e| format!("Failed to serialize quote: {e}"))?;
    println!("{json}");
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/quote", get(quote_get_handler).post(quote_post_handler))
        .route(
            "/api/budget",
            get(budget_get_handler).post(budget_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("Mortgage calculator HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn quote_get_handler(Query(payload): Query<QuotePayload>) -> Response {
    quote_handler_impl(payload)
}

async fn quote_post_handler(Json(payload): Json<QuotePayload>) -> Response {
    quote_handler_impl(payload)
}

fn quote_handler_impl(payload: QuotePayload) -> Response {
    match engine_from_payload(payload) {
        Ok(engine) => json_response(StatusCode::OK, engine.quote()),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn budget_get_handler(Query(payload): Query<BudgetPayload>) -> Response {
    budget_handler_impl(payload)
}

async fn budget_post_handler(Json(payload): Json<BudgetPayload>) -> Response {
    budget_handler_impl(payload)
}

fn budget_handler_impl(payload: BudgetPayload) -> Response {
    let config = match budget_config_from_payload(payload) {
        Ok(config) => config,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    match solve_budget(config) {
        Ok(result) => json_response(StatusCode::OK, build_budget_response(result)),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn build_budget_response(result: BudgetSolveResult) -> BudgetResponse {
    let mut engine = MortgageEngine::new();
    engine.set_property_price(result.max_affordable_price);
    engine.set_deposit(result.deposit);
    engine.set_loan_term(result.loan_term);
    engine.set_interest_rate(result.interest_rate);

    BudgetResponse {
        target_monthly_payment: result.target_monthly_payment,
        deposit: result.deposit,
        loan_term_years: result.loan_term.years(),
        interest_rate: result.interest_rate,
        max_affordable_price: result.max_affordable_price,
        achieved_monthly_payment: result.achieved_monthly_payment,
        iterations: result.iterations.len() as u32,
        converged: result.converged,
        message: result.message,
        quote: engine.quote(),
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn engine_from_json(json: &str) -> Result<MortgageEngine, String> {
    let payload = serde_json::from_str::<QuotePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    engine_from_payload(payload)
}
