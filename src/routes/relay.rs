use crate::codegen::generate_unique_code;
use crate::error::RelayError;
use crate::model::{LoginForm, MessageSubmission};
use crate::pages;
use crate::store::MessageStore;
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

const INVALID_CODE_MESSAGE: &str = "Invalid code. Please try again or get a new one.";

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn redirect_home_with_error(message: &str) -> HttpResponse {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("error", message)
        .finish();
    HttpResponse::SeeOther()
        .append_header(("Location", format!("/?{}", query)))
        .finish()
}

#[derive(Deserialize)]
pub struct StartQuery {
    error: Option<String>,
}

/// Start page, optionally showing an error carried in the query string
#[get("/")]
pub async fn home(query: web::Query<StartQuery>) -> HttpResponse {
    html(pages::start_page(query.error.as_deref()))
}

/// Issue a fresh code, persist it, and show its submission page
#[get("/new-code")]
pub async fn new_code(store: web::Data<MessageStore>) -> Result<HttpResponse, RelayError> {
    let code = generate_unique_code(&store).await?;
    store.create_code(&code).await?;
    Ok(html(pages::submit_page(&code)))
}

/// Submission page for a known code; unknown codes bounce back home
#[get("/submit/{code}")]
pub async fn show_submit_page(
    store: web::Data<MessageStore>,
    code: web::Path<String>,
) -> HttpResponse {
    let code = code.trim().to_uppercase();
    if store.code_exists(&code).await {
        html(pages::submit_page(&code))
    } else {
        redirect_home_with_error(INVALID_CODE_MESSAGE)
    }
}

#[post("/login")]
pub async fn login(store: web::Data<MessageStore>, form: web::Form<LoginForm>) -> HttpResponse {
    let code = form.user_code.trim().to_uppercase();
    if !code.is_empty() && store.code_exists(&code).await {
        HttpResponse::SeeOther()
            .append_header(("Location", format!("/submit/{}", code)))
            .finish()
    } else {
        html(pages::start_page(Some(INVALID_CODE_MESSAGE)))
    }
}

#[post("/submit-message")]
pub async fn submit_message(
    store: web::Data<MessageStore>,
    form: web::Form<MessageSubmission>,
) -> Result<HttpResponse, RelayError> {
    let code = form.user_code.trim().to_uppercase();
    if code.is_empty() || !store.code_exists(&code).await {
        return Err(RelayError::InvalidCode);
    }
    form.validate()?;

    store
        .append_message(&code, &form.anon_message, &form.sensitivity, &form.delivery)
        .await?;
    Ok(html(pages::success_page(&code)))
}

/// Every code with its grouped messages, in stable code order
#[get("/messages")]
pub async fn view_messages(store: web::Data<MessageStore>) -> HttpResponse {
    html(pages::messages_page(&store.all_messages_grouped().await))
}
