use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid code. Please try again or get a new one.")]
    InvalidCode,

    #[error("Message cannot be empty.")]
    EmptyMessage,

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Code space exhausted, could not generate a unique code")]
    CapacityExhausted,

    #[error("Message store unavailable: {0}")]
    StoreUnavailable(String),
}

impl actix_web::ResponseError for RelayError {
    fn error_response(&self) -> actix_web::HttpResponse {
        match self {
            RelayError::InvalidCode => actix_web::HttpResponse::BadRequest()
                .content_type("text/html; charset=utf-8")
                .body(crate::pages::error_page()),
            RelayError::EmptyMessage | RelayError::ValidationError(_) => {
                actix_web::HttpResponse::BadRequest().body(format!("Error: {}", self))
            }
            RelayError::CapacityExhausted | RelayError::StoreUnavailable(_) => {
                actix_web::HttpResponse::InternalServerError().body(self.to_string())
            }
        }
    }
}
