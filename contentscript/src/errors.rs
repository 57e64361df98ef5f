use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum ContentScriptError {
    // 400s
    Unauthorized(&'static str),
    MissingFields(Vec<&'static str>),
    ValidationError((String, String)),
    BadRequest(String),
    PaymentRequired,
    TokenError(jsonwebtoken::errors::Error),
    // 500
    ConfigError(String),
    ClientSessionError(String),
    SerdeError(serde_json::Error),
    ReqwestError(reqwest::Error),
    StripeError(stripe::StripeError),
    TemplateError(String),
    InternalServerError(String),
}

impl fmt::Display for ContentScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentScriptError::Unauthorized(e) => write!(f, "Unauthorized: {}", e),
            ContentScriptError::MissingFields(fields) => write!(f, "Missing required fields: {}", fields.join(", ")),
            ContentScriptError::ValidationError((field, message)) => {
                write!(f, "Validation Error: {}: {}", field, message)
            }
            ContentScriptError::BadRequest(e) => write!(f, "Bad Request: {}", e),
            ContentScriptError::PaymentRequired => write!(f, "Free limit reached"),
            ContentScriptError::TokenError(e) => write!(f, "Session Token Error: {}", e),
            ContentScriptError::ConfigError(e) => write!(f, "Config Error: {}", e),
            ContentScriptError::ClientSessionError(e) => write!(f, "Session Error: {}", e),
            ContentScriptError::SerdeError(e) => write!(f, "Serde Error: \n{}", e),
            ContentScriptError::ReqwestError(e) => write!(f, "Identity Provider Error: \n{}", e),
            ContentScriptError::StripeError(e) => write!(f, "Stripe Error: \n{}", e),
            ContentScriptError::TemplateError(e) => write!(f, "Template Error: \n{}", e),
            ContentScriptError::InternalServerError(e) => write!(f, "InternalServerError: \n{}", e),
        }
    }
}

impl Error for ContentScriptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ContentScriptError::TokenError(e) => Some(e),
            ContentScriptError::SerdeError(e) => Some(e),
            ContentScriptError::ReqwestError(e) => Some(e),
            ContentScriptError::StripeError(e) => Some(e),
            _ => None,
        }
    }
}

impl ResponseError for ContentScriptError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ContentScriptError::Unauthorized(_) | ContentScriptError::TokenError(_) => {
                log::debug!("{}", self);

                HttpResponse::Unauthorized().json(json!({
                    "status": 401,
                    "error": "Unauthorized"
                }))
            }
            ContentScriptError::MissingFields(fields) => HttpResponse::BadRequest().json(json!({
                "status": 400,
                "error": "Missing required fields",
                "fields": fields
            })),
            ContentScriptError::ValidationError((field, message)) => HttpResponse::BadRequest().json(json!({
                "status": 400,
                "error": "Invalid field",
                "fields": {field: message}
            })),
            ContentScriptError::BadRequest(e) => HttpResponse::BadRequest().json(json!({
                "status": 400,
                "error": e
            })),
            ContentScriptError::PaymentRequired => HttpResponse::PaymentRequired().json(json!({
                "status": 402,
                "error": "Free limit reached"
            })),
            _ => {
                log::error!("{}", self);

                HttpResponse::InternalServerError().json(json!({
                    "status": 500,
                    "error": "Internal Server Error"
                }))
            }
        }
    }
}

impl From<serde_json::Error> for ContentScriptError {
    fn from(e: serde_json::Error) -> Self {
        ContentScriptError::SerdeError(e)
    }
}

impl From<reqwest::Error> for ContentScriptError {
    fn from(e: reqwest::Error) -> Self {
        ContentScriptError::ReqwestError(e)
    }
}

impl From<stripe::StripeError> for ContentScriptError {
    fn from(e: stripe::StripeError) -> Self {
        ContentScriptError::StripeError(e)
    }
}

impl From<jsonwebtoken::errors::Error> for ContentScriptError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        ContentScriptError::TokenError(e)
    }
}

impl From<handlebars::RenderError> for ContentScriptError {
    fn from(e: handlebars::RenderError) -> Self {
        ContentScriptError::TemplateError(e.to_string())
    }
}

impl From<toml::de::Error> for ContentScriptError {
    fn from(e: toml::de::Error) -> Self {
        ContentScriptError::ConfigError(e.to_string())
    }
}
