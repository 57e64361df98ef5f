use actix_web::HttpResponse;

use crate::errors::ContentScriptError;

pub type Response = Result<HttpResponse, ContentScriptError>;
