//! Reusable OpenAPI responses for the standard error body.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Bad Request - malformed query or path parameter",
    content_type = "application/json",
    example = json!({
        "code": 1002,
        "error": "INVALID_PARAMETER",
        "message": "ordering field 'name' is not allowed",
        "details": { "parameter": "ordering" }
    })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "code": 1005,
        "error": "INTERNAL_ERROR",
        "message": "An internal server error occurred"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);
