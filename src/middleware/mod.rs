pub mod auth;
pub mod json;
pub mod response;
pub mod role_guard;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use json::ApiJson;
pub use response::{ApiResponse, ApiResult, Message};
pub use role_guard::{require_admin, require_superadmin, ValidatedAdmin, ValidatedSuperadmin};
