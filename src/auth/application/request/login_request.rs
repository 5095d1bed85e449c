use serde::Serialize;

/// Body of `POST /access/ticket`.
#[derive(Serialize)]
pub struct LoginRequest {
    /// Full `user@realm` id.
    pub username: String,
    pub password: String,
}
