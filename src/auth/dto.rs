use serde::{Deserialize, Serialize};

use crate::auth::service::UserRegistration;

/// Request body for signup; mirrors the signup form field-for-field.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub first_name: String,
    pub second_name: String,
    #[serde(default)]
    pub third_name: Option<String>,
    pub username: String,
    pub password: String,
    pub location: String,
    pub age: i64,
    pub best_books_category: String,
}

impl From<SignupRequest> for UserRegistration {
    fn from(req: SignupRequest) -> Self {
        UserRegistration {
            first_name: req.first_name,
            second_name: req.second_name,
            third_name: req.third_name,
            username: req.username,
            password: req.password,
            location: req.location,
            age: req.age,
            best_books_category: req.best_books_category,
        }
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
}

/// Response returned after signup or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
}
