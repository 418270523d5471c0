use serde::Serialize;

use hellodesk_base::DeskResult;
use hellodesk_base::pal::http::{HttpResponse, HttpStatusCode};

use crate::api::service::{detail_response, json_response, validation_response};
use crate::registry::RegistryHandle;
use crate::user::{User, UserId};
use crate::validation::{parse_int_param, validate_new_user};

use super::query::decode_path_segment;

/// Public view of a user. Age is kept internally and never returned.
#[derive(Serialize)]
struct UserResponse<'a> {
    id: UserId,
    name: &'a str,
    email: &'a str,
}

impl<'a> From<&'a User> for UserResponse<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: user.id(),
            name: user.name(),
            email: user.email(),
        }
    }
}

/// `POST /users`: 201 with the stored user, 409 on a taken email, 422 on bad input.
pub(super) fn create_user(
    registry: &RegistryHandle,
    default_age: u8,
    body: &[u8],
) -> DeskResult<HttpResponse> {
    let candidate = match validate_new_user(body, default_age) {
        Ok(candidate) => candidate,
        Err(errors) => return validation_response(errors),
    };
    match registry.create(candidate) {
        Ok(user) => json_response(HttpStatusCode::Created, &UserResponse::from(&user)),
        Err(e) if e.is_conflict() => {
            detail_response(HttpStatusCode::Conflict, &e.kind().to_string())
        }
        Err(e) => Err(e),
    }
}

/// `GET /users/{user_id}`: ids below 1 are rejected before the registry is asked.
pub(super) fn get_user(registry: &RegistryHandle, raw_id: &str) -> DeskResult<HttpResponse> {
    let raw_id = decode_path_segment(raw_id);
    let id = match parse_int_param(&["path", "user_id"], Some(&raw_id), 1, i64::MAX) {
        Ok(id) => UserId::new(id as u64),
        Err(e) => return validation_response(e.into()),
    };
    match registry.get(id) {
        Ok(user) => json_response(HttpStatusCode::Ok, &UserResponse::from(&user)),
        Err(e) if e.is_not_found() => {
            detail_response(HttpStatusCode::NotFound, &e.kind().to_string())
        }
        Err(e) => Err(e),
    }
}
