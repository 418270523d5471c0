/* 📖 # Why a single unified API service?

One service owns every endpoint. It is registered once with the PAL, shares one registry
handle, and renders every error the same way. Routing is a match over path segments
followed by a match over the method, so a known path with the wrong method answers 405
and an unknown path answers 404.

Client errors are ordinary responses with a `{"detail": ...}` body:
- 404 unknown route or user
- 405 known route, wrong method
- 409 duplicate email
- 422 any failed field check
Only failures of the service itself (for example JSON serialization) are returned as Err.
*/

use serde::Serialize;
use tracing::{debug, warn};

use hellodesk_base::pal::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpService, HttpStatusCode,
};
use hellodesk_base::{DeskError, DeskResult};

use crate::api::query::{QueryParams, decode_path_segment};
use crate::api::users;
use crate::catalog::ItemCategory;
use crate::registry::RegistryHandle;
use crate::validation::{
    FieldError, ValidationErrors, check_str_len, parse_bool_param, parse_category,
    parse_int_param, validate_echo,
};

const GREET_NAME_MAX_CHARS: usize = 50;
const SQUARE_LIMIT: i64 = 1_000_000;
const ITEM_ID_MAX: i64 = 100_000;
const SEARCH_QUERY_MAX_CHARS: usize = 100;
const CATEGORY_SAMPLE: [&str; 3] = ["example1", "example2", "example3"];

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct EchoQueryResponse {
    message: Option<String>,
}

#[derive(Serialize)]
struct EchoResponse {
    echo: String,
    echo_length: usize,
}

#[derive(Serialize)]
struct SquareResponse {
    x: i64,
    square: i64,
}

#[derive(Serialize)]
struct ItemResponse {
    item_id: i64,
}

#[derive(Serialize)]
struct SearchResponse {
    q: Option<String>,
    tags: Vec<String>,
    exact: bool,
}

#[derive(Serialize)]
struct CategoryResponse {
    category: ItemCategory,
    sample: [&'static str; 3],
}

#[derive(Serialize)]
struct DetailResponse<'a> {
    detail: &'a str,
}

/// Routes the service knows about, with raw (still percent-encoded) path parameters.
#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Root,
    Health,
    Echo,
    Greet(&'a str),
    Square,
    Item(&'a str),
    Search,
    Category(&'a str),
    Users,
    User(&'a str),
}

impl<'a> Route<'a> {
    fn resolve(path: &'a str) -> Option<Self> {
        let segments: Vec<&str> = path.strip_prefix('/')?.split('/').collect();
        let route = match segments.as_slice() {
            [""] => Route::Root,
            ["health"] => Route::Health,
            ["echo"] => Route::Echo,
            ["greet", name] => Route::Greet(name),
            ["math", "square"] => Route::Square,
            ["items", id] => Route::Item(id),
            ["search"] => Route::Search,
            ["categories", category] => Route::Category(category),
            ["users"] => Route::Users,
            ["users", id] => Route::User(id),
            _ => return None,
        };
        match route {
            Route::Greet("") | Route::Item("") | Route::Category("") | Route::User("") => None,
            route => Some(route),
        }
    }
}

/// HTTP service serving the demo endpoints and the user registry.
///
/// - `GET /`, `GET /health`
/// - `GET /echo?message=`, `POST /echo`
/// - `GET /greet/{name}`, `GET /math/square?x=`
/// - `GET /items/{item_id}`, `GET /search`, `GET /categories/{category}`
/// - `POST /users`, `GET /users/{user_id}`
#[derive(Clone)]
pub struct ApiService {
    registry: RegistryHandle,
    default_age: u8,
}

impl ApiService {
    /// Create a service over the given registry. Users created without an age get 30.
    ///
    /// # Examples
    /// ```
    /// use hellodesk_engine::{ApiService, InMemoryRegistry, RegistryHandle};
    ///
    /// let registry = RegistryHandle::new(InMemoryRegistry::new());
    /// let service = ApiService::new(registry).with_default_age(25);
    /// ```
    pub fn new(registry: RegistryHandle) -> Self {
        Self {
            registry,
            default_age: 30,
        }
    }

    pub fn with_default_age(mut self, default_age: u8) -> Self {
        self.default_age = default_age;
        self
    }

    fn dispatch(&self, route: Route<'_>, request: &HttpRequest) -> DeskResult<HttpResponse> {
        let query = QueryParams::parse(request.query());
        match (route, request.method()) {
            (Route::Root, HttpMethod::Get) => ok_json(&MessageResponse {
                message: "Hello FastAPI!!!".to_string(),
            }),
            (Route::Health, HttpMethod::Get) => ok_json(&HealthResponse { status: "ok" }),
            (Route::Echo, HttpMethod::Get) => ok_json(&EchoQueryResponse {
                message: query.get("message").map(str::to_string),
            }),
            (Route::Echo, HttpMethod::Post) => self.handle_echo(request),
            (Route::Greet(name), HttpMethod::Get) => self.handle_greet(name),
            (Route::Square, HttpMethod::Get) => self.handle_square(&query),
            (Route::Item(id), HttpMethod::Get) => self.handle_item(id),
            (Route::Search, HttpMethod::Get) => self.handle_search(&query),
            (Route::Category(category), HttpMethod::Get) => self.handle_category(category),
            (Route::Users, HttpMethod::Post) => {
                users::create_user(&self.registry, self.default_age, request.body().as_bytes())
            }
            (Route::User(id), HttpMethod::Get) => users::get_user(&self.registry, id),
            (route, method) => {
                debug!(?route, %method, "method not allowed");
                detail_response(HttpStatusCode::MethodNotAllowed, "Method Not Allowed")
            }
        }
    }

    fn handle_echo(&self, request: &HttpRequest) -> DeskResult<HttpResponse> {
        match validate_echo(request.body().as_bytes()) {
            Ok(text) => ok_json(&EchoResponse {
                echo: text.to_uppercase(),
                echo_length: text.chars().count(),
            }),
            Err(errors) => validation_response(errors),
        }
    }

    fn handle_greet(&self, raw_name: &str) -> DeskResult<HttpResponse> {
        let name = decode_path_segment(raw_name);
        if let Err(e) = check_str_len(&["path", "name"], &name, 1, GREET_NAME_MAX_CHARS) {
            return validation_response(e.into());
        }
        ok_json(&MessageResponse {
            message: format!("Hello {}!!!", name),
        })
    }

    fn handle_square(&self, query: &QueryParams) -> DeskResult<HttpResponse> {
        match parse_int_param(&["query", "x"], query.get("x"), -SQUARE_LIMIT, SQUARE_LIMIT) {
            Ok(x) => ok_json(&SquareResponse { x, square: x * x }),
            Err(e) => validation_response(e.into()),
        }
    }

    fn handle_item(&self, raw_id: &str) -> DeskResult<HttpResponse> {
        let raw_id = decode_path_segment(raw_id);
        match parse_int_param(&["path", "item_id"], Some(&raw_id), 1, ITEM_ID_MAX) {
            Ok(item_id) => ok_json(&ItemResponse { item_id }),
            Err(e) => validation_response(e.into()),
        }
    }

    fn handle_search(&self, query: &QueryParams) -> DeskResult<HttpResponse> {
        let mut errors = ValidationErrors::new();

        let q = query.get("query").map(str::to_string);
        if let Some(q) = &q {
            if let Err(e) = check_str_len(&["query", "query"], q, 1, SEARCH_QUERY_MAX_CHARS) {
                errors.push(e);
            }
        }

        let exact = match query.get("exact") {
            None => false,
            Some(raw) => parse_bool_param(&["query", "exact"], raw).unwrap_or_else(|e| {
                errors.push(e);
                false
            }),
        };

        let response = SearchResponse {
            q,
            tags: query.get_all("tags"),
            exact,
        };
        match errors.into_result(response) {
            Ok(response) => ok_json(&response),
            Err(errors) => validation_response(errors),
        }
    }

    fn handle_category(&self, raw_category: &str) -> DeskResult<HttpResponse> {
        let raw_category = decode_path_segment(raw_category);
        match parse_category(&["path", "category"], &raw_category) {
            Ok(category) => ok_json(&CategoryResponse {
                category,
                sample: CATEGORY_SAMPLE,
            }),
            Err(e) => validation_response(e.into()),
        }
    }
}

impl std::fmt::Debug for ApiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiService")
            .field("registry", &self.registry)
            .field("default_age", &self.default_age)
            .finish()
    }
}

impl HttpService for ApiService {
    fn handle_request(&self, request: HttpRequest) -> DeskResult<HttpResponse> {
        debug!(method = %request.method(), target = request.target(), "handling request");
        match Route::resolve(request.path()) {
            Some(route) => self.dispatch(route, &request),
            None => detail_response(HttpStatusCode::NotFound, "Not Found"),
        }
    }
}

/// Serialize `data` and wrap it in a JSON response with the given status.
pub(super) fn json_response<T: Serialize>(
    status: HttpStatusCode,
    data: &T,
) -> DeskResult<HttpResponse> {
    serde_json::to_string(data)
        .map(|json| HttpResponse::json(status, json))
        .map_err(|e| {
            Box::new(DeskError::message(format!(
                "JSON serialization error: {}",
                e
            )))
        })
}

pub(super) fn ok_json<T: Serialize>(data: &T) -> DeskResult<HttpResponse> {
    json_response(HttpStatusCode::Ok, data)
}

pub(super) fn detail_response(status: HttpStatusCode, detail: &str) -> DeskResult<HttpResponse> {
    json_response(status, &DetailResponse { detail })
}

pub(super) fn validation_response(errors: ValidationErrors) -> DeskResult<HttpResponse> {
    let fields: Vec<String> = errors.errors().iter().map(field_label).collect();
    warn!(fields = ?fields, "request failed validation");
    json_response(HttpStatusCode::UnprocessableEntity, &errors)
}

fn field_label(error: &FieldError) -> String {
    error.loc.join(".")
}
