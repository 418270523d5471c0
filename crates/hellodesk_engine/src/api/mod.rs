/* 📖 # Why an API module in hellodesk_engine?

The api module exposes the registry and the demo endpoints over HTTP. ApiService
implements the HttpService trait from hellodesk_base, so the same service runs behind
RealPal in production and behind MockPal in tests.

Endpoint groups:
- demo endpoints: root, health, echo, greet, square, items, search, categories
- user endpoints: POST /users and GET /users/{user_id}, backed by RegistryHandle
*/

mod query;
mod service;
mod users;

pub use query::QueryParams;
pub use service::ApiService;
