pub mod api;
pub mod catalog;
pub mod config;
pub mod registry;
pub mod user;
pub mod validation;

pub use api::ApiService;
pub use catalog::ItemCategory;
pub use config::{Config, ServerConfig, UsersConfig, load_config};
pub use registry::{InMemoryRegistry, RegistryHandle, UserRegistry};
pub use user::{NewUser, User, UserId};
pub use validation::{FieldError, ValidationErrors, validate_new_user};
