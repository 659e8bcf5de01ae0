pub mod envelope;
pub mod gateway;
pub mod interceptor;
pub mod query;
pub mod resource;
pub mod resources;

pub use envelope::{ApiPayload, Envelope, ResponseBody};
pub use gateway::{ApiClient, ApiRequest};
pub use interceptor::{SessionTeardown, UnauthorizedHandler};
pub use query::QueryParams;
pub use resource::{ListQuery, Listing, Paged, Resource};
pub use resources::*;
