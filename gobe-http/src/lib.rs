//! gobe-http: JSON envelopes for axum handlers.
//!
//! ```ignore
//! async fn create_user(State(db): State<DatabaseConnection>, Json(body): Json<NewUser>) -> ApiResult<Response> {
//!     let user = Repository::<user::Entity>::new(&db).create(body.into_active_model()).await?;
//!     Ok(response::success_with_message(user))
//! }
//! ```

pub mod error;
pub mod response;

pub use error::{ApiError, ApiResult};
pub use response::{Envelope, Status};
