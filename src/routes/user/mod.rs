mod handler;
mod model;

pub use handler::{refresh, signin, signout, signup};
pub use model::{SignInRequest, SignUpRequest, SignUpResponse};
