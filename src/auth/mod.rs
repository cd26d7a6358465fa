// Public API - what other modules can use
pub use entry_point::{unauthorized, UnauthorizedBody};
pub use handlers::{login, register};
pub use middleware::jwt_auth;
pub use token::{TokenAuthority, TokenConfig, TokenError};
pub use types::{AuthenticatedUser, Claims, JwtResponse, LoginRequest, SignupRequest};

// Internal modules
pub mod entry_point;
mod handlers;
mod middleware;
pub mod password;
pub mod service;
pub mod token;
mod types;
