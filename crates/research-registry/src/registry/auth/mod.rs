mod extract;
mod password;
mod service;
mod token;

pub use extract::{AuthUser, ContentEditor, HostUser};
pub use password::{hash_password, verify_password};
pub use service::{
    AuthError, AuthService, LoginRequest, NewUser, Session, SignupRequest, UserPatch,
    GUEST_SUBJECT,
};
pub use token::{Claims, TokenSigner};
