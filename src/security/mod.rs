/// Security primitives: password hashing and the token codec
pub mod jwt;
pub mod password;

pub use jwt::{TokenCodec, TokenError, TokenKind, TokenPair};
pub use password::{dummy_verify, hash_password, validate_password_policy, verify_password};
