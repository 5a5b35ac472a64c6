//! Bearer token handling. Tokens are issued by an external identity
//! service; this server only validates them.

pub mod jwt;
