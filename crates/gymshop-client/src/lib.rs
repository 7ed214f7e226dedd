mod account;
mod auth;
mod booking;
mod cart;
pub mod catalog;
mod client;
mod error;
pub mod payment;
pub mod session;

pub use auth::Registration;
pub use client::StorefrontClient;
pub use error::ApiError;
pub use payment::{CheckoutRedirect, CheckoutRequest, MomoVerification, VnpayVerification};
pub use session::{AuthEvent, Session, TokenPair};
