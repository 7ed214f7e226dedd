pub mod address;
mod app_config;
pub mod booking;
pub mod cart;
pub mod catalog;
mod config;
pub mod customer;
pub mod filter;
pub mod flag;
pub mod order;
pub mod page;
pub mod storage;

pub use address::{Address, AddressPatch, NewAddress};
pub use app_config::{AppConfig, Environment};
pub use booking::{AvailabilityQuery, Booking, BookingRequest, TimeSlot};
pub use cart::{CartItem, CartItemPatch, NewCartItem, ServiceSummary};
pub use catalog::{
    BookingTypeId, Brand, Category, Service, Staff, Supplier, User, Variant, VariantSize,
    WishlistItem,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use customer::{Customer, PasswordChange, ProfilePatch};
pub use filter::{Filter, FilterValue, DEFAULT_PAGE_LIMIT};
pub use order::{NewOrder, Order, OrderItem, PaymentGateway, PendingOrder};
pub use page::{Envelope, PageMeta, Paginated, Pagination};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Errors raised by the local key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stored value for {key} is not valid JSON: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Synchronous client-side checks that run before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("quantity must be at least 1 (got {quantity})")]
    QuantityBelowOne { quantity: i64 },

    #[error("time slot must start before it ends ({from_time} >= {to_time})")]
    InvalidTimeSlot { from_time: i64, to_time: i64 },

    #[error("new password and confirmation do not match")]
    PasswordMismatch,

    #[error("password must not be empty")]
    EmptyPassword,

    #[error("address {id} is the default address and cannot be deleted")]
    DeleteDefaultAddress { id: i64 },

    #[error("please select a {0}")]
    MissingSelection(&'static str),

    #[error("{0} has no open capacity")]
    DayUnavailable(chrono::NaiveDate),

    #[error("invalid calendar month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}
