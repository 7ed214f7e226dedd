mod account;
mod address_book;
mod booking;
mod cart;
mod checkout;
mod error;
pub mod list;
mod notify;
#[cfg(test)]
mod test_support;

pub use account::Account;
pub use address_book::AddressBook;
pub use booking::{BookingStep, BookingWidget, Navigation};
pub use cart::{CartState, CartSync};
pub use checkout::{parse_return_query, Checkout, CheckoutStart, PaymentOutcome, ORDER_REF_PARAM};
pub use error::StorefrontError;
pub use list::{ApiList, ListController, ListHandle, ListOptions, ListSource, ListState};
pub use notify::{ChannelNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
