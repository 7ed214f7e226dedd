//! Session, address-book and payment-return command handlers.

use std::sync::Arc;

use anyhow::Context;
use gymshop_storefront::{parse_return_query, AddressBook, Checkout, PaymentOutcome};

use crate::App;

pub(crate) async fn login(app: &App, email: &str, password: &str) -> anyhow::Result<()> {
    let customer = app
        .client
        .login(email, password)
        .await
        .context("signing in")?;
    println!("signed in as {} <{}>", customer.name, customer.email);
    Ok(())
}

pub(crate) async fn logout(app: &App) -> anyhow::Result<()> {
    app.client.logout().await?;
    println!("signed out");
    Ok(())
}

async fn address_book(app: &App) -> anyhow::Result<AddressBook> {
    let mut book = AddressBook::new(
        Arc::clone(&app.client),
        Arc::clone(&app.notifier),
        app.customer_id()?,
    );
    book.load().await?;
    Ok(book)
}

fn print_addresses(book: &AddressBook) {
    if book.addresses().is_empty() {
        println!("no addresses saved");
        return;
    }
    for address in book.addresses() {
        let mark = if address.is_default { "*" } else { " " };
        println!("{mark} {:<6}{}  ({})", address.id, address.one_line(), address.phone);
    }
}

pub(crate) async fn list_addresses(app: &App) -> anyhow::Result<()> {
    let book = address_book(app).await?;
    print_addresses(&book);
    Ok(())
}

pub(crate) async fn set_default_address(app: &App, id: i64) -> anyhow::Result<()> {
    let mut book = address_book(app).await?;
    book.set_default(id).await?;
    print_addresses(&book);
    Ok(())
}

pub(crate) async fn delete_address(app: &App, id: i64) -> anyhow::Result<()> {
    let mut book = address_book(app).await?;
    book.delete(id).await?;
    print_addresses(&book);
    Ok(())
}

fn checkout(app: &App) -> Checkout {
    Checkout::new(
        Arc::clone(&app.client),
        Arc::clone(&app.notifier),
        Arc::clone(&app.store),
        app.config.payment_return_url.clone(),
    )
}

pub(crate) async fn payment_return(app: &App, url: &str, momo: bool) -> anyhow::Result<()> {
    let query = parse_return_query(url);
    let checkout = checkout(app);
    let outcome = if momo {
        checkout.handle_momo_return(&query).await?
    } else {
        checkout.handle_vnpay_return(&query).await?
    };
    match outcome {
        PaymentOutcome::Success(order) => {
            println!("payment confirmed; order #{} created", order.id);
        }
        PaymentOutcome::Failed { reason } => println!("payment failed: {reason}"),
    }
    Ok(())
}

pub(crate) fn pending_payments(app: &App) -> anyhow::Result<()> {
    let pending = checkout(app).pending_orders()?;
    if pending.is_empty() {
        println!("no pending checkouts");
    }
    for p in pending {
        println!(
            "{}  {:<7}{:<14}{}",
            p.reference,
            p.gateway.to_string(),
            p.order.total_amount.to_string(),
            p.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
