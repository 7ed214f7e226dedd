//! Catalog and booking command handlers.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, Local, NaiveDate};
use gymshop_core::booking::{day_bounds, month_bounds};
use gymshop_core::{AvailabilityQuery, Filter};
use gymshop_storefront::{list, BookingWidget, ListSource};

use crate::App;

pub(crate) async fn list_services(
    app: &App,
    search: Option<&str>,
    page: u32,
    limit: Option<u32>,
) -> anyhow::Result<()> {
    let filter = Filter::new()
        .with("search", search)
        .with("page", page)
        .with("limit", limit.unwrap_or(app.config.default_page_limit));
    let services = list::services(Arc::clone(&app.client))
        .fetch(filter)
        .await
        .context("listing services")?;

    if services.body.is_empty() {
        println!("no services found");
        return Ok(());
    }

    println!("{:<8}{:<14}{:<10}NAME", "ID", "PRICE", "TYPE");
    for service in &services.body {
        println!(
            "{:<8}{:<14}{:<10}{}",
            service.id,
            service.price.to_string(),
            service.booking_type_id.to_string(),
            service.name
        );
    }
    let p = &services.meta.pagination;
    println!("page {} of {} ({} total)", p.current_page, p.total_pages, p.total);
    Ok(())
}

pub(crate) async fn show_service(app: &App, id: i64) -> anyhow::Result<()> {
    let service = app
        .client
        .get_service(id)
        .await
        .with_context(|| format!("fetching service {id}"))?;

    println!("{} (#{})", service.name, service.id);
    println!("price: {}  type: {}", service.price, service.booking_type_id);
    if let Some(description) = &service.description {
        println!("{description}");
    }
    for variant in &service.variants {
        let sizes: Vec<&str> = variant.sizes.iter().map(|s| s.name.as_str()).collect();
        println!(
            "  variant {:<6}{}{}",
            variant.id,
            variant.name,
            if sizes.is_empty() {
                String::new()
            } else {
                format!(" [{}]", sizes.join(", "))
            }
        );
    }
    for staff in &service.staffs {
        println!("  staff   {:<6}{}", staff.id, staff.name);
    }
    Ok(())
}

pub(crate) async fn available_days(
    app: &App,
    service: i64,
    year: i32,
    month: u32,
    variant: Option<i64>,
    staff: Option<i64>,
) -> anyhow::Result<()> {
    let (from_time, to_time) = month_bounds(&Local, year, month)?;
    let query = AvailabilityQuery {
        service_id: service,
        variant_id: variant,
        staff_id: staff,
        from_time,
        to_time,
    };
    let days = app.client.available_days(&query).await?;
    if days.is_empty() {
        println!("no open days in {year}-{month:02}");
    }
    for ts in days {
        if let Some(day) = chrono::DateTime::from_timestamp(ts, 0) {
            println!("{}", day.with_timezone(&Local).format("%Y-%m-%d"));
        }
    }
    Ok(())
}

pub(crate) async fn available_slots(
    app: &App,
    service: i64,
    date: NaiveDate,
    variant: Option<i64>,
    staff: Option<i64>,
) -> anyhow::Result<()> {
    let (from_time, to_time) =
        day_bounds(&Local, date).with_context(|| format!("{date} has no local midnight"))?;
    let query = AvailabilityQuery {
        service_id: service,
        variant_id: variant,
        staff_id: staff,
        from_time,
        to_time,
    };
    let slots = app.client.available_slots(&query).await?;
    if slots.is_empty() {
        println!("no open slots on {date}");
    }
    for (i, slot) in slots.iter().enumerate() {
        println!("{i:>3}  {}", slot.label(&Local));
    }
    Ok(())
}

pub(crate) struct BookingChoice {
    pub(crate) service: i64,
    pub(crate) date: NaiveDate,
    pub(crate) slot: usize,
    pub(crate) variant: Option<i64>,
    pub(crate) size: Option<i64>,
    pub(crate) staff: Option<i64>,
    pub(crate) quantity: i64,
}

/// Walks the booking widget through one complete selection and confirms it.
pub(crate) async fn book(app: &App, choice: &BookingChoice) -> anyhow::Result<()> {
    let customer_id = app.customer_id()?;
    let mut widget = BookingWidget::new(
        Arc::clone(&app.client),
        Arc::clone(&app.notifier),
        Local,
        choice.date,
    );
    widget.open();
    widget.load_service(choice.service).await?;
    if let Some(variant) = choice.variant {
        widget.select_variant(variant).await?;
    }
    if let Some(size) = choice.size {
        widget.select_size(size)?;
    }
    if let Some(staff) = choice.staff {
        widget.select_staff(staff).await?;
    }
    widget.set_quantity(choice.quantity)?;
    if widget.month() != (choice.date.year(), choice.date.month()) {
        widget
            .set_month(choice.date.year(), choice.date.month())
            .await?;
    }
    widget.select_date(choice.date).await?;
    let slot = widget.select_slot(choice.slot)?;
    widget.book_now()?;
    widget.confirm(customer_id).await?;

    println!(
        "booked {} on {} at {}; continue to checkout",
        choice.service,
        choice.date,
        widget.slot_label(&slot)
    );
    Ok(())
}
