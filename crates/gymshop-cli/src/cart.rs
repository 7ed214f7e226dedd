//! Cart command handlers.

use std::sync::Arc;

use gymshop_storefront::CartSync;

use crate::{App, CartCommands};

pub(crate) async fn run(app: &App, command: CartCommands) -> anyhow::Result<()> {
    let cart = CartSync::new(
        Arc::clone(&app.client),
        Arc::clone(&app.notifier),
        app.customer_id()?,
    );
    cart.refresh().await?;

    match command {
        CartCommands::Show => {}
        CartCommands::Select { id } => cart.toggle_item(id, true).await?,
        CartCommands::Unselect { id } => cart.toggle_item(id, false).await?,
        CartCommands::SelectAll => cart.toggle_select_all(true).await?,
        CartCommands::UnselectAll => cart.toggle_select_all(false).await?,
        CartCommands::Qty { id, quantity } => cart.change_quantity(id, quantity).await?,
        CartCommands::Remove { id } => cart.remove_item(id).await?,
    }

    print_cart(&cart);
    Ok(())
}

fn print_cart(cart: &CartSync) {
    let state = cart.state();
    if state.items.is_empty() {
        println!("cart is empty");
        return;
    }
    println!("{:<4}{:<8}{:<6}{:<14}NAME", "SEL", "ID", "QTY", "LINE");
    for item in &state.items {
        let mark = if state.selected_ids.contains(&item.id) {
            "[x]"
        } else {
            "[ ]"
        };
        println!(
            "{:<4}{:<8}{:<6}{:<14}{}",
            mark,
            item.id,
            item.quantity,
            item.line_total().to_string(),
            item.service_detail.name
        );
    }
    println!(
        "subtotal: {}{}",
        state.subtotal(),
        if state.select_all { " (all selected)" } else { "" }
    );
}
