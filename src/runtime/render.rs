//! Message texts and keyboards

use super::actions::{self, MenuChoice};
use crate::backend::{Account, ApiError, ApiErrorKind, CartItem, FieldErrors, Order, Product, ProfileField};
use crate::cart::CartEdit;
use crate::session::ProductId;
use crate::transport::{
    InlineButton, InlineKeyboard, Markup, OutgoingMessage, ReplyButton, ReplyKeyboard, ShareRequest,
};
use crate::workflow::{EditTarget, Notice};

const IMAGE_RULES: &str = "jpeg, png, jpg, gif, svg with max size 2048KB";

pub fn welcome() -> OutgoingMessage {
    OutgoingMessage::text(
        "Welcome to the My Telegram Bot! \nIf you need any help, just type /help. \nPlease, share your contact to create an account",
    )
    .with_reply(ReplyKeyboard::new(vec![vec![ReplyButton::requesting(
        "Share My Contact",
        ShareRequest::Contact,
    )]]))
}

pub fn help() -> OutgoingMessage {
    OutgoingMessage::text(
        "Available commands:\n/start - register a new account\n/login <email> <password> - log into an existing account\n/menu - show the main menu",
    )
}

pub fn main_menu() -> OutgoingMessage {
    let button = |choice: MenuChoice| ReplyButton::new(choice.label());
    OutgoingMessage::text("Please choose an option:").with_reply(ReplyKeyboard::new(vec![
        vec![button(MenuChoice::MakeOrder), button(MenuChoice::MyAccount)],
        vec![button(MenuChoice::CompleteOrder), button(MenuChoice::OrderHistory)],
        vec![button(MenuChoice::Cart)],
    ]))
}

pub fn notice(notice: &Notice) -> Vec<OutgoingMessage> {
    let message = match notice {
        Notice::AskAddress => OutgoingMessage::text("Please share your address or send your current location:")
            .with_reply(ReplyKeyboard::new(vec![vec![ReplyButton::requesting(
                "Share My Location",
                ShareRequest::Location,
            )]])),
        Notice::AskEmail => {
            OutgoingMessage::text("Please enter your email address:").with_markup(Markup::RemoveKeyboard)
        }
        Notice::AskImage => OutgoingMessage::text(format!(
            "Please upload your profile image ({IMAGE_RULES}) or send 'SKIP' to skip this step:"
        )),
        Notice::InvalidImageInput => OutgoingMessage::text(format!(
            "Invalid input. Please upload your profile image ({IMAGE_RULES}) or send 'SKIP'"
        )),
        Notice::ImageDownloadFailed { reason } => {
            OutgoingMessage::text(format!("Failed to download the image: {reason}. Please try again."))
        }
        Notice::RegistrationSucceeded { first_name } => {
            return vec![
                OutgoingMessage::text("Registration successful! You can now use the bot."),
                OutgoingMessage::text(format!(
                    "Hello, {first_name}! Welcome to our bot. To get started, use the buttons we'll provide to make orders, manage your account, view your order history, and manage your cart."
                )),
            ];
        }
        Notice::RegistrationRejected { errors } => OutgoingMessage::text(format!(
            "While registration some errors occurred:\n{}\nPlease start registration over.",
            error_lines(errors)
        )),
        Notice::RegistrationFailed { reason } => OutgoingMessage::text(format!("Registration failed: {reason}")),
        Notice::AskSearchQuery => OutgoingMessage::text("Please enter a product name to search for:"),
        Notice::AskFieldValue { target } => match target {
            EditTarget::Image => OutgoingMessage::text("Please upload your new profile image."),
            EditTarget::Text(_) => OutgoingMessage::text(format!(
                "Please enter the new value for your {}:",
                target.prompt_name()
            )),
        },
        Notice::EmptyValue => OutgoingMessage::text("Value cannot be empty. Please enter a valid value."),
        Notice::UpdateFailed { reason, errors } => {
            let details = if errors.is_empty() {
                format!("- {reason}\n")
            } else {
                error_lines(errors)
            };
            OutgoingMessage::text(format!(
                "Some errors occurred while updating your account:\n{details}\nYou can either try updating again or cancel the editing process."
            ))
            .with_inline(InlineKeyboard::row(vec![
                InlineButton::new("Try Again", "retry_update"),
                InlineButton::new("Cancel", "cancel_update"),
            ]))
        }
        Notice::NoUpdateInProgress => OutgoingMessage::text("Please start the update process again."),
        Notice::UpdateCancelled => OutgoingMessage::text("Account update process canceled."),
        Notice::NotUnderstood => OutgoingMessage::text("Sorry, I didn't understand your command. Please try again."),
    };
    vec![message]
}

/// One `- field: message` line per validation message
fn error_lines(errors: &FieldErrors) -> String {
    let mut lines = String::new();
    for (field, messages) in errors {
        for msg in messages {
            lines.push_str(&format!("- {field}: {msg}\n"));
        }
    }
    lines
}

/// User-facing description of a backend failure
pub fn api_failure(error: &ApiError) -> String {
    if error.is_terminal_auth() {
        return "Your session has expired. Please log in again with /login or share your contact to register"
            .to_string();
    }
    match error.kind {
        ApiErrorKind::Transport => "The shop is not reachable right now".to_string(),
        _ => error.message.clone(),
    }
}

// ----------------------------------------------------------------------------
// Products and cart
// ----------------------------------------------------------------------------

pub fn products_failed(error: &ApiError) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "An error occurred while fetching products: {}. Please try again later.",
        api_failure(error)
    ))
}

pub fn product_card(product: &Product, quantity: u32) -> OutgoingMessage {
    OutgoingMessage::html(format!(
        "<b>Name:</b> {}\n<b>Price:</b> ${:.2}\n<b>Weight:</b> {} g\n<b>Description:</b> {}",
        escape_html(&product.name),
        product.price,
        product.weight,
        escape_html(&product.description)
    ))
    .with_inline(cart_controls(product.id, quantity))
}

pub fn cart_controls(product_id: ProductId, quantity: u32) -> InlineKeyboard {
    let mut row = vec![
        InlineButton::new("➕", actions::add_token(product_id)),
        InlineButton::new(format!("🛒 {quantity}"), "cart"),
        InlineButton::new("➖", actions::reduce_token(product_id)),
    ];
    if quantity > 0 {
        row.push(InlineButton::new("❌", actions::remove_token(product_id)));
    }
    InlineKeyboard::row(row)
}

pub fn pagination(page: u32, has_next: bool, search: Option<&str>) -> OutgoingMessage {
    let previous = if page > 1 {
        InlineButton::new("Previous Page", actions::previous_page_token(page, search))
    } else {
        InlineButton::new("Previous Page", "disabled")
    };
    let next = if has_next {
        InlineButton::new("Next Page", actions::next_page_token(page, search))
    } else {
        InlineButton::new("Next Page", "disabled")
    };
    let (text, search_label) = match search {
        Some(search) => (
            format!("Results for '{search}'. Use the buttons below to navigate between pages:"),
            format!("Searching for: {search}"),
        ),
        None => (
            "Use the buttons below to navigate between pages or search for a specific product:".to_string(),
            "Search 🔍".to_string(),
        ),
    };
    OutgoingMessage::text(text).with_inline(InlineKeyboard::rows(vec![
        vec![previous, InlineButton::new(search_label, "search"), next],
        vec![
            InlineButton::new("Back ⬅️", "back"),
            InlineButton::new("Complete Order 📦", "complete_order"),
            InlineButton::new("Cart 🛒", "cart"),
        ],
    ]))
}

pub fn cart_summary(items: &[CartItem]) -> Vec<OutgoingMessage> {
    let mut text = String::from("Shopping Cart Items: \n");
    let mut total = 0.0;
    for item in items {
        let line_total = item.line_total();
        total += line_total;
        let name = item
            .product_name
            .clone()
            .unwrap_or_else(|| format!("Product #{}", item.product_id));
        text.push_str(&format!(
            "<b>{}:</b> {} items | ${line_total:.2} \n",
            escape_html(&name),
            item.quantity
        ));
    }
    text.push_str(&format!("\nTotal : ${total:.2}"));

    vec![
        OutgoingMessage::html(text),
        OutgoingMessage::text("Choose your action:").with_inline(InlineKeyboard::row(vec![
            InlineButton::new("🛒 Edit the Cart", "modify_cart"),
            InlineButton::new("🛍 Complete Order", "complete_order"),
        ])),
    ]
}

pub fn cart_confirmation(edit: CartEdit) -> OutgoingMessage {
    OutgoingMessage::text(match edit {
        CartEdit::Increase => "Product added to your cart.",
        CartEdit::Decrease => "Quantity of product is reduced",
        CartEdit::Remove => "Product is removed",
    })
}

pub fn stale_warning() -> OutgoingMessage {
    OutgoingMessage::text(
        "🚨 Warning: 🚨 \nYou're trying to update the cart from an older message. Please scroll to the most recent message to make changes to your cart. 🛒",
    )
}

// ----------------------------------------------------------------------------
// Orders
// ----------------------------------------------------------------------------

pub fn order_completed(order: &Order) -> OutgoingMessage {
    let mut text = format!(
        "Order Completed!\nOrder ID: {}\nStatus: {}\nTotal Price: {:.2}\n",
        order.id, order.status, order.total_price
    );
    for item in &order.items {
        text.push_str(&format!(
            "\n{}\nQuantity: {}\nPrice: {:.2}\n",
            item.product_name, item.quantity, item.price
        ));
    }
    OutgoingMessage::text(text)
}

/// History entry; `number` counts from the oldest order.
pub fn order_entry(number: usize, order: &Order) -> OutgoingMessage {
    let date = order
        .created_at()
        .map_or_else(|| "unknown".to_string(), |at| at.format("%A, %d %B %Y").to_string());
    let items: Vec<String> = order
        .items
        .iter()
        .map(|item| format!("{} x {}", item.quantity, item.product_name))
        .collect();
    OutgoingMessage::markdown(format!(
        "*Order #{number}* 📦\n*Status:* `{}`\n*Total Price: *{:.2}💲\n*Date:* {date}\n*Items:*\n{}",
        order.status.to_uppercase(),
        order.total_price,
        items.join("\n")
    ))
}

// ----------------------------------------------------------------------------
// Account
// ----------------------------------------------------------------------------

pub fn avatar_caption() -> OutgoingMessage {
    OutgoingMessage::text("Current Account Image")
        .with_inline(InlineKeyboard::row(vec![InlineButton::new("✏️ Edit", "edit_image")]))
}

pub fn avatar_missing() -> OutgoingMessage {
    OutgoingMessage::text("You don't have an avatar image yet. Please upload one:")
        .with_inline(InlineKeyboard::row(vec![InlineButton::new("Upload Image", "upload_avatar")]))
}

pub fn account_field(account: &Account, field: ProfileField) -> OutgoingMessage {
    OutgoingMessage::markdown(format!("*{}* ➤ `{}`", field.label(), account.field(field))).with_inline(
        InlineKeyboard::row(vec![InlineButton::new("✏️ Edit", actions::edit_field_token(field))]),
    )
}

pub fn account_age(account: &Account) -> OutgoingMessage {
    OutgoingMessage::markdown(format!(
        "You are our favorite customer already for *{}* days! 🎉🥳",
        account.days_since_creation
    ))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
