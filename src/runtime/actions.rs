//! Control action tokens and main-menu labels

use crate::backend::ProfileField;
use crate::session::ProductId;

/// Telegram rejects callback data longer than this many bytes
const MAX_TOKEN_BYTES: usize = 64;

/// Parsed control action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Inert button (pagination edge)
    Disabled,
    /// Show product page `page`
    Page { page: u32, search: Option<String> },
    Search,
    EditImage,
    EditField(ProfileField),
    RetryUpdate,
    CancelUpdate,
    Back,
    ModifyCart,
    CompleteOrder,
    Cart,
    AddToCart(ProductId),
    ReduceInCart(ProductId),
    RemoveFromCart(ProductId),
    Unknown,
}

impl Action {
    pub fn parse(token: &str) -> Self {
        match token {
            "disabled" => return Self::Disabled,
            "search" => return Self::Search,
            "upload_avatar" | "edit_image" => return Self::EditImage,
            "retry_update" => return Self::RetryUpdate,
            "cancel_update" => return Self::CancelUpdate,
            "back" => return Self::Back,
            "modify_cart" => return Self::ModifyCart,
            "complete_order" => return Self::CompleteOrder,
            "cart" => return Self::Cart,
            _ => {}
        }

        if let Some(rest) = token.strip_prefix("previous_page_") {
            return parse_page(rest, |p| p.saturating_sub(1).max(1));
        }
        if let Some(rest) = token.strip_prefix("next_page_") {
            return parse_page(rest, |p| p.saturating_add(1));
        }
        if let Some(id) = token.strip_prefix("add_to_cart_") {
            return id.parse().map_or(Self::Unknown, Self::AddToCart);
        }
        if let Some(id) = token.strip_prefix("reduce_amount_in_cart_") {
            return id.parse().map_or(Self::Unknown, Self::ReduceInCart);
        }
        if let Some(id) = token.strip_prefix("remove_from_cart_") {
            return id.parse().map_or(Self::Unknown, Self::RemoveFromCart);
        }
        if let Some(field) = token.strip_prefix("edit_") {
            return ProfileField::from_api_name(field).map_or(Self::Unknown, Self::EditField);
        }
        Self::Unknown
    }
}

/// `{page}` or `{page}_{search}`; the search text may itself contain `_`.
fn parse_page(rest: &str, target: impl Fn(u32) -> u32) -> Action {
    let (page, search) = match rest.split_once('_') {
        Some((page, search)) => (page, Some(search.to_string()).filter(|s| !s.is_empty())),
        None => (rest, None),
    };
    match page.parse::<u32>() {
        Ok(page) => Action::Page {
            page: target(page),
            search,
        },
        Err(_) => Action::Unknown,
    }
}

pub fn previous_page_token(current: u32, search: Option<&str>) -> String {
    page_token("previous_page", current, search)
}

pub fn next_page_token(current: u32, search: Option<&str>) -> String {
    page_token("next_page", current, search)
}

fn page_token(prefix: &str, current: u32, search: Option<&str>) -> String {
    let token = match search.filter(|s| !s.is_empty()) {
        Some(search) => format!("{prefix}_{current}_{search}"),
        None => format!("{prefix}_{current}"),
    };
    fit(token)
}

pub fn add_token(product_id: ProductId) -> String {
    format!("add_to_cart_{product_id}")
}

pub fn reduce_token(product_id: ProductId) -> String {
    format!("reduce_amount_in_cart_{product_id}")
}

pub fn remove_token(product_id: ProductId) -> String {
    format!("remove_from_cart_{product_id}")
}

pub fn edit_field_token(field: ProfileField) -> String {
    format!("edit_{}", field.api_name())
}

/// Truncate to the callback data limit on a char boundary.
fn fit(mut token: String) -> String {
    if token.len() > MAX_TOKEN_BYTES {
        let mut end = MAX_TOKEN_BYTES;
        while !token.is_char_boundary(end) {
            end -= 1;
        }
        token.truncate(end);
    }
    token
}

/// Main menu reply-keyboard buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    MakeOrder,
    MyAccount,
    CompleteOrder,
    OrderHistory,
    Cart,
}

impl MenuChoice {
    pub fn label(self) -> &'static str {
        match self {
            Self::MakeOrder => "Make Order 🛍️",
            Self::MyAccount => "My Account 📋",
            Self::CompleteOrder => "Complete Order 📦",
            Self::OrderHistory => "Order's History 📖",
            Self::Cart => "Cart 🛒",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        [
            Self::MakeOrder,
            Self::MyAccount,
            Self::CompleteOrder,
            Self::OrderHistory,
            Self::Cart,
        ]
        .into_iter()
        .find(|choice| choice.label() == text.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_tokens() {
        assert_eq!(Action::parse("disabled"), Action::Disabled);
        assert_eq!(Action::parse("upload_avatar"), Action::EditImage);
        assert_eq!(Action::parse("edit_image"), Action::EditImage);
        assert_eq!(Action::parse("edit_first_name"), Action::EditField(ProfileField::FirstName));
        assert_eq!(Action::parse("edit_phone"), Action::EditField(ProfileField::Phone));
        assert_eq!(Action::parse("edit_password"), Action::Unknown);
        assert_eq!(Action::parse("complete_order"), Action::CompleteOrder);
        assert_eq!(Action::parse("option1"), Action::Unknown);
    }

    #[test]
    fn test_cart_tokens() {
        assert_eq!(Action::parse(&add_token(7)), Action::AddToCart(7));
        assert_eq!(Action::parse(&reduce_token(7)), Action::ReduceInCart(7));
        assert_eq!(Action::parse(&remove_token(12)), Action::RemoveFromCart(12));
        assert_eq!(Action::parse("add_to_cart_x"), Action::Unknown);
    }

    #[test]
    fn test_page_tokens_carry_search() {
        assert_eq!(
            Action::parse(&next_page_token(2, Some("green_tea"))),
            Action::Page {
                page: 3,
                search: Some("green_tea".into())
            }
        );
        assert_eq!(
            Action::parse(&previous_page_token(2, None)),
            Action::Page { page: 1, search: None }
        );
        assert_eq!(
            Action::parse("previous_page_1"),
            Action::Page { page: 1, search: None }
        );
    }

    #[test]
    fn test_long_search_is_truncated_on_char_boundary() {
        let search = "чай".repeat(20);
        let token = next_page_token(1, Some(&search));
        assert!(token.len() <= MAX_TOKEN_BYTES);
        let Action::Page { page, search } = Action::parse(&token) else {
            panic!("expected page action");
        };
        assert_eq!(page, 2);
        assert!(search.is_some_and(|s| s.starts_with("чай")));
    }

    #[test]
    fn test_menu_labels() {
        assert_eq!(MenuChoice::from_label("Cart 🛒"), Some(MenuChoice::Cart));
        assert_eq!(MenuChoice::from_label("Order's History 📖"), Some(MenuChoice::OrderHistory));
        assert_eq!(MenuChoice::from_label("cart"), None);
    }
}
