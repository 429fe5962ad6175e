//! Typed client for the commerce endpoints

use super::types::{CartContents, Envelope, ProductListing, Registered};
use super::{
    Account, AccountUpdate, ApiError, ApiGateway, ApiRequest, CartItem, FormPart, Order, ProductPage,
    RegistrationDraft,
};
use crate::session::{ProductId, SessionKey};
use serde_json::json;
use std::sync::Arc;

/// Multipart filename the backend expects for uploaded profile images
const PROFILE_IMAGE_FILENAME: &str = "profile_image";

#[derive(Clone)]
pub struct ShopApi {
    gateway: Arc<ApiGateway>,
}

impl ShopApi {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    /// Register a new client and store the issued token.
    pub async fn register(&self, session: SessionKey, draft: &RegistrationDraft) -> Result<(), ApiError> {
        let mut parts = Vec::new();
        if let Some(image) = &draft.image {
            parts.push(FormPart::file("image", PROFILE_IMAGE_FILENAME, image.clone()));
        }
        parts.push(FormPart::text("address", draft.address.as_str()));
        parts.push(FormPart::text("email", draft.email.as_str()));
        parts.push(FormPart::text("phone", draft.phone.as_str()));
        if !draft.first_name.is_empty() {
            parts.push(FormPart::text("first_name", draft.first_name.as_str()));
        }
        if !draft.last_name.is_empty() {
            parts.push(FormPart::text("last_name", draft.last_name.as_str()));
        }

        let response = self
            .gateway
            .execute_public(&ApiRequest::post("/client/register").multipart(parts))
            .await?;
        let registered: Envelope<Registered> = response.json()?;
        self.gateway.sessions().replace_token(session, registered.data.token).await;
        tracing::info!(%session, "Client registered");
        Ok(())
    }

    pub async fn login(&self, session: SessionKey, email: &str, password: &str) -> Result<(), ApiError> {
        let request = ApiRequest::post("/client/login").json(json!({
            "email": email,
            "password": password,
        }));
        let response = self.gateway.execute_public(&request).await?;
        let token: Envelope<String> = response.json()?;
        self.gateway.sessions().replace_token(session, token.data).await;
        tracing::info!(%session, "Client logged in");
        Ok(())
    }

    pub async fn products(
        &self,
        session: SessionKey,
        page: u32,
        per_page: u32,
        search: Option<&str>,
    ) -> Result<ProductPage, ApiError> {
        let mut request = ApiRequest::get("/products")
            .query("per_page", per_page)
            .query("page", page);
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            request = request.query("search", search);
        }

        let listing: ProductListing = self.gateway.execute(session, &request).await?.json()?;
        let has_next = listing
            .links
            .and_then(|links| links.next)
            .is_some_and(|next| !next.is_null());
        Ok(ProductPage {
            products: listing.data,
            has_next,
        })
    }

    pub async fn cart(&self, session: SessionKey, with_details: bool) -> Result<Vec<CartItem>, ApiError> {
        let request = ApiRequest::get("/cart").query("showNamesAndPrices", with_details);
        let contents: Envelope<CartContents> = self.gateway.execute(session, &request).await?.json()?;
        Ok(contents.data.products)
    }

    pub async fn add_to_cart(&self, session: SessionKey, product_id: ProductId, quantity: u32) -> Result<(), ApiError> {
        let request = ApiRequest::post("/cart").json(json!({
            "product_id": product_id,
            "quantity": quantity,
        }));
        self.gateway.execute(session, &request).await?;
        Ok(())
    }

    pub async fn remove_from_cart(
        &self,
        session: SessionKey,
        product_id: ProductId,
        whole_line: bool,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::delete(format!("/cart/{product_id}")).query("delete_whole_product", whole_line);
        self.gateway.execute(session, &request).await?;
        Ok(())
    }

    pub async fn complete_order(&self, session: SessionKey) -> Result<Order, ApiError> {
        let order: Envelope<Order> = self.gateway.execute(session, &ApiRequest::post("/orders")).await?.json()?;
        Ok(order.data)
    }

    pub async fn order_history(&self, session: SessionKey) -> Result<Vec<Order>, ApiError> {
        let orders: Envelope<Vec<Order>> = self.gateway.execute(session, &ApiRequest::get("/orders")).await?.json()?;
        Ok(orders.data)
    }

    pub async fn account(&self, session: SessionKey) -> Result<Account, ApiError> {
        let account: Envelope<Account> = self.gateway.execute(session, &ApiRequest::get("/client")).await?.json()?;
        Ok(account.data.with_age(chrono::Utc::now()))
    }

    pub async fn update_account(&self, session: SessionKey, update: &AccountUpdate) -> Result<Account, ApiError> {
        let part = match update {
            AccountUpdate::Text { field, value } => FormPart::text(field.api_name(), value.as_str()),
            AccountUpdate::Image(bytes) => FormPart::file("image", PROFILE_IMAGE_FILENAME, bytes.clone()),
        };
        let request = ApiRequest::post("/client/update").multipart(vec![part]);
        let account: Envelope<Account> = self.gateway.execute(session, &request).await?.json()?;
        Ok(account.data.with_age(chrono::Utc::now()))
    }
}
