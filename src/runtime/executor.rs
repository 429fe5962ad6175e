//! Bot executor: turns inbound chat events into workflow transitions, cart
//! edits and backend calls

use super::actions::{Action, MenuChoice};
use super::render;
use crate::backend::{Account, ApiErrorKind, ProfileField, ShopApi};
use crate::cart::{CartEdit, CartEngine, CartError, OrderCompletion};
use crate::media::{EntityKind, ImageCache};
use crate::session::{ArtifactId, ProductId, SessionKey, SessionStore};
use crate::transport::{Inbound, MessageContent, OutgoingMessage, Transport, TransportError};
use crate::workflow::{transition, EditTarget, Effect, Event, RegistrationOutcome, UpdateOutcome};
use std::sync::Arc;

type Outcome = Result<(), TransportError>;

pub struct Bot<T: Transport> {
    sessions: Arc<SessionStore>,
    api: ShopApi,
    cart: CartEngine,
    transport: Arc<T>,
    images: ImageCache,
    page_size: u32,
}

impl<T: Transport> Bot<T> {
    pub fn new(
        sessions: Arc<SessionStore>,
        api: ShopApi,
        transport: Arc<T>,
        images: ImageCache,
        page_size: u32,
    ) -> Self {
        let cart = CartEngine::new(api.clone(), sessions.clone());
        Self {
            sessions,
            api,
            cart,
            transport,
            images,
            page_size,
        }
    }

    /// Handle one inbound event to completion. Failures are logged; a broken
    /// chat connection never takes the worker down.
    pub async fn handle(&self, inbound: Inbound) {
        let session = inbound.session();
        let result = match inbound {
            Inbound::Message { session, content } => self.on_message(session, content).await,
            Inbound::Control {
                session,
                artifact,
                action,
                callback_id,
            } => {
                let result = self.on_control(session, artifact, &action).await;
                if let Err(e) = self.transport.acknowledge(&callback_id).await {
                    tracing::warn!(%session, error = %e, "Failed to acknowledge control");
                }
                result
            }
        };
        if let Err(e) = result {
            tracing::error!(%session, error = %e, "Failed to deliver reply");
        }
    }

    async fn on_message(&self, session: SessionKey, content: MessageContent) -> Outcome {
        let ctx = self.sessions.context(session).await;
        tracing::debug!(
            session = %ctx.key,
            authenticated = ctx.token.is_some(),
            state = ctx.workflow.name(),
            "Message received"
        );

        match content {
            MessageContent::Command { name, args } => self.on_command(session, &name, &args).await,
            MessageContent::Contact {
                first_name,
                last_name,
                phone,
            } => {
                self.drive(
                    session,
                    Event::ContactShared {
                        first_name,
                        last_name,
                        phone,
                    },
                )
                .await
            }
            MessageContent::Location { latitude, longitude } => {
                self.drive(session, Event::Location { latitude, longitude }).await
            }
            MessageContent::Photo { file_id } => self.drive(session, Event::Image { file_id }).await,
            MessageContent::Text(text) => {
                // Menu buttons work anywhere except while an account field is being typed
                match MenuChoice::from_label(&text) {
                    Some(choice) if !ctx.is_editing() => self.on_menu(session, choice).await,
                    _ => self.drive(session, Event::text(text)).await,
                }
            }
        }
    }

    async fn on_command(&self, session: SessionKey, name: &str, args: &[String]) -> Outcome {
        tracing::info!(%session, command = name, "Command received");
        match name {
            "start" => {
                if self.sessions.workflow(session).await.draft().is_some() {
                    tracing::info!(%session, "Registration restarted");
                }
                self.sessions.reset_workflow(session).await;
                self.send(session, render::welcome()).await
            }
            "help" => self.send(session, render::help()).await,
            "menu" => self.send(session, render::main_menu()).await,
            "login" => {
                let [email, password] = args else {
                    return self
                        .send(session, OutgoingMessage::text("Usage: /login <email> <password>"))
                        .await;
                };
                match self.api.login(session, email, password).await {
                    Ok(()) => {
                        self.sessions.reset_workflow(session).await;
                        self.send(session, OutgoingMessage::text("Logged in successfully.")).await?;
                        self.send(session, render::main_menu()).await
                    }
                    Err(e) => {
                        self.send(
                            session,
                            OutgoingMessage::text(format!("Login failed: {}", render::api_failure(&e))),
                        )
                        .await
                    }
                }
            }
            _ => {
                self.send(
                    session,
                    OutgoingMessage::text("Sorry, I didn't understand your command. Please try again."),
                )
                .await
            }
        }
    }

    async fn on_menu(&self, session: SessionKey, choice: MenuChoice) -> Outcome {
        tracing::debug!(%session, ?choice, "Menu choice");
        match choice {
            MenuChoice::MakeOrder => self.list_products(session, 1, None).await,
            MenuChoice::MyAccount => self.show_account(session).await,
            MenuChoice::CompleteOrder => self.complete_order(session, true).await,
            MenuChoice::OrderHistory => self.show_order_history(session).await,
            MenuChoice::Cart => self.show_cart(session).await,
        }
    }

    async fn on_control(&self, session: SessionKey, artifact: ArtifactId, token: &str) -> Outcome {
        let action = Action::parse(token);
        tracing::debug!(%session, %artifact, ?action, "Control pressed");
        match action {
            Action::Disabled => Ok(()),
            Action::Page { page, search } => self.list_products(session, page, search).await,
            Action::Search => self.drive(session, Event::SearchRequested).await,
            Action::EditImage => {
                self.drive(
                    session,
                    Event::EditRequested {
                        target: EditTarget::Image,
                    },
                )
                .await
            }
            Action::EditField(field) => {
                self.drive(
                    session,
                    Event::EditRequested {
                        target: EditTarget::Text(field),
                    },
                )
                .await
            }
            Action::RetryUpdate => self.drive(session, Event::EditRetry).await,
            Action::CancelUpdate => self.drive(session, Event::EditCancelled).await,
            Action::Back => self.send(session, render::main_menu()).await,
            Action::ModifyCart => self.list_products(session, 1, None).await,
            Action::CompleteOrder => self.complete_order(session, false).await,
            Action::Cart => self.show_cart(session).await,
            Action::AddToCart(id) => self.edit_cart(session, id, CartEdit::Increase, artifact).await,
            Action::ReduceInCart(id) => self.edit_cart(session, id, CartEdit::Decrease, artifact).await,
            Action::RemoveFromCart(id) => self.edit_cart(session, id, CartEdit::Remove, artifact).await,
            Action::Unknown => {
                tracing::warn!(%session, token, "Unknown control action");
                self.send(
                    session,
                    OutgoingMessage::text("Sorry, I didn't understand your action. Please try again."),
                )
                .await
            }
        }
    }

    /// Run `event` through the workflow, executing effects until no more
    /// events are generated.
    async fn drive(&self, session: SessionKey, event: Event) -> Outcome {
        let mut state = self.sessions.workflow(session).await;
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            let result = match transition(&state, current_event) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(%session, error = %e, "Dropped workflow event");
                    continue;
                }
            };

            if result.new_state != state {
                tracing::debug!(%session, from = state.name(), to = result.new_state.name(), "Workflow moved");
            }
            state = result.new_state;
            self.sessions.set_workflow(session, state.clone()).await;

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(session, effect).await? {
                    events_to_process.push(generated_event);
                }
            }
        }
        Ok(())
    }

    async fn execute_effect(&self, session: SessionKey, effect: Effect) -> Result<Option<Event>, TransportError> {
        match effect {
            Effect::Notify(notice) => {
                for message in render::notice(&notice) {
                    self.send(session, message).await?;
                }
                Ok(None)
            }
            Effect::FetchImage { file_id } => match self.transport.fetch_file(&file_id).await {
                Ok(data) => Ok(Some(Event::ImageFetched { data })),
                Err(e) => {
                    tracing::warn!(%session, file_id, error = %e, "Image download failed");
                    Ok(Some(Event::ImageFetchFailed { reason: e.to_string() }))
                }
            },
            Effect::SubmitRegistration { draft } => {
                let outcome = match self.api.register(session, &draft).await {
                    Ok(()) => RegistrationOutcome::Registered {
                        first_name: draft.first_name.clone(),
                    },
                    Err(e) if e.is_validation() && !e.field_errors.is_empty() => {
                        RegistrationOutcome::Rejected(e.field_errors)
                    }
                    Err(e) => RegistrationOutcome::Failed(render::api_failure(&e)),
                };
                tracing::info!(%session, ?outcome, "Registration submitted");
                Ok(Some(Event::RegistrationSubmitted { outcome }))
            }
            Effect::UpdateAccount { update } => {
                let outcome = match self.api.update_account(session, &update).await {
                    Ok(account) => UpdateOutcome::Updated(account),
                    Err(e) if e.is_validation() && !e.field_errors.is_empty() => {
                        UpdateOutcome::Rejected(e.field_errors)
                    }
                    Err(e) => UpdateOutcome::Failed(render::api_failure(&e)),
                };
                Ok(Some(Event::AccountUpdated { outcome }))
            }
            Effect::ListProducts { page, search } => {
                self.list_products(session, page, search).await?;
                Ok(None)
            }
            Effect::ShowMenu => {
                self.send(session, render::main_menu()).await?;
                Ok(None)
            }
            Effect::ShowAccount { account } => {
                self.render_account(session, &account).await?;
                Ok(None)
            }
            Effect::ShowWelcome => {
                self.send(session, render::welcome()).await?;
                Ok(None)
            }
        }
    }

    async fn list_products(&self, session: SessionKey, page: u32, search: Option<String>) -> Outcome {
        let listing = match self
            .api
            .products(session, page, self.page_size, search.as_deref())
            .await
        {
            Ok(listing) => listing,
            Err(e) => return self.send(session, render::products_failed(&e)).await,
        };
        if listing.products.is_empty() {
            return self
                .send(session, OutgoingMessage::text("No more products available."))
                .await;
        }

        if let Err(e) = self.cart.ensure_loaded(session).await {
            tracing::warn!(%session, error = %e, "Could not load cart, showing zero quantities");
        }

        for product in &listing.products {
            if let Some(url) = product.image.as_deref().filter(|url| !url.is_empty()) {
                self.send_image(session, url, EntityKind::Product).await;
            }
            let quantity = self.cart.quantity(session, product.id).await;
            let artifact = self
                .transport
                .send(session, render::product_card(product, quantity))
                .await?;
            self.cart.record_artifact(session, product.id, artifact).await;
        }

        self.send(
            session,
            render::pagination(page, listing.has_next, search.as_deref()),
        )
        .await
    }

    async fn edit_cart(&self, session: SessionKey, product_id: ProductId, edit: CartEdit, artifact: ArtifactId) -> Outcome {
        if let Err(e) = self.cart.ensure_loaded(session).await {
            tracing::warn!(%session, error = %e, "Could not load cart before edit");
        }
        match self.cart.apply(session, product_id, edit, artifact).await {
            Ok(line) => {
                if let Err(e) = self
                    .transport
                    .edit_controls(session, artifact, render::cart_controls(product_id, line.quantity))
                    .await
                {
                    tracing::warn!(%session, %artifact, error = %e, "Could not refresh cart controls");
                }
                self.cart.record_artifact(session, product_id, artifact).await;
                self.send(session, render::cart_confirmation(edit)).await
            }
            Err(CartError::Stale { .. }) => self.send(session, render::stale_warning()).await,
            Err(CartError::Backend(e)) => {
                tracing::warn!(%session, product_id, status = ?e.status, error = %e, "Cart update failed");
                let text = if e.kind == ApiErrorKind::Validation {
                    format!("Error updating cart: {}. Please try again.", e.message)
                } else {
                    "Error updating cart. Please try again.".to_string()
                };
                self.send(session, OutgoingMessage::text(text)).await
            }
        }
    }

    async fn show_cart(&self, session: SessionKey) -> Outcome {
        if let Err(e) = self.cart.ensure_loaded(session).await {
            tracing::warn!(%session, error = %e, "Could not load cart");
        }
        match self.api.cart(session, true).await {
            Ok(items) if items.is_empty() => {
                self.send(session, OutgoingMessage::text("Your cart is empty.")).await?;
                self.send(session, render::main_menu()).await
            }
            Ok(items) => {
                for message in render::cart_summary(&items) {
                    self.send(session, message).await?;
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(%session, error = %e, "Failed to fetch cart");
                self.send(
                    session,
                    OutgoingMessage::text("An error occurred while fetching your cart. Please try again."),
                )
                .await
            }
        }
    }

    /// `menu_on_empty` is set when the request came from the main menu.
    async fn complete_order(&self, session: SessionKey, menu_on_empty: bool) -> Outcome {
        match self.cart.complete_order(session).await {
            Ok(OrderCompletion::EmptyCart) => {
                self.send(
                    session,
                    OutgoingMessage::text(
                        "Your cart is empty. Please add at least one product to the cart before placing an order.",
                    ),
                )
                .await?;
                if menu_on_empty {
                    self.send(session, render::main_menu()).await?;
                }
                Ok(())
            }
            Ok(OrderCompletion::Completed { order, cleared }) => {
                self.send(session, render::order_completed(&order)).await?;
                for (product_id, artifact) in cleared {
                    if let Err(e) = self
                        .transport
                        .edit_controls(session, artifact, render::cart_controls(product_id, 0))
                        .await
                    {
                        tracing::debug!(%session, %artifact, error = %e, "Could not reset cart controls");
                    }
                }
                self.send(session, render::main_menu()).await
            }
            Err(e) => {
                self.send(
                    session,
                    OutgoingMessage::text(format!(
                        "Error completing the order: {} Please try again later.",
                        render::api_failure(&e)
                    )),
                )
                .await?;
                self.send(session, render::main_menu()).await
            }
        }
    }

    async fn show_order_history(&self, session: SessionKey) -> Outcome {
        match self.api.order_history(session).await {
            Ok(orders) if orders.is_empty() => {
                self.send(
                    session,
                    OutgoingMessage::text("You have no orders yet. Start shopping to see your orders here! 🛍️"),
                )
                .await?;
            }
            Ok(orders) => {
                let total = orders.len();
                for (i, order) in orders.iter().enumerate().rev() {
                    self.send(session, render::order_entry(i + 1, order)).await?;
                }
                tracing::debug!(%session, total, "Order history shown");
            }
            Err(e) => {
                tracing::warn!(%session, error = %e, "Failed to fetch order history");
                self.send(
                    session,
                    OutgoingMessage::text("Error fetching order history. Please try again later."),
                )
                .await?;
            }
        }
        self.send(session, render::main_menu()).await
    }

    async fn show_account(&self, session: SessionKey) -> Outcome {
        match self.api.account(session).await {
            Ok(account) => self.render_account(session, &account).await,
            Err(e) => {
                tracing::warn!(%session, error = %e, "Failed to fetch account");
                self.send(
                    session,
                    OutgoingMessage::text("Error fetching account details. Please try again later."),
                )
                .await
            }
        }
    }

    async fn render_account(&self, session: SessionKey, account: &Account) -> Outcome {
        if let Some(url) = account.image.as_deref().filter(|url| !url.is_empty()) {
            self.send_image(session, url, EntityKind::Account).await;
            self.send(session, render::avatar_caption()).await?;
        } else {
            self.send(session, render::avatar_missing()).await?;
        }
        for field in ProfileField::ALL {
            self.send(session, render::account_field(account, field)).await?;
        }
        self.send(session, render::account_age(account)).await?;
        self.send(session, render::main_menu()).await
    }

    /// Send a cached copy of a backend image. Missing images are skipped.
    async fn send_image(&self, session: SessionKey, url: &str, kind: EntityKind) {
        let path = match self.images.local_path(url, kind).await {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(%session, url, error = %e, "Image unavailable");
                return;
            }
        };
        if let Err(e) = self.transport.send_photo(session, &path).await {
            tracing::warn!(%session, path = %path.display(), error = %e, "Failed to send image");
        }
    }

    async fn send(&self, session: SessionKey, message: OutgoingMessage) -> Outcome {
        self.transport.send(session, message).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ApiGateway, ApiResponse};
    use crate::runtime::testing::{MockBackend, MockTransport};
    use crate::workflow::WorkflowState;
    use std::time::Duration;

    const KEY: SessionKey = SessionKey(7);

    struct Harness {
        bot: Bot<MockTransport>,
        sessions: Arc<SessionStore>,
        transport: MockTransport,
        _images: tempfile::TempDir,
    }

    fn harness(backend: &MockBackend, transport: MockTransport) -> Harness {
        let sessions = Arc::new(SessionStore::new());
        let gateway = Arc::new(ApiGateway::new(Arc::new(backend.clone()), sessions.clone()));
        let images = tempfile::tempdir().unwrap();
        let cache = ImageCache::new(images.path(), Duration::from_secs(1)).unwrap();
        let bot = Bot::new(
            sessions.clone(),
            ShopApi::new(gateway),
            Arc::new(transport.clone()),
            cache,
            5,
        );
        Harness {
            bot,
            sessions,
            transport,
            _images: images,
        }
    }

    fn text(text: &str) -> Inbound {
        Inbound::Message {
            session: KEY,
            content: MessageContent::Text(text.to_string()),
        }
    }

    fn control(artifact: i64, action: &str) -> Inbound {
        Inbound::Control {
            session: KEY,
            artifact: ArtifactId(artifact),
            action: action.to_string(),
            callback_id: format!("cb-{artifact}"),
        }
    }

    async fn register_until_image(h: &Harness) {
        h.bot
            .handle(Inbound::Message {
                session: KEY,
                content: MessageContent::Contact {
                    first_name: "Ann".into(),
                    last_name: "Lee".into(),
                    phone: "+100".into(),
                },
            })
            .await;
        h.bot.handle(text("1 Main St")).await;
        h.bot.handle(text("ann@example.com")).await;
        assert!(matches!(
            h.sessions.workflow(KEY).await,
            WorkflowState::AwaitingImage { .. }
        ));
    }

    #[tokio::test]
    async fn test_rejected_registration_lists_errors_and_resets() {
        let backend = MockBackend::new().on(
            "/client/register",
            ApiResponse::new(422, r#"{"message":"invalid","errors":{"email":["invalid format"]}}"#),
        );
        let h = harness(&backend, MockTransport::new());
        register_until_image(&h).await;

        h.bot.handle(text("SKIP")).await;

        let texts = h.transport.sent_texts();
        assert!(texts.iter().any(|t| t.contains("- email: invalid format")));
        assert!(texts.last().unwrap().starts_with("Welcome to the My Telegram Bot!"));
        assert_eq!(h.sessions.workflow(KEY).await, WorkflowState::Idle);
        assert_eq!(h.sessions.token(KEY).await, None);
    }

    #[tokio::test]
    async fn test_skip_registers_without_fetching() {
        let backend = MockBackend::new().on(
            "/client/register",
            ApiResponse::new(200, r#"{"data":{"token":"tok"}}"#),
        );
        let h = harness(&backend, MockTransport::new());
        register_until_image(&h).await;

        h.bot.handle(text("skip")).await;

        assert!(h.transport.fetches().is_empty());
        assert_eq!(h.sessions.token(KEY).await.as_deref(), Some("tok"));
        let texts = h.transport.sent_texts();
        assert!(texts.contains(&"Registration successful! You can now use the bot.".to_string()));
        assert_eq!(texts.last().map(String::as_str), Some("Please choose an option:"));
    }

    #[tokio::test]
    async fn test_failed_image_download_keeps_waiting_for_image() {
        let backend = MockBackend::new();
        let h = harness(&backend, MockTransport::new());
        register_until_image(&h).await;

        h.bot
            .handle(Inbound::Message {
                session: KEY,
                content: MessageContent::Photo {
                    file_id: "missing".into(),
                },
            })
            .await;

        assert_eq!(h.transport.fetches(), vec!["missing".to_string()]);
        assert!(h
            .transport
            .sent_texts()
            .last()
            .unwrap()
            .starts_with("Failed to download the image:"));
        assert!(matches!(
            h.sessions.workflow(KEY).await,
            WorkflowState::AwaitingImage { .. }
        ));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_uploaded_image_is_sent_with_registration() {
        let backend = MockBackend::new().on(
            "/client/register",
            ApiResponse::new(200, r#"{"data":{"token":"tok"}}"#),
        );
        let h = harness(&backend, MockTransport::new().with_file("photo-1", b"jpeg"));
        register_until_image(&h).await;

        h.bot
            .handle(Inbound::Message {
                session: KEY,
                content: MessageContent::Photo {
                    file_id: "photo-1".into(),
                },
            })
            .await;

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        let crate::backend::RequestBody::Multipart(parts) = &requests[0].body else {
            panic!("expected multipart body");
        };
        assert_eq!(parts[0].name(), "image");
        assert_eq!(h.sessions.workflow(KEY).await, WorkflowState::Idle);
    }

    fn shop() -> MockBackend {
        MockBackend::new()
            .on(
                "/products",
                ApiResponse::new(
                    200,
                    r#"{"data":[{"id":1,"name":"Tea","description":"Green","price":2.5,"weight":100}],"links":{"next":null}}"#,
                ),
            )
            .on("/cart", ApiResponse::new(200, r#"{"data":{"products":[]}}"#))
    }

    #[tokio::test]
    async fn test_product_listing_and_add_to_cart() {
        let backend = shop();
        let h = harness(&backend, MockTransport::new());

        h.bot.handle(text("Make Order 🛍️")).await;
        let sent = h.transport.sent();
        assert_eq!(sent.len(), 2);
        let card = sent[0].artifact;
        assert!(sent[0].message.text.contains("<b>Name:</b> Tea"));

        h.bot.handle(control(card.0, "add_to_cart_1")).await;

        let edits = h.transport.edits();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].artifact, card);
        assert!(edits[0].keyboard.buttons().any(|b| b.label == "🛒 1"));
        assert_eq!(
            h.transport.sent_texts().last().map(String::as_str),
            Some("Product added to your cart.")
        );
        assert_eq!(h.transport.acks(), vec![format!("cb-{}", card.0)]);
    }

    #[tokio::test]
    async fn test_stale_control_warns_without_backend_call() {
        let backend = shop();
        let h = harness(&backend, MockTransport::new());
        h.bot.handle(text("Make Order 🛍️")).await;
        let first_card = h.transport.sent()[0].artifact;
        // Listing again moves the product's controls to a newer message
        h.bot.handle(text("Make Order 🛍️")).await;
        let calls = backend.requests().len();

        h.bot.handle(control(first_card.0, "add_to_cart_1")).await;

        assert_eq!(backend.requests().len(), calls);
        assert!(h.transport.edits().is_empty());
        assert!(h
            .transport
            .sent_texts()
            .last()
            .unwrap()
            .contains("You're trying to update the cart from an older message"));
        assert_eq!(h.transport.acks().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_completion_makes_no_call() {
        let backend = MockBackend::new();
        let h = harness(&backend, MockTransport::new());

        h.bot.handle(text("Complete Order 📦")).await;

        assert!(backend.requests().is_empty());
        let texts = h.transport.sent_texts();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].starts_with("Your cart is empty."));
        assert_eq!(texts[1], "Please choose an option:");

        // From the inline control there is no menu
        h.bot.handle(control(5, "complete_order")).await;
        assert_eq!(h.transport.sent_texts().len(), 3);
    }

    #[tokio::test]
    async fn test_menu_label_while_editing_is_a_field_value() {
        let backend = MockBackend::new().on(
            "/client/update",
            ApiResponse::new(200, r#"{"data":{"first_name":"Cart 🛒"}}"#),
        );
        let h = harness(&backend, MockTransport::new());
        h.bot.handle(control(3, "edit_first_name")).await;
        assert!(h.sessions.context(KEY).await.is_editing());

        h.bot.handle(text("Cart 🛒")).await;

        assert_eq!(backend.count_path("/client/update"), 1);
        assert_eq!(backend.count_path("/cart"), 0);
        assert_eq!(h.sessions.workflow(KEY).await, WorkflowState::Idle);
    }

    #[tokio::test]
    async fn test_unknown_action_and_command() {
        let backend = MockBackend::new();
        let h = harness(&backend, MockTransport::new());

        h.bot.handle(control(1, "option1")).await;
        h.bot
            .handle(Inbound::Message {
                session: KEY,
                content: MessageContent::Command {
                    name: "dance".into(),
                    args: vec![],
                },
            })
            .await;

        assert_eq!(
            h.transport.sent_texts(),
            vec![
                "Sorry, I didn't understand your action. Please try again.".to_string(),
                "Sorry, I didn't understand your command. Please try again.".to_string(),
            ]
        );
        assert_eq!(h.transport.acks(), vec!["cb-1".to_string()]);
    }
}
