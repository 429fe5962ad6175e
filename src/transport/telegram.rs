//! Telegram Bot API transport

use super::{
    Inbound, InlineKeyboard, Markup, MessageContent, OutgoingMessage, ReplyKeyboard, ShareRequest, TextFormat,
    Transport, TransportError,
};
use crate::session::{ArtifactId, SessionKey};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

pub struct TelegramTransport {
    client: reqwest::Client,
    token: String,
    api_base: String,
}

impl TelegramTransport {
    /// `timeout` must exceed the long-poll timeout used with [`Self::get_updates`].
    pub fn new(token: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, TransportError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| network_error(&e))?;
        Self::unwrap_result(method, response).await
    }

    async fn unwrap_result<T: DeserializeOwned>(method: &str, response: reqwest::Response) -> Result<T, TransportError> {
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(format!("Failed to read response: {e}")))?;
        let parsed: ApiResult<T> = serde_json::from_str(&body)
            .map_err(|e| TransportError::Decode(format!("{method}: {e} - body: {body}")))?;
        if !parsed.ok {
            return Err(TransportError::Api {
                code: parsed.error_code.unwrap_or_default(),
                description: parsed.description.unwrap_or_default(),
            });
        }
        parsed
            .result
            .ok_or_else(|| TransportError::Decode(format!("{method}: missing result")))
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }
}

fn network_error(e: &reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Network(format!("Request timeout: {e}"))
    } else if e.is_connect() {
        TransportError::Network(format!("Connection failed: {e}"))
    } else {
        TransportError::Network(format!("Request failed: {e}"))
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send(&self, session: SessionKey, message: OutgoingMessage) -> Result<ArtifactId, TransportError> {
        let sent: SentMessage = self.call("sendMessage", &send_message_body(session, &message)).await?;
        Ok(ArtifactId(sent.message_id))
    }

    async fn edit_controls(
        &self,
        session: SessionKey,
        artifact: ArtifactId,
        keyboard: InlineKeyboard,
    ) -> Result<(), TransportError> {
        let body = json!({
            "chat_id": session.0,
            "message_id": artifact.0,
            "reply_markup": inline_json(&keyboard),
        });
        // Returns the edited message, or `true` for inline messages
        let _: Value = self.call("editMessageReplyMarkup", &body).await?;
        Ok(())
    }

    async fn send_photo(&self, session: SessionKey, path: &Path) -> Result<(), TransportError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())
            .map_err(|e| TransportError::Decode(format!("Invalid MIME type: {e}")))?;
        let form = Form::new().text("chat_id", session.0.to_string()).part("photo", part);

        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error(&e))?;
        let _: Value = Self::unwrap_result("sendPhoto", response).await?;
        Ok(())
    }

    async fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>, TransportError> {
        let file: File = self.call("getFile", &json!({ "file_id": file_id })).await?;
        let file_path = file
            .file_path
            .ok_or_else(|| TransportError::Decode("getFile: no file_path".to_string()))?;
        let url = format!("{}/file/bot{}/{file_path}", self.api_base, self.token);

        let response = self.client.get(url).send().await.map_err(|e| network_error(&e))?;
        if !response.status().is_success() {
            return Err(TransportError::Api {
                code: i64::from(response.status().as_u16()),
                description: "file download failed".to_string(),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(format!("Failed to read file: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError> {
        let _: bool = self
            .call("answerCallbackQuery", &json!({ "callback_query_id": callback_id }))
            .await?;
        Ok(())
    }
}

// ============================================================================
// Outbound encoding
// ============================================================================

fn send_message_body(session: SessionKey, message: &OutgoingMessage) -> Value {
    let mut body = json!({
        "chat_id": session.0,
        "text": message.text,
    });
    match message.format {
        TextFormat::Plain => {}
        TextFormat::Html => body["parse_mode"] = json!("HTML"),
        TextFormat::Markdown => body["parse_mode"] = json!("Markdown"),
    }
    if let Some(markup) = markup_json(&message.markup) {
        body["reply_markup"] = markup;
    }
    body
}

fn markup_json(markup: &Markup) -> Option<Value> {
    match markup {
        Markup::None => None,
        Markup::Inline(keyboard) => Some(inline_json(keyboard)),
        Markup::Reply(keyboard) => Some(reply_json(keyboard)),
        Markup::RemoveKeyboard => Some(json!({ "remove_keyboard": true, "selective": false })),
    }
}

fn inline_json(keyboard: &InlineKeyboard) -> Value {
    let rows: Vec<Vec<Value>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|b| json!({ "text": b.label, "callback_data": b.action }))
                .collect()
        })
        .collect();
    json!({ "inline_keyboard": rows })
}

fn reply_json(keyboard: &ReplyKeyboard) -> Value {
    let rows: Vec<Vec<Value>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|b| {
                    let mut button = json!({ "text": b.label });
                    match b.request {
                        Some(ShareRequest::Contact) => button["request_contact"] = json!(true),
                        Some(ShareRequest::Location) => button["request_location"] = json!(true),
                        None => {}
                    }
                    button
                })
                .collect()
        })
        .collect();
    json!({
        "keyboard": rows,
        "one_time_keyboard": keyboard.one_time,
        "resize_keyboard": keyboard.resize,
    })
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiResult<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Debug, Deserialize)]
struct File {
    #[serde(default)]
    file_path: Option<String>,
}

/// One entry of `getUpdates` or one webhook delivery
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    message: Option<Message>,
    #[serde(default)]
    callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
struct Message {
    message_id: i64,
    chat: Chat,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    contact: Option<Contact>,
    #[serde(default)]
    location: Option<Location>,
    #[serde(default)]
    photo: Option<Vec<PhotoSize>>,
}

#[derive(Debug, Clone, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct Contact {
    phone_number: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Location {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct PhotoSize {
    file_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CallbackQuery {
    id: String,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    message: Option<Message>,
}

impl Update {
    /// Normalize into an inbound event; `None` for update kinds the bot ignores.
    pub fn into_inbound(self) -> Option<Inbound> {
        if let Some(query) = self.callback_query {
            let message = query.message?;
            return Some(Inbound::Control {
                session: SessionKey(message.chat.id),
                artifact: ArtifactId(message.message_id),
                action: query.data.unwrap_or_default(),
                callback_id: query.id,
            });
        }

        let message = self.message?;
        let session = SessionKey(message.chat.id);
        let content = if let Some(contact) = message.contact {
            MessageContent::Contact {
                first_name: contact.first_name,
                last_name: contact.last_name.unwrap_or_default(),
                phone: contact.phone_number,
            }
        } else if let Some(location) = message.location {
            MessageContent::Location {
                latitude: location.latitude,
                longitude: location.longitude,
            }
        } else if let Some(photo) = message.photo.and_then(|sizes| sizes.into_iter().last()) {
            // Sizes are listed smallest first
            MessageContent::Photo { file_id: photo.file_id }
        } else {
            parse_text(message.text?)
        };
        Some(Inbound::Message { session, content })
    }
}

fn parse_text(text: String) -> MessageContent {
    let command = text.strip_prefix('/').and_then(|rest| {
        let mut words = rest.split_whitespace();
        let head = words.next()?;
        // "/start@my_bot" in group chats
        let name = head.split_once('@').map_or(head, |(name, _)| name);
        Some((name.to_string(), words.map(str::to_string).collect()))
    });
    match command {
        Some((name, args)) => MessageContent::Command { name, args },
        None => MessageContent::Text(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{InlineButton, ReplyButton};

    fn update(value: Value) -> Option<Inbound> {
        serde_json::from_value::<Update>(value).unwrap().into_inbound()
    }

    #[test]
    fn test_text_and_command_messages() {
        let inbound = update(json!({
            "update_id": 1,
            "message": {"message_id": 10, "chat": {"id": 5}, "text": "hello"}
        }));
        assert_eq!(
            inbound,
            Some(Inbound::Message {
                session: SessionKey(5),
                content: MessageContent::Text("hello".into())
            })
        );

        let inbound = update(json!({
            "update_id": 2,
            "message": {"message_id": 11, "chat": {"id": 5}, "text": "/login@shop_bot a@b.c secret"}
        }));
        assert_eq!(
            inbound,
            Some(Inbound::Message {
                session: SessionKey(5),
                content: MessageContent::Command {
                    name: "login".into(),
                    args: vec!["a@b.c".into(), "secret".into()]
                }
            })
        );
    }

    #[test]
    fn test_contact_location_and_photo() {
        let contact = update(json!({
            "update_id": 1,
            "message": {"message_id": 1, "chat": {"id": 7},
                "contact": {"phone_number": "+100", "first_name": "Ann"}}
        }));
        assert!(matches!(
            contact,
            Some(Inbound::Message { content: MessageContent::Contact { ref phone, ref last_name, .. }, .. })
                if phone == "+100" && last_name.is_empty()
        ));

        let location = update(json!({
            "update_id": 2,
            "message": {"message_id": 2, "chat": {"id": 7}, "location": {"latitude": 1.5, "longitude": 2.5}}
        }));
        assert!(matches!(
            location,
            Some(Inbound::Message { content: MessageContent::Location { .. }, .. })
        ));

        let photo = update(json!({
            "update_id": 3,
            "message": {"message_id": 3, "chat": {"id": 7}, "photo": [
                {"file_id": "small", "width": 90, "height": 90},
                {"file_id": "large", "width": 800, "height": 800}
            ]}
        }));
        assert_eq!(
            photo,
            Some(Inbound::Message {
                session: SessionKey(7),
                content: MessageContent::Photo { file_id: "large".into() }
            })
        );
    }

    #[test]
    fn test_callback_query_becomes_control() {
        let inbound = update(json!({
            "update_id": 9,
            "callback_query": {
                "id": "cb1",
                "data": "add_to_cart_7",
                "message": {"message_id": 55, "chat": {"id": 3}, "text": "Tea"}
            }
        }));
        assert_eq!(
            inbound,
            Some(Inbound::Control {
                session: SessionKey(3),
                artifact: ArtifactId(55),
                action: "add_to_cart_7".into(),
                callback_id: "cb1".into()
            })
        );
    }

    #[test]
    fn test_ignored_updates() {
        assert_eq!(update(json!({"update_id": 1})), None);
        assert_eq!(
            update(json!({"update_id": 2, "message": {"message_id": 1, "chat": {"id": 1}}})),
            None
        );
    }

    #[test]
    fn test_send_message_encoding() {
        let message = OutgoingMessage::html("<b>Tea</b>").with_inline(InlineKeyboard::row(vec![InlineButton::new(
            "➕",
            "add_to_cart_1",
        )]));
        let body = send_message_body(SessionKey(4), &message);
        assert_eq!(body["chat_id"], 4);
        assert_eq!(body["parse_mode"], "HTML");
        assert_eq!(body["reply_markup"]["inline_keyboard"][0][0]["callback_data"], "add_to_cart_1");

        let message = OutgoingMessage::text("share").with_reply(ReplyKeyboard::new(vec![vec![
            ReplyButton::requesting("Share My Contact", ShareRequest::Contact),
        ]]));
        let body = send_message_body(SessionKey(4), &message);
        assert!(body.get("parse_mode").is_none());
        assert_eq!(body["reply_markup"]["keyboard"][0][0]["request_contact"], true);
        assert_eq!(body["reply_markup"]["one_time_keyboard"], true);

        let body = send_message_body(SessionKey(4), &OutgoingMessage::text("x").with_markup(Markup::RemoveKeyboard));
        assert_eq!(body["reply_markup"]["remove_keyboard"], true);
    }
}
