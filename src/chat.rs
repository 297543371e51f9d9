//! Chat message submission.
//!
//! Only one chat request is in flight per [`ChatSession`]. Sending a new message
//! cancels the previous one, and a canceled request resolves to
//! [`ChatError::Canceled`], which callers must not show as a failure.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::notify::{Notice, NoticeBus};
use crate::source::http::endpoint_url;

const CHAT_PATH: [&str; 4] = ["api", "v1", "chatbot", "chat"];

/// A chat request that did not produce an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// Superseded by a newer message or an explicit cancel. Not a failure.
    #[error("Request canceled")]
    Canceled,
    /// The user must sign in.
    #[error("Sign-in is required to use the assistant.")]
    Unauthenticated,
    /// The account has no credits left.
    #[error("Not enough credits to send this message.")]
    InsufficientCredits,
    /// Too many requests.
    #[error("Too many requests. Please try again shortly.")]
    RateLimited,
    /// The server rejected the input.
    #[error("The request was invalid. Please check your input and try again.")]
    InvalidRequest,
    /// The assistant is temporarily unavailable.
    #[error("The assistant is temporarily unavailable.")]
    Unavailable,
    /// Anything else, including transport failures.
    #[error("A temporary error occurred. Please try again shortly.")]
    Other {
        /// HTTP status, when a response was received.
        status: Option<u16>,
        /// Underlying error text (for logs).
        detail: String,
    },
}

impl ChatError {
    /// Map an HTTP status and the body's `error` code.
    ///
    /// Either signal is enough; statuses are checked in a fixed order so the first
    /// matching rule wins.
    pub fn from_status(status: Option<u16>, code: Option<&str>) -> Self {
        match (status, code) {
            (Some(400), _) | (_, Some("invalid_request")) => ChatError::InvalidRequest,
            (Some(401), _) | (_, Some("unauthorized" | "auth_required")) => {
                ChatError::Unauthenticated
            }
            (Some(402), _) | (_, Some("insufficient_credits")) => ChatError::InsufficientCredits,
            (Some(429), _) | (_, Some("rate_limited")) => ChatError::RateLimited,
            (Some(503), _) | (_, Some("chatbot_unavailable")) => ChatError::Unavailable,
            _ => ChatError::Other {
                status,
                detail: code.unwrap_or_default().to_string(),
            },
        }
    }

    /// Whether the error should be shown to the user.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, ChatError::Canceled)
    }

    /// Notice to publish for this error, if any.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            ChatError::Unauthenticated => Some(Notice::LoginRequired),
            ChatError::InsufficientCredits => Some(Notice::InsufficientCredits),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ChatError::from_status(Some(status.as_u16()), None),
            None => ChatError::Other {
                status: None,
                detail: err.to_string(),
            },
        }
    }
}

/// The assistant's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Generated answer text.
    pub answer: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct ChatErrorBody {
    error: Option<String>,
}

/// Sends one chat query.
#[async_trait(?Send)]
pub trait ChatApi {
    /// Send `query` and wait for the answer.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ChatError`]; never [`ChatError::Canceled`] (cancellation is
    /// the session's concern).
    async fn send(&self, query: &str) -> Result<ChatReply, ChatError>;
}

/// `POST /api/v1/chatbot/chat` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpChatApi {
    client: Client,
    url: Url,
    bearer_token: Option<String>,
}

impl HttpChatApi {
    /// Client for the chat endpoint under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Other`] if the URL or HTTP client is unusable.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ChatError> {
        let other = |detail: String| ChatError::Other {
            status: None,
            detail,
        };
        let base = Url::parse(base_url).map_err(|e| other(e.to_string()))?;
        let url = endpoint_url(&base, &CHAT_PATH, &[]).map_err(|e| other(e.to_string()))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url,
            bearer_token: None,
        })
    }

    /// Authenticate requests with a bearer token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

#[async_trait(?Send)]
impl ChatApi for HttpChatApi {
    async fn send(&self, query: &str) -> Result<ChatReply, ChatError> {
        let mut request = self.client.post(self.url.clone()).json(&ChatRequest { query });
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<ChatReply>().await?);
        }

        let code = response
            .json::<ChatErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error);
        Err(ChatError::from_status(Some(status.as_u16()), code.as_deref()))
    }
}

/// Serializes chat sends: a new send cancels the one in flight.
pub struct ChatSession<A: ChatApi> {
    api: A,
    bus: NoticeBus,
    sequence: Cell<u64>,
    in_flight: RefCell<Option<(u64, CancellationToken)>>,
}

impl<A: ChatApi> ChatSession<A> {
    /// Session sending through `api` and publishing notices on `bus`.
    pub fn new(api: A, bus: NoticeBus) -> Self {
        Self {
            api,
            bus,
            sequence: Cell::new(0),
            in_flight: RefCell::new(None),
        }
    }

    /// Whether a send is currently in flight.
    pub fn is_sending(&self) -> bool {
        self.in_flight.borrow().is_some()
    }

    /// Cancel the send in flight, if any.
    pub fn cancel(&self) {
        if let Some((_, token)) = self.in_flight.borrow_mut().take() {
            debug!("chat.cancel");
            token.cancel();
        }
    }

    /// Send `query`, canceling any earlier send still in flight.
    ///
    /// # Errors
    ///
    /// [`ChatError::Canceled`] if a later send or [`cancel`](Self::cancel) superseded
    /// this one; otherwise the mapped API error. Errors with an associated
    /// [`Notice`] are also published on the bus.
    pub async fn send(&self, query: &str) -> Result<ChatReply, ChatError> {
        let id = self.sequence.get() + 1;
        self.sequence.set(id);
        let token = CancellationToken::new();

        let previous = self.in_flight.borrow_mut().replace((id, token.clone()));
        if let Some((_, previous)) = previous {
            debug!("chat.send: previous request canceled");
            previous.cancel();
        }

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(ChatError::Canceled),
            result = self.api.send(query) => result,
        };
        let result = if token.is_cancelled() {
            Err(ChatError::Canceled)
        } else {
            result
        };

        {
            let mut in_flight = self.in_flight.borrow_mut();
            if in_flight.as_ref().is_some_and(|(current, _)| *current == id) {
                *in_flight = None;
            }
        }

        if let Err(err) = &result {
            if err.is_user_visible() {
                warn!(error = ?err, "chat.send: failed");
            } else {
                debug!("chat.send: canceled");
            }
            if let Some(notice) = err.notice() {
                self.bus.publish(notice);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use tokio::task::LocalSet;

    /// Answers after a delay chosen by the query; fails on demand.
    struct FakeChat;

    #[async_trait(?Send)]
    impl ChatApi for FakeChat {
        async fn send(&self, query: &str) -> Result<ChatReply, ChatError> {
            let delay = if query == "slow" { 100 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            match query {
                "unauthorized" => Err(ChatError::from_status(Some(401), None)),
                "broke" => Err(ChatError::from_status(Some(500), None)),
                _ => Ok(ChatReply {
                    answer: format!("re: {query}"),
                }),
            }
        }
    }

    #[test]
    fn status_mapping() {
        assert_eq!(ChatError::from_status(Some(400), None), ChatError::InvalidRequest);
        assert_eq!(ChatError::from_status(Some(401), None), ChatError::Unauthenticated);
        assert_eq!(
            ChatError::from_status(Some(402), None),
            ChatError::InsufficientCredits
        );
        assert_eq!(ChatError::from_status(Some(429), None), ChatError::RateLimited);
        assert_eq!(ChatError::from_status(Some(503), None), ChatError::Unavailable);
        assert!(matches!(
            ChatError::from_status(Some(500), None),
            ChatError::Other {
                status: Some(500),
                ..
            }
        ));
    }

    #[test]
    fn error_code_alone_is_enough() {
        assert_eq!(
            ChatError::from_status(Some(403), Some("auth_required")),
            ChatError::Unauthenticated
        );
        assert_eq!(
            ChatError::from_status(None, Some("chatbot_unavailable")),
            ChatError::Unavailable
        );
    }

    #[test]
    fn only_cancellation_is_hidden() {
        assert!(!ChatError::Canceled.is_user_visible());
        assert!(ChatError::RateLimited.is_user_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn new_send_cancels_previous() {
        LocalSet::new()
            .run_until(async {
                let session = Rc::new(ChatSession::new(FakeChat, NoticeBus::new()));
                let first = tokio::task::spawn_local({
                    let session = Rc::clone(&session);
                    async move { session.send("slow").await }
                });
                tokio::task::yield_now().await;

                let second = session.send("hello").await;

                assert_eq!(first.await.unwrap(), Err(ChatError::Canceled));
                assert_eq!(second.unwrap().answer, "re: hello");
                assert!(!session.is_sending());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_cancel_resolves_as_canceled() {
        LocalSet::new()
            .run_until(async {
                let session = Rc::new(ChatSession::new(FakeChat, NoticeBus::new()));
                let pending = tokio::task::spawn_local({
                    let session = Rc::clone(&session);
                    async move { session.send("slow").await }
                });
                tokio::task::yield_now().await;
                assert!(session.is_sending());

                session.cancel();

                assert_eq!(pending.await.unwrap(), Err(ChatError::Canceled));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn unauthenticated_publishes_login_required() {
        let bus = NoticeBus::new();
        let mut notices = bus.subscribe();
        let session = ChatSession::new(FakeChat, bus);

        let result = session.send("unauthorized").await;

        assert_eq!(result, Err(ChatError::Unauthenticated));
        assert_eq!(notices.try_recv().unwrap(), Notice::LoginRequired);
    }

    #[tokio::test(start_paused = true)]
    async fn generic_failure_publishes_nothing() {
        let bus = NoticeBus::new();
        let mut notices = bus.subscribe();
        let session = ChatSession::new(FakeChat, bus);

        assert!(session.send("broke").await.is_err());
        assert!(notices.try_recv().is_err());
    }
}
