use tokio_tungstenite::tungstenite::Message;

/// A signaling message as it travels through the relay.
///
/// The relay never looks inside: session descriptions and ICE candidates are
/// the peers' business. Only the frame kind is kept so a text frame leaves the
/// relay as a text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    /// Convert an inbound WebSocket frame into a payload.
    ///
    /// Control frames (ping, pong, close) are handled by the transport and
    /// yield `None`.
    pub fn from_message(message: Message) -> Option<Payload> {
        match message {
            Message::Text(text) => Some(Payload::Text(text)),
            Message::Binary(data) => Some(Payload::Binary(data)),
            Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
        }
    }

    pub fn into_message(self) -> Message {
        match self {
            Payload::Text(text) => Message::Text(text),
            Payload::Binary(data) => Message::Binary(data),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Payload::Text(text) => text.len(),
            Payload::Binary(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}
