use axum::extract::ws::{CloseFrame, Message as Frame, Utf8Bytes};
use bytes::Bytes;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Binary,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Text => write!(f, "text"),
            MessageKind::Binary => write!(f, "binary"),
        }
    }
}

/// An opaque data message: payload bytes plus the kind tag negotiated by the
/// transport. Only text and binary frames ever become a `Message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message(Frame);

impl Message {
    pub fn text(payload: impl Into<Utf8Bytes>) -> Self {
        Self(Frame::Text(payload.into()))
    }

    pub fn binary(payload: impl Into<Bytes>) -> Self {
        Self(Frame::Binary(payload.into()))
    }

    pub fn kind(&self) -> MessageKind {
        match self.0 {
            Frame::Text(_) => MessageKind::Text,
            _ => MessageKind::Binary,
        }
    }

    pub fn payload(&self) -> &[u8] {
        match &self.0 {
            Frame::Text(text) => text.as_str().as_bytes(),
            Frame::Binary(data) => data.as_ref(),
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.payload().len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload().is_empty()
    }

    pub fn into_frame(self) -> Frame {
        self.0
    }
}

/// What a single successful read off the channel produced.
#[derive(Debug)]
pub enum Inbound {
    Data(Message),
    /// Ping/pong; the transport answers pings itself.
    Control,
    Close(Option<CloseFrame>),
}

impl From<Frame> for Inbound {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(_) | Frame::Binary(_) => Inbound::Data(Message(frame)),
            Frame::Close(close) => Inbound::Close(close),
            Frame::Ping(_) | Frame::Pong(_) => Inbound::Control,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_keeps_kind_and_bytes() {
        let msg = Message::text("hello");
        assert_eq!(msg.kind(), MessageKind::Text);
        assert_eq!(msg.payload(), b"hello");
        assert_eq!(msg.into_frame(), Frame::Text("hello".into()));
    }

    #[test]
    fn binary_keeps_kind_and_bytes() {
        let msg = Message::binary(vec![0x01, 0x02]);
        assert_eq!(msg.kind(), MessageKind::Binary);
        assert_eq!(msg.len(), 2);
        assert_eq!(msg.into_frame(), Frame::Binary(Bytes::from_static(&[0x01, 0x02])));
    }

    #[test]
    fn classifies_inbound_frames() {
        assert!(matches!(
            Inbound::from(Frame::Binary(Bytes::from_static(&[7]))),
            Inbound::Data(m) if m.kind() == MessageKind::Binary
        ));
        assert!(matches!(
            Inbound::from(Frame::Ping(Bytes::from_static(&[1]))),
            Inbound::Control
        ));
        assert!(matches!(Inbound::from(Frame::Pong(Bytes::new())), Inbound::Control));
        assert!(matches!(Inbound::from(Frame::Close(None)), Inbound::Close(None)));
    }

    #[test]
    fn empty_text_is_still_data() {
        match Inbound::from(Frame::Text(Utf8Bytes::from_static(""))) {
            Inbound::Data(msg) => assert!(msg.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn kind_display() {
        assert_eq!(MessageKind::Text.to_string(), "text");
        assert_eq!(MessageKind::Binary.to_string(), "binary");
    }
}
