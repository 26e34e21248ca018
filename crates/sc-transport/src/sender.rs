//! Conversion-side half of the transport.
//!
//! Small payloads go out as one whole-artifact message. Anything over the
//! chunk limit is split on character boundaries and sent as a
//! start/chunk/end sequence; code and preview each have their own channel.
//! Sending is fire-and-forget: the receiver has no way to reply, and a
//! closed channel only means the display side went away.

use crate::message::{CodeChunkHeader, ConversionData, HtmlPreview, UiMessage};
use sc_core::ConversionSettings;
use tokio::sync::mpsc;

/// Default per-message payload ceiling, in bytes.
///
/// Matches the conservative limit the display boundary tolerates for one
/// message; anything bigger is chunked.
pub const DEFAULT_CHUNK_LIMIT: usize = 500_000;

/// Splits a payload into chunks of at most `limit` bytes without cutting
/// a UTF-8 character. A chunk may exceed `limit` only when a single
/// character does.
pub fn split_chunks(payload: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = payload;
    while rest.len() > limit {
        let mut cut = limit;
        while cut > 0 && !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            cut = rest.chars().next().map(char::len_utf8).unwrap_or(rest.len());
        }
        let (head, tail) = rest.split_at(cut);
        chunks.push(head.to_string());
        rest = tail;
    }
    chunks.push(rest.to_string());
    chunks
}

/// Conversion-side message sender over an in-process channel.
#[derive(Debug, Clone)]
pub struct MessageSender {
    tx: mpsc::UnboundedSender<UiMessage>,
    chunk_limit: usize,
}

impl MessageSender {
    pub fn new(tx: mpsc::UnboundedSender<UiMessage>) -> Self {
        Self {
            tx,
            chunk_limit: DEFAULT_CHUNK_LIMIT,
        }
    }

    /// Override the chunk limit. Mostly for tests; the default suits the
    /// real display boundary.
    #[must_use]
    pub fn with_chunk_limit(mut self, chunk_limit: usize) -> Self {
        self.chunk_limit = chunk_limit.max(1);
        self
    }

    pub fn send(&self, message: UiMessage) {
        if self.tx.send(message).is_err() {
            log::debug!("TRANSPORT receiver gone, dropping message");
        }
    }

    pub fn conversion_start(&self) {
        self.send(UiMessage::ConversionStart);
    }

    pub fn empty(&self) {
        self.send(UiMessage::Empty);
    }

    pub fn error(&self, error: impl Into<String>) {
        self.send(UiMessage::Error {
            error: error.into(),
        });
    }

    pub fn settings_changed(&self, settings: ConversionSettings) {
        self.send(UiMessage::PluginSettingsChanged { settings });
    }

    /// Ship a finished conversion, chunking whichever artifacts are over
    /// the limit.
    ///
    /// An oversized preview is pulled out of the metadata and sent over
    /// the preview channel, with `preview_chunked` set so the receiver
    /// joins the two channels atomically. A small preview stays inline.
    pub fn conversion_complete(&self, data: ConversionData) {
        let ConversionData { code, mut meta } = data;

        let oversized_preview = match meta.html_preview.take() {
            Some(preview) if preview.content.len() > self.chunk_limit => Some(preview),
            inline => {
                meta.html_preview = inline;
                None
            }
        };
        meta.preview_chunked = oversized_preview.is_some();

        if code.len() > self.chunk_limit {
            let chunks = split_chunks(&code, self.chunk_limit);
            log::debug!("TRANSPORT sending code as {} chunks", chunks.len());
            self.send(UiMessage::CodeChunkStart(CodeChunkHeader {
                total_chunks: chunks.len(),
                meta,
            }));
            for (index, chunk) in chunks.into_iter().enumerate() {
                self.send(UiMessage::CodeChunk { index, chunk });
            }
            self.send(UiMessage::CodeChunkEnd);
        } else {
            self.send(UiMessage::Code(ConversionData { code, meta }));
        }

        if let Some(HtmlPreview { size, content }) = oversized_preview {
            let chunks = split_chunks(&content, self.chunk_limit);
            log::debug!("TRANSPORT sending preview as {} chunks", chunks.len());
            self.send(UiMessage::PreviewChunkStart {
                total_chunks: chunks.len(),
                size,
            });
            for (index, chunk) in chunks.into_iter().enumerate() {
                self.send(UiMessage::PreviewChunk { index, chunk });
            }
            self.send(UiMessage::PreviewChunkEnd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ConversionMeta;
    use pretty_assertions::assert_eq;

    fn drain(rx: &mut mpsc::UnboundedReceiver<UiMessage>) -> Vec<UiMessage> {
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            out.push(message);
        }
        out
    }

    #[test]
    fn splitting_preserves_content_and_respects_the_limit() {
        let chunks = split_chunks("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
        assert_eq!(chunks.concat(), "abcdefghij");
    }

    #[test]
    fn splitting_never_cuts_a_character() {
        // Each arrow is 3 bytes; a 4-byte limit must back off to 3.
        let payload = "→→→→";
        let chunks = split_chunks(payload, 4);
        for chunk in &chunks {
            assert!(chunk.is_char_boundary(chunk.len()));
            assert!(!chunk.is_empty());
        }
        assert_eq!(chunks.concat(), payload);

        // A limit below one character still makes progress.
        let tiny = split_chunks("→→", 1);
        assert_eq!(tiny, vec!["→", "→"]);
    }

    #[test]
    fn small_payloads_become_one_chunk() {
        assert_eq!(split_chunks("hi", 100), vec!["hi"]);
        assert_eq!(split_chunks("", 100), vec![""]);
    }

    #[tokio::test]
    async fn small_artifacts_ship_as_one_message() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sender = MessageSender::new(tx).with_chunk_limit(100);
        sender.conversion_complete(ConversionData {
            code: "<div/>".into(),
            meta: ConversionMeta {
                html_preview: Some(HtmlPreview {
                    content: "<p/>".into(),
                    ..HtmlPreview::default()
                }),
                ..ConversionMeta::default()
            },
        });

        let messages = drain(&mut rx);
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            UiMessage::Code(data) => {
                assert_eq!(data.code, "<div/>");
                assert!(!data.meta.preview_chunked);
                assert_eq!(
                    data.meta.html_preview.as_ref().map(|p| p.content.as_str()),
                    Some("<p/>"),
                    "a small preview rides inline"
                );
            }
            other => panic!("expected a whole-code message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn oversized_code_and_preview_chunk_on_their_own_channels() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sender = MessageSender::new(tx).with_chunk_limit(4);
        sender.conversion_complete(ConversionData {
            code: "0123456789".into(),
            meta: ConversionMeta {
                html_preview: Some(HtmlPreview {
                    content: "abcdefgh".into(),
                    ..HtmlPreview::default()
                }),
                ..ConversionMeta::default()
            },
        });

        let messages = drain(&mut rx);
        match &messages[0] {
            UiMessage::CodeChunkStart(header) => {
                assert_eq!(header.total_chunks, 3);
                assert!(header.meta.preview_chunked);
                assert_eq!(header.meta.html_preview, None, "oversized preview moves off the metadata");
            }
            other => panic!("expected a code start, got {other:?}"),
        }
        assert!(matches!(messages[4], UiMessage::CodeChunkEnd));
        assert!(matches!(
            messages[5],
            UiMessage::PreviewChunkStart { total_chunks: 2, .. }
        ));
        assert!(matches!(messages[8], UiMessage::PreviewChunkEnd));
        assert_eq!(messages.len(), 9);
    }

    #[tokio::test]
    async fn dropped_receiver_is_not_an_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let sender = MessageSender::new(tx);
        sender.conversion_start();
        sender.error("boom");
    }
}
