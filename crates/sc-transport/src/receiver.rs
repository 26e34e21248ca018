//! Display-side half of the transport.
//!
//! [`ArtifactReceiver`] owns the derived view state and the reassembly
//! machinery for both channels. Messages mutate exactly [`ViewState`];
//! everything else (slot arrays, the dual-channel pending holder) is
//! private plumbing that never leaks into what the display renders.
//!
//! When a transfer splits across both channels — chunked code whose
//! preview is also chunked — neither artifact is shown alone: whichever
//! finishes first parks in the pending holder and the combined update
//! lands atomically once the other completes.

use crate::assembly::ChunkAssembler;
use crate::message::{
    ConversionData, ConversionMeta, GradientEntry, HtmlPreview, PreviewSize, SolidColorEntry,
    UiMessage,
};
use sc_core::{ConversionSettings, ConversionWarning};
use tokio::sync::mpsc;

/// Everything the display renders, updated only by [`ArtifactReceiver`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    /// Generated code, or the error placeholder after a failed run.
    pub code: String,
    pub html_preview: HtmlPreview,
    /// Settings echoed by the conversion side; `None` until the first
    /// payload arrives.
    pub settings: Option<ConversionSettings>,
    pub warnings: Vec<ConversionWarning>,
    pub colors: Vec<SolidColorEntry>,
    pub gradients: Vec<GradientEntry>,
    pub loading: bool,
    pub has_selection: bool,
}

/// Holds whichever artifact of a dual-channel transfer lands first.
#[derive(Debug, Default)]
struct PendingJoin {
    meta: ConversionMeta,
    code: Option<String>,
    preview: Option<HtmlPreview>,
}

/// Receiving state machine for the conversion → display channel.
#[derive(Debug, Default)]
pub struct ArtifactReceiver {
    state: ViewState,

    code: ChunkAssembler,
    /// Metadata from the active code header, consumed at its "end".
    code_meta: Option<ConversionMeta>,

    preview: ChunkAssembler,
    /// Size from the active preview header; the content arrives in chunks.
    preview_size: PreviewSize,

    /// Present only while a code header has announced a chunked preview.
    pending: Option<PendingJoin>,
}

impl ArtifactReceiver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Drain a channel until the sending side closes it.
    pub async fn run(&mut self, rx: &mut mpsc::UnboundedReceiver<UiMessage>) {
        while let Some(message) = rx.recv().await {
            self.apply(message);
        }
    }

    /// Apply one message to the view state.
    pub fn apply(&mut self, message: UiMessage) {
        match message {
            UiMessage::ConversionStart => {
                log::debug!("TRANSPORT conversion start, resetting collections");
                self.pending = None;
                self.code = ChunkAssembler::new();
                self.code_meta = None;
                self.preview = ChunkAssembler::new();
                self.state.code.clear();
                self.state.loading = true;
                self.state.has_selection = true;
            }

            UiMessage::Code(ConversionData { code, meta }) => {
                if meta.preview_chunked {
                    // The preview is still in flight on its own channel;
                    // park the code so both land together.
                    self.pending = Some(PendingJoin {
                        meta,
                        code: Some(code),
                        preview: None,
                    });
                } else {
                    self.apply_conversion(meta, code, None);
                }
            }

            UiMessage::CodeChunkStart(header) => {
                self.code.start(header.total_chunks);
                if header.meta.preview_chunked {
                    self.pending = Some(PendingJoin::default());
                }
                self.code_meta = Some(header.meta);
            }
            UiMessage::CodeChunk { index, chunk } => self.code.accept(index, chunk),
            UiMessage::CodeChunkEnd => {
                let Some(code) = self.code.end() else {
                    return;
                };
                let meta = self.code_meta.take().unwrap_or_default();
                if meta.preview_chunked {
                    let pending = self.pending.get_or_insert_with(PendingJoin::default);
                    pending.meta = meta;
                    pending.code = Some(code);
                    self.try_commit();
                } else {
                    self.apply_conversion(meta, code, None);
                }
            }

            UiMessage::PreviewChunkStart { total_chunks, size } => {
                self.preview.start(total_chunks);
                self.preview_size = size;
            }
            UiMessage::PreviewChunk { index, chunk } => self.preview.accept(index, chunk),
            UiMessage::PreviewChunkEnd => {
                let Some(content) = self.preview.end() else {
                    return;
                };
                let preview = HtmlPreview {
                    size: self.preview_size,
                    content,
                };
                if let Some(pending) = &mut self.pending {
                    pending.preview = Some(preview);
                    self.try_commit();
                } else {
                    // No code join expected: update the preview alone.
                    self.state.html_preview = preview;
                }
            }

            UiMessage::Empty => {
                self.state.code.clear();
                self.state.html_preview = HtmlPreview::default();
                self.state.warnings.clear();
                self.state.colors.clear();
                self.state.gradients.clear();
                self.state.loading = false;
                self.state.has_selection = false;
            }

            UiMessage::Error { error } => {
                log::warn!("TRANSPORT conversion error: {error}");
                self.state.colors.clear();
                self.state.gradients.clear();
                self.state.code = format!("Error :(\n// {error}");
                self.state.loading = false;
            }

            UiMessage::PluginSettingsChanged { settings } => {
                self.state.settings = Some(settings);
            }
        }
    }

    /// Apply the parked dual-channel update once both halves are present.
    fn try_commit(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        match pending {
            PendingJoin {
                meta,
                code: Some(code),
                preview: preview @ Some(_),
            } => self.apply_conversion(meta, code, preview),
            incomplete => self.pending = Some(incomplete),
        }
    }

    /// One finished conversion replaces the derived view state wholesale.
    /// The preview only changes when this payload actually carries one.
    fn apply_conversion(
        &mut self,
        meta: ConversionMeta,
        code: String,
        preview: Option<HtmlPreview>,
    ) {
        self.state.code = code;
        self.state.settings = Some(meta.settings);
        self.state.warnings = meta.warnings;
        self.state.colors = meta.colors;
        self.state.gradients = meta.gradients;
        if let Some(preview) = preview.or(meta.html_preview) {
            self.state.html_preview = preview;
        }
        self.state.loading = false;
        self.state.has_selection = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::CodeChunkHeader;
    use pretty_assertions::assert_eq;

    fn chunked_code(meta: ConversionMeta, chunks: &[&str]) -> Vec<UiMessage> {
        let mut messages = vec![UiMessage::CodeChunkStart(CodeChunkHeader {
            total_chunks: chunks.len(),
            meta,
        })];
        messages.extend(chunks.iter().enumerate().map(|(index, chunk)| {
            UiMessage::CodeChunk {
                index,
                chunk: (*chunk).to_string(),
            }
        }));
        messages.push(UiMessage::CodeChunkEnd);
        messages
    }

    #[test]
    fn whole_code_message_applies_immediately() {
        let mut receiver = ArtifactReceiver::new();
        receiver.apply(UiMessage::ConversionStart);
        assert!(receiver.state().loading);

        receiver.apply(UiMessage::Code(ConversionData {
            code: "<div/>".into(),
            meta: ConversionMeta::default(),
        }));
        let state = receiver.state();
        assert_eq!(state.code, "<div/>");
        assert!(!state.loading);
        assert!(state.has_selection);
        assert!(state.settings.is_some());
    }

    #[test]
    fn chunked_code_without_preview_applies_at_end() {
        let mut receiver = ArtifactReceiver::new();
        for message in chunked_code(ConversionMeta::default(), &["<ma", "in>", "</main>"]) {
            receiver.apply(message);
        }
        assert_eq!(receiver.state().code, "<main></main>");
        assert!(!receiver.state().loading);
    }

    #[test]
    fn preview_end_before_code_end_withholds_the_combined_update() {
        let meta = ConversionMeta {
            preview_chunked: true,
            ..ConversionMeta::default()
        };
        let mut receiver = ArtifactReceiver::new();
        receiver.apply(UiMessage::ConversionStart);
        receiver.apply(UiMessage::CodeChunkStart(CodeChunkHeader {
            total_chunks: 2,
            meta,
        }));
        receiver.apply(UiMessage::PreviewChunkStart {
            total_chunks: 1,
            size: PreviewSize {
                width: 320.0,
                height: 240.0,
            },
        });
        receiver.apply(UiMessage::PreviewChunk {
            index: 0,
            chunk: "<p>preview</p>".into(),
        });
        receiver.apply(UiMessage::PreviewChunkEnd);

        assert_eq!(
            receiver.state().code,
            "",
            "the preview finished first and must wait for the code"
        );
        assert_eq!(receiver.state().html_preview.content, "");
        assert!(receiver.state().loading);

        receiver.apply(UiMessage::CodeChunk {
            index: 1,
            chunk: "b".into(),
        });
        receiver.apply(UiMessage::CodeChunk {
            index: 0,
            chunk: "a".into(),
        });
        receiver.apply(UiMessage::CodeChunkEnd);

        let state = receiver.state();
        assert_eq!(state.code, "ab");
        assert_eq!(state.html_preview.content, "<p>preview</p>");
        assert_eq!(state.html_preview.size.width, 320.0);
        assert!(!state.loading, "both halves landed together");
    }

    #[test]
    fn code_end_before_preview_end_parks_the_code() {
        let meta = ConversionMeta {
            preview_chunked: true,
            ..ConversionMeta::default()
        };
        let mut receiver = ArtifactReceiver::new();
        for message in chunked_code(meta, &["let x;"]) {
            receiver.apply(message);
        }
        assert_eq!(receiver.state().code, "", "code waits for the preview");

        receiver.apply(UiMessage::PreviewChunkStart {
            total_chunks: 1,
            size: PreviewSize::default(),
        });
        receiver.apply(UiMessage::PreviewChunk {
            index: 0,
            chunk: "<svg/>".into(),
        });
        receiver.apply(UiMessage::PreviewChunkEnd);

        assert_eq!(receiver.state().code, "let x;");
        assert_eq!(receiver.state().html_preview.content, "<svg/>");
    }

    #[test]
    fn whole_code_with_chunked_preview_joins_too() {
        let mut receiver = ArtifactReceiver::new();
        receiver.apply(UiMessage::Code(ConversionData {
            code: "short".into(),
            meta: ConversionMeta {
                preview_chunked: true,
                ..ConversionMeta::default()
            },
        }));
        assert_eq!(receiver.state().code, "", "whole code still joins the preview");

        receiver.apply(UiMessage::PreviewChunkStart {
            total_chunks: 1,
            size: PreviewSize::default(),
        });
        receiver.apply(UiMessage::PreviewChunk {
            index: 0,
            chunk: "<big/>".into(),
        });
        receiver.apply(UiMessage::PreviewChunkEnd);
        assert_eq!(receiver.state().code, "short");
        assert_eq!(receiver.state().html_preview.content, "<big/>");
    }

    #[test]
    fn lone_preview_transfer_updates_only_the_preview() {
        let mut receiver = ArtifactReceiver::new();
        receiver.apply(UiMessage::Code(ConversionData {
            code: "kept".into(),
            meta: ConversionMeta::default(),
        }));

        receiver.apply(UiMessage::PreviewChunkStart {
            total_chunks: 1,
            size: PreviewSize::default(),
        });
        receiver.apply(UiMessage::PreviewChunk {
            index: 0,
            chunk: "<aside/>".into(),
        });
        receiver.apply(UiMessage::PreviewChunkEnd);

        assert_eq!(receiver.state().code, "kept", "code untouched by a preview-only update");
        assert_eq!(receiver.state().html_preview.content, "<aside/>");
    }

    #[test]
    fn orphaned_chunk_traffic_changes_nothing() {
        let mut receiver = ArtifactReceiver::new();
        receiver.apply(UiMessage::CodeChunk {
            index: 0,
            chunk: "stray".into(),
        });
        receiver.apply(UiMessage::CodeChunkEnd);
        receiver.apply(UiMessage::PreviewChunkEnd);
        assert_eq!(receiver.state(), &ViewState::default());
    }

    #[test]
    fn conversion_start_discards_a_stale_collection() {
        let mut receiver = ArtifactReceiver::new();
        receiver.apply(UiMessage::CodeChunkStart(CodeChunkHeader {
            total_chunks: 2,
            meta: ConversionMeta::default(),
        }));
        receiver.apply(UiMessage::CodeChunk {
            index: 0,
            chunk: "stale".into(),
        });

        // The transfer never ends; a new conversion begins instead.
        receiver.apply(UiMessage::ConversionStart);
        for message in chunked_code(ConversionMeta::default(), &["fresh"]) {
            receiver.apply(message);
        }
        assert_eq!(receiver.state().code, "fresh");
    }

    #[test]
    fn empty_clears_derived_state_but_keeps_settings() {
        let mut receiver = ArtifactReceiver::new();
        receiver.apply(UiMessage::Code(ConversionData {
            code: "<div/>".into(),
            meta: ConversionMeta {
                colors: vec![SolidColorEntry {
                    hex: "#102030".into(),
                    color_name: None,
                }],
                ..ConversionMeta::default()
            },
        }));
        receiver.apply(UiMessage::Empty);

        let state = receiver.state();
        assert_eq!(state.code, "");
        assert!(state.colors.is_empty());
        assert!(!state.has_selection);
        assert!(state.settings.is_some(), "settings survive a cleared selection");
    }

    #[test]
    fn error_replaces_code_and_clears_color_panels() {
        let mut receiver = ArtifactReceiver::new();
        receiver.apply(UiMessage::Code(ConversionData {
            code: "<div/>".into(),
            meta: ConversionMeta {
                colors: vec![SolidColorEntry::default()],
                gradients: vec![GradientEntry::default()],
                html_preview: Some(HtmlPreview {
                    content: "<p/>".into(),
                    ..HtmlPreview::default()
                }),
                ..ConversionMeta::default()
            },
        }));
        receiver.apply(UiMessage::Error {
            error: "node export failed".into(),
        });

        let state = receiver.state();
        assert_eq!(state.code, "Error :(\n// node export failed");
        assert!(state.colors.is_empty());
        assert!(state.gradients.is_empty());
        assert!(!state.loading);
        assert_eq!(
            state.html_preview.content, "<p/>",
            "the last good preview stays visible behind the error"
        );
    }

    #[test]
    fn settings_round_trip_into_the_view() {
        let mut receiver = ArtifactReceiver::new();
        let settings = ConversionSettings {
            embed_vectors: true,
            ..ConversionSettings::default()
        };
        receiver.apply(UiMessage::PluginSettingsChanged {
            settings: settings.clone(),
        });
        assert_eq!(receiver.state().settings.as_ref(), Some(&settings));
    }
}
