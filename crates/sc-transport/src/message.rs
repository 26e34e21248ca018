//! The message vocabulary shared by both sides of the transport.
//!
//! Serialized form is internally tagged (`"type"`) with camelCase tags and
//! fields, the shape the display side was built against. Oversized
//! artifacts travel as start/chunk/end sequences; everything else is a
//! single message.

use sc_core::{ConversionSettings, ConversionWarning};
use serde::{Deserialize, Serialize};

/// Fixed pixel size of a rendered preview.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PreviewSize {
    pub width: f32,
    pub height: f32,
}

/// Rendered preview markup plus the size it was laid out at.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HtmlPreview {
    pub size: PreviewSize,
    pub content: String,
}

/// One named solid color extracted from the conversion, for the display
/// side's color panel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolidColorEntry {
    pub hex: String,
    #[serde(default)]
    pub color_name: Option<String>,
}

/// One gradient extracted from the conversion, carried as its CSS form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientEntry {
    pub css_preview: String,
}

/// Artifact metadata that rides alongside generated code: the settings the
/// run used, its warnings, and the derived color/gradient panels. When the
/// preview is small it travels inline here; when it is chunked,
/// `preview_chunked` tells the receiver to hold the code until the preview
/// channel completes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionMeta {
    pub settings: ConversionSettings,
    pub warnings: Vec<ConversionWarning>,
    pub colors: Vec<SolidColorEntry>,
    pub gradients: Vec<GradientEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_preview: Option<HtmlPreview>,
    pub preview_chunked: bool,
}

/// A complete conversion artifact: the generated code plus its metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionData {
    pub code: String,
    #[serde(flatten)]
    pub meta: ConversionMeta,
}

/// Header of a chunked code transfer: the chunk count plus the metadata
/// that would otherwise ride on the whole-artifact message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeChunkHeader {
    pub total_chunks: usize,
    #[serde(flatten)]
    pub meta: ConversionMeta,
}

/// Everything the conversion side can post to the display side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum UiMessage {
    /// A conversion began; the display resets and shows a loading state.
    ConversionStart,
    /// Whole-artifact fallback when the code fits in one message.
    Code(ConversionData),
    CodeChunkStart(CodeChunkHeader),
    CodeChunk {
        index: usize,
        chunk: String,
    },
    CodeChunkEnd,
    PreviewChunkStart {
        total_chunks: usize,
        size: PreviewSize,
    },
    PreviewChunk {
        index: usize,
        chunk: String,
    },
    PreviewChunkEnd,
    /// Nothing is selected; derived display state clears.
    Empty,
    /// The run failed outside the per-node boundary.
    Error {
        error: String,
    },
    /// A preference change round-trips back to the display.
    PluginSettingsChanged {
        settings: ConversionSettings,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn tags_and_fields_are_camel_case_on_the_wire() {
        let start = UiMessage::CodeChunkStart(CodeChunkHeader {
            total_chunks: 3,
            meta: ConversionMeta::default(),
        });
        let value = serde_json::to_value(&start).unwrap();
        assert_eq!(value["type"], "codeChunkStart");
        assert_eq!(value["totalChunks"], 3);
        assert_eq!(value["previewChunked"], false);
        assert!(value.get("html_preview").is_none());
        assert!(value.get("htmlPreview").is_none(), "absent preview is omitted");

        let chunk = UiMessage::PreviewChunk {
            index: 1,
            chunk: "<div>".into(),
        };
        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value["type"], "previewChunk");
        assert_eq!(value["index"], 1);
        assert_eq!(value["chunk"], "<div>");
    }

    #[test]
    fn whole_code_message_flattens_its_metadata() {
        let message = UiMessage::Code(ConversionData {
            code: "<main></main>".into(),
            meta: ConversionMeta {
                colors: vec![SolidColorEntry {
                    hex: "#3366cc".into(),
                    color_name: Some("Brand-Primary".into()),
                }],
                ..ConversionMeta::default()
            },
        });
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "code");
        assert_eq!(value["code"], "<main></main>");
        assert_eq!(value["colors"][0]["hex"], "#3366cc");
        assert_eq!(value["colors"][0]["colorName"], "Brand-Primary");
        assert_eq!(value["settings"]["useColorVariables"], true);
    }

    #[test]
    fn wire_shape_round_trips() {
        let parsed: UiMessage = serde_json::from_value(json!({
            "type": "pluginSettingsChanged",
            "settings": { "embedVectors": true }
        }))
        .unwrap();
        match parsed {
            UiMessage::PluginSettingsChanged { settings } => {
                assert!(settings.embed_vectors);
                assert!(settings.use_color_variables, "missing fields fill defaults");
            }
            other => panic!("unexpected message {other:?}"),
        }

        let parsed: UiMessage =
            serde_json::from_value(json!({ "type": "codeChunkEnd" })).unwrap();
        assert_eq!(parsed, UiMessage::CodeChunkEnd);
    }
}
