use sc_core::{
    ConversionSettings, HostNode, MemoryHost, NodeKind, Paint, convert_selection,
};
use sc_transport::{
    ArtifactReceiver, ConversionData, ConversionMeta, HtmlPreview, MessageSender, PreviewSize,
    SolidColorEntry,
};
use serde_json::json;
use tokio::sync::mpsc;

/// Build the live-handle tree for a raw document fixture.
fn handles_from(value: &serde_json::Value) -> HostNode {
    let id = value["id"].as_str().unwrap_or_default();
    let name = value["name"].as_str().unwrap_or_default();
    let kind = value["type"].as_str().unwrap_or("FRAME");
    let children = value["children"]
        .as_array()
        .map(|list| list.iter().map(handles_from).collect())
        .unwrap_or_default();
    HostNode::new(id, name, kind).with_children(children)
}

#[tokio::main]
async fn main() {
    env_logger::init();

    // A small card selection, served from an in-memory host. The badge
    // fill is bound to a design-system variable.
    let document = json!({
        "id": "10:0", "name": "Card", "type": "FRAME",
        "absoluteBoundingBox": { "x": 100.0, "y": 80.0, "width": 320.0, "height": 180.0 },
        "children": [
            {
                "id": "10:1", "name": "Badge", "type": "RECTANGLE",
                "absoluteBoundingBox": { "x": 120.0, "y": 100.0, "width": 48.0, "height": 24.0 },
                "cornerRadius": 12.0,
                "fills": [{
                    "type": "SOLID",
                    "color": { "r": 0.13, "g": 0.45, "b": 0.87, "a": 1.0 },
                    "boundVariables": { "color": { "id": "VariableID:7:1" } }
                }]
            },
            {
                "id": "10:2", "name": "Title", "type": "TEXT",
                "absoluteBoundingBox": { "x": 120.0, "y": 140.0, "width": 280.0, "height": 32.0 },
                "characters": "Quarterly report",
                "style": { "fontFamily": "Inter", "fontSize": 24.0 }
            }
        ]
    });

    let root = handles_from(&document);
    let host = MemoryHost::new()
        .with_export("10:0", json!({ "document": document }))
        .with_variable("VariableID:7:1", "Brand/Primary");

    let settings = ConversionSettings::default();
    let conversion = convert_selection(&host, &[root], &settings).await;
    println!(
        "✓ converted {} nodes ({} warnings)",
        conversion.tree.node_count(),
        conversion.warnings.len()
    );

    // Stand-in generator: the normalized forest pretty-printed as JSON.
    let forest = match conversion.tree.to_value() {
        Ok(value) => value,
        Err(e) => {
            eprintln!("SERIALIZE ERROR: {e}");
            return;
        }
    };
    let code = serde_json::to_string_pretty(&forest).unwrap_or_default();

    // Color panel: every visible solid fill in the forest, with the
    // resolved variable name when one was bound.
    let mut colors = Vec::new();
    for node in conversion.tree.graph.node_weights() {
        for paint in &node.fills {
            if let Paint::Solid(solid) = paint
                && solid.visible
            {
                colors.push(SolidColorEntry {
                    hex: solid.color.to_hex_rgb(),
                    color_name: solid.variable_color_name.clone(),
                });
            }
        }
    }

    let preview = HtmlPreview {
        size: PreviewSize {
            width: 320.0,
            height: 180.0,
        },
        content: format!(
            "<div style=\"width:320px;height:180px\"><!-- {} top-level nodes --></div>",
            conversion.tree.roots.len()
        ),
    };

    // Ship it over the in-process channel, chunking anything over 256
    // bytes so the chunk path is visible in the logs.
    let (tx, mut rx) = mpsc::unbounded_channel();
    let sender = MessageSender::new(tx).with_chunk_limit(256);
    sender.conversion_start();
    sender.conversion_complete(ConversionData {
        code,
        meta: ConversionMeta {
            settings,
            warnings: conversion.warnings,
            colors,
            gradients: Vec::new(),
            html_preview: Some(preview),
            preview_chunked: false,
        },
    });
    drop(sender);

    let mut receiver = ArtifactReceiver::new();
    receiver.run(&mut rx).await;

    let state = receiver.state();
    println!("✓ received {} bytes of generated code", state.code.len());
    println!(
        "✓ preview {}×{} ({} bytes)",
        state.html_preview.size.width,
        state.html_preview.size.height,
        state.html_preview.content.len()
    );
    for color in &state.colors {
        match &color.color_name {
            Some(name) => println!("  color {} → {name}", color.hex),
            None => println!("  color {}", color.hex),
        }
    }
    for node in conversion.tree.graph.node_weights() {
        if matches!(node.kind, NodeKind::Text(_)) {
            println!("  text node \"{}\"", node.unique_name);
        }
    }
}
