//! Tests for the block model, its JSON form and the layout rules

use block_engine::{
    Attributes, Block, BlockGeometry, BlockKind, BlockTemplate, GridMetrics, GridSettings, ShapeKind, SurfaceKind, SurfaceSnapshot, grid, layout,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn three_blocks() -> Vec<Block> {
    vec![
        Block::new("a", BlockKind::Section, 0, 0, 12, 4).with_layer(1),
        Block::new("b", BlockKind::Shape { shape: ShapeKind::Circle }, 2, 2, 4, 4).with_layer(2),
        Block::new("c", BlockKind::Textbox, 3, 3, 6, 2).with_layer(3),
    ]
}

// ============================================================================
// JSON form
// ============================================================================

#[test]
fn test_snapshot_json_shape() {
    let snapshot = SurfaceSnapshot::for_surface(SurfaceKind::Content)
        .with_blocks(vec![Block::new("shape-1", BlockKind::Shape { shape: ShapeKind::Triangle }, 1, 2, 3, 4).with_layer(5)]);
    let value = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(value["gridSettings"]["rows"], json!(24));
    assert_eq!(value["gridSettings"]["horizontalMargin"], json!(8));
    assert_eq!(value["blocks"][0]["id"], json!("shape-1"));
    assert_eq!(value["blocks"][0]["layer"], json!(5));
    assert_eq!(value["blocks"][0]["kind"], json!({ "type": "shape", "shape": "triangle" }));

    let back: SurfaceSnapshot = serde_json::from_value(value).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn test_textbox_content_survives_json() {
    let block = BlockTemplate::textbox("Grüße, \"world\"\n").build("textbox-1", 1, &GridSettings::default());
    let json = serde_json::to_string(&block).unwrap();
    let back: Block = serde_json::from_str(&json).unwrap();
    assert_eq!(back.content(), Some("Grüße, \"world\"\n"));
    assert_eq!(back, block);
}

#[test]
fn test_minimal_block_json_uses_defaults() {
    let block: Block = serde_json::from_value(json!({ "id": "x", "x": 1, "y": 1, "w": 1, "h": 1 })).unwrap();
    assert_eq!(block.layer, 0);
    assert_eq!(block.kind, BlockKind::Section);
    assert!(block.attributes.is_empty());
}

#[test]
fn test_unknown_attributes_are_kept() {
    let block: Block = serde_json::from_value(json!({
        "id": "x", "x": 0, "y": 0, "w": 2, "h": 2,
        "attributes": { "fontFamily": "Inter", "shadow": { "blur": 4, "color": "#0008" } }
    }))
    .unwrap();
    let value = serde_json::to_value(&block).unwrap();
    assert_eq!(value["attributes"]["shadow"]["blur"], json!(4));
    assert_eq!(value["attributes"]["fontFamily"], json!("Inter"));
}

#[test]
fn test_passthrough_grid_fields() {
    let settings: GridSettings = serde_json::from_value(json!({
        "rows": 8, "columns": 6, "horizontalMargin": 4, "verticalMargin": 2, "padding": 0,
        "fillScreenHeight": true, "contentWidth": 1200, "alignment": "left"
    }))
    .unwrap();
    assert!(settings.fill_screen_height);
    assert_eq!(settings.content_width, Some(1200));

    // content width does not constrain the grid
    assert_eq!(GridMetrics::new(&settings, 600).cell_size, (600 - 5 * 4) / 6);
}

// ============================================================================
// Layout rules
// ============================================================================

#[test]
fn test_overlap_is_allowed_and_resolved_by_layer() {
    let blocks = three_blocks();
    assert!(blocks[1].overlaps(&blocks[2]));

    let snapshot = SurfaceSnapshot::default().with_blocks(blocks);
    assert_eq!(snapshot.block_at(3, 3).map(|b| b.id.as_str()), Some("c"));
    assert_eq!(snapshot.block_at(2, 2).map(|b| b.id.as_str()), Some("b"));
    assert_eq!(snapshot.block_at(0, 0).map(|b| b.id.as_str()), Some("a"));
    assert_eq!(snapshot.block_at(20, 20), None);
}

#[test]
fn test_paint_order_ties_keep_list_order() {
    let blocks = vec![
        Block::new("first", BlockKind::Section, 0, 0, 1, 1).with_layer(2),
        Block::new("low", BlockKind::Section, 0, 0, 1, 1).with_layer(-1),
        Block::new("second", BlockKind::Section, 0, 0, 1, 1).with_layer(2),
    ];
    let order: Vec<&str> = layout::paint_order(&blocks).iter().map(|b| b.id.as_str()).collect();
    assert_eq!(order, vec!["low", "first", "second"]);
}

#[test]
fn test_delete_keeps_layers() {
    let blocks = layout::remove_block(&three_blocks(), "b").unwrap();
    let layers: Vec<i32> = blocks.iter().map(|b| b.layer).collect();
    assert_eq!(layers, vec![1, 3]);
    assert_eq!(layout::next_layer(&blocks), 4);
}

#[test]
fn test_merge_geometry_clamps_every_block() {
    let incoming = vec![
        BlockGeometry::new("a", 0, -3, 12, 4),
        BlockGeometry::new("b", 20, 22, 4, 4),
        BlockGeometry::new("c", 3, 3, 6, 30),
    ];
    let merged = layout::merge_geometry(&three_blocks(), &incoming, 24);
    let ys: Vec<i32> = merged.iter().map(|b| b.y).collect();
    assert_eq!(ys, vec![0, 20, -6]);

    // horizontal overflow is reported, not corrected
    assert_eq!(layout::horizontal_overflow(&merged, 12).len(), 1);
    assert_eq!(merged[1].x, 20);
}

#[test]
fn test_vertical_clamp_formula() {
    assert_eq!(grid::clamp_y(-5, 3, 10), 0);
    assert_eq!(grid::clamp_y(9, 4, 10), 6);
    assert_eq!(grid::clamp_y(0, 10, 10), 0);
}

#[test]
fn test_attribute_merge_removes_nulls() {
    let mut attributes = Attributes::new().with("color", "red").with("border", 1);
    attributes.merge(&Attributes::try_from(json!({ "color": null, "shadow": "sm" })).unwrap());
    assert!(!attributes.contains_key("color"));
    assert_eq!(attributes.get_str("shadow"), Some("sm"));
    assert_eq!(attributes.len(), 2);
}
