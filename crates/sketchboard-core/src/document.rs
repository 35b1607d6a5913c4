//! Scene document exchanged with persistence and sync collaborators.

use crate::camera::{Camera, ZoomLimits};
use crate::scene::{ImageNode, Path, PathKind, Scene, TextNode};
use crate::tools::{DEFAULT_STROKE_COLOR, DEFAULT_STROKE_SCALE, DEFAULT_TEXT_FONT, ToolState};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::hash::Hash;
use thiserror::Error;

/// Document format version written by [`SceneDocument::capture`].
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid scene document JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scene document root is not a JSON object")]
    NotAnObject,
}

/// Serializable snapshot of a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    pub version: u32,
    pub exported_at: String,
    pub camera: Camera,
    pub paths: Vec<Path>,
    pub text_nodes: Vec<TextNode>,
    pub image_nodes: Vec<ImageNode>,
    pub stroke_color: String,
    pub stroke_scale: f64,
    /// `null` on the wire when no text scale has been chosen.
    pub default_text_scale: Option<f64>,
    pub default_text_font: String,
}

/// How [`Canvas::apply_scene`](crate::canvas::Canvas::apply_scene) treats
/// the current state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplyOptions {
    /// Keep the current camera and undo history.
    pub preserve_view: bool,
    /// Keep local items whose ids the incoming document does not know.
    pub merge_local: bool,
}

impl SceneDocument {
    /// Snapshot the scene, camera and tool defaults.
    pub fn capture(scene: &Scene, camera: &Camera, tools: &ToolState, exported_at: impl Into<String>) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            exported_at: exported_at.into(),
            camera: *camera,
            paths: scene.paths().to_vec(),
            text_nodes: scene.text_nodes().to_vec(),
            image_nodes: scene.image_nodes().to_vec(),
            stroke_color: tools.stroke_color.clone(),
            stroke_scale: tools.stroke_scale,
            default_text_scale: tools.default_text_scale,
            default_text_font: tools.default_text_font.clone(),
        }
    }

    /// Parse a document, coercing malformed fields instead of failing.
    ///
    /// Only unparsable JSON and a non-object root are errors.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a document from arbitrary JSON.
    ///
    /// Collections that are not arrays become empty, items that do not
    /// deserialize are dropped, degenerate curves become freehand paths and
    /// every scalar falls back to its default when missing or invalid.
    pub fn from_value(value: &Value) -> Result<Self, DocumentError> {
        let object = value.as_object().ok_or(DocumentError::NotAnObject)?;

        let paths = coerce_list::<Path>(object, "paths")
            .into_iter()
            .filter_map(normalize_path)
            .collect();

        Ok(Self {
            version: object
                .get("version")
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(DOCUMENT_VERSION),
            exported_at: object
                .get("exportedAt")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            camera: coerce_camera(object.get("camera")),
            paths,
            text_nodes: coerce_list(object, "textNodes"),
            image_nodes: coerce_list(object, "imageNodes"),
            stroke_color: object
                .get("strokeColor")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_STROKE_COLOR)
                .to_string(),
            stroke_scale: finite(object.get("strokeScale")).unwrap_or(DEFAULT_STROKE_SCALE),
            default_text_scale: coerce_text_scale(object),
            default_text_font: object
                .get("defaultTextFont")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|font| !font.is_empty())
                .unwrap_or(DEFAULT_TEXT_FONT)
                .to_string(),
        })
    }
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::capture(&Scene::new(), &Camera::default(), &ToolState::default(), String::new())
    }
}

fn finite(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|v| v.is_finite())
}

fn coerce_list<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Vec<T> {
    let Some(items) = object.get(key).and_then(Value::as_array) else {
        if object.get(key).is_some_and(|v| !v.is_null()) {
            log::warn!("scene document field `{key}` is not a list, treating it as empty");
        }
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match T::deserialize(item) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                log::warn!("dropping malformed `{key}` entry {index}: {err}");
                None
            }
        })
        .collect()
}

/// Downgrade curves with fewer than two nodes and re-derive curve points.
/// Paths left without points are dropped.
fn normalize_path(mut path: Path) -> Option<Path> {
    if path.kind == PathKind::Curve {
        match path.curve.take() {
            Some(curve) if curve.nodes.len() >= 2 => path.set_curve(curve),
            _ => {
                log::warn!("path {} has a degenerate curve, keeping it as freehand", path.id);
                path.kind = PathKind::Freehand;
            }
        }
    }
    if path.points.is_empty() {
        log::warn!("dropping path {} without points", path.id);
        return None;
    }
    Some(path)
}

fn coerce_camera(value: Option<&Value>) -> Camera {
    let Some(object) = value.and_then(Value::as_object) else {
        return Camera::default();
    };
    let default = Camera::default();
    let field = |key: &str, fallback: f64| finite(object.get(key)).unwrap_or(fallback);
    Camera {
        x: field("x", default.x),
        y: field("y", default.y),
        scale: field("scale", default.scale),
    }
    .sanitize(ZoomLimits::default())
}

/// Absent means 1, `null` means unset, anything else must be finite.
fn coerce_text_scale(object: &Map<String, Value>) -> Option<f64> {
    match object.get("defaultTextScale") {
        None => Some(1.0),
        Some(Value::Null) => None,
        Some(value) => Some(value.as_f64().filter(|v| v.is_finite()).unwrap_or(1.0)),
    }
}

/// Local items unknown to `remote` first, then every remote item.
pub fn merge_by_id<T: Clone, K: Eq + Hash>(remote: Vec<T>, local: &[T], id: impl Fn(&T) -> K) -> Vec<T> {
    if local.is_empty() {
        return remote;
    }
    let remote_ids: HashSet<K> = remote.iter().map(&id).collect();
    let mut merged: Vec<T> = local
        .iter()
        .filter(|item| !remote_ids.contains(&id(*item)))
        .cloned()
        .collect();
    merged.extend(remote);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{Curve, CurveNode};
    use crate::tools::StrokeStyle;
    use kurbo::Point;
    use serde_json::json;

    const EPS: f64 = 1e-9;

    fn stroke_json(x: f64) -> Value {
        let mut path = Path::stroke(&StrokeStyle::default(), Point::new(x, 0.0));
        path.points.push(Point::new(x + 10.0, 0.0));
        serde_json::to_value(path).unwrap()
    }

    #[test]
    fn test_non_list_collections_become_empty() {
        let doc = SceneDocument::from_value(&json!({
            "paths": "nope",
            "textNodes": 3,
            "imageNodes": { "a": 1 }
        }))
        .unwrap();
        assert!(doc.paths.is_empty());
        assert!(doc.text_nodes.is_empty());
        assert!(doc.image_nodes.is_empty());
        assert_eq!(doc.stroke_color, DEFAULT_STROKE_COLOR);
        assert!((doc.stroke_scale - DEFAULT_STROKE_SCALE).abs() < EPS);
        assert_eq!(doc.default_text_scale, Some(1.0));
        assert_eq!(doc.default_text_font, DEFAULT_TEXT_FONT);
    }

    #[test]
    fn test_malformed_items_are_dropped() {
        let doc = SceneDocument::from_value(&json!({
            "paths": [stroke_json(0.0), { "id": "not-a-uuid" }, stroke_json(20.0)]
        }))
        .unwrap();
        assert_eq!(doc.paths.len(), 2);
    }

    #[test]
    fn test_degenerate_curve_downgraded() {
        let mut value = stroke_json(0.0);
        value["pathKind"] = json!("curve");
        value["curve"] = json!({ "nodes": [{ "anchor": { "x": 0.0, "y": 0.0 } }] });
        let doc = SceneDocument::from_value(&json!({ "paths": [value] })).unwrap();
        assert_eq!(doc.paths[0].kind, PathKind::Freehand);
        assert!(doc.paths[0].curve.is_none());
        assert_eq!(doc.paths[0].points.len(), 2);
    }

    #[test]
    fn test_curve_points_rederived() {
        let style = StrokeStyle::default();
        let mut path = Path::curve(&style, Point::ZERO, Point::new(100.0, 0.0));
        path.points = vec![Point::new(999.0, 999.0)];
        path.curve = Some(Curve::new(vec![
            CurveNode::corner(Point::ZERO),
            CurveNode::corner(Point::new(50.0, 50.0)),
        ]));
        let doc = SceneDocument::from_value(&json!({ "paths": [path] })).unwrap();
        let expected = doc.paths[0].curve.as_ref().unwrap().sample();
        assert_eq!(doc.paths[0].points, expected);
    }

    #[test]
    fn test_text_scale_and_font_coercion() {
        let unset = SceneDocument::from_value(&json!({ "defaultTextScale": null })).unwrap();
        assert_eq!(unset.default_text_scale, None);
        let kept = SceneDocument::from_value(&json!({ "defaultTextScale": 1.5 })).unwrap();
        assert_eq!(kept.default_text_scale, Some(1.5));
        let junk = SceneDocument::from_value(&json!({ "defaultTextScale": "big" })).unwrap();
        assert_eq!(junk.default_text_scale, Some(1.0));

        let font = SceneDocument::from_value(&json!({ "defaultTextFont": "  Georgia " })).unwrap();
        assert_eq!(font.default_text_font, "Georgia");
        let blank = SceneDocument::from_value(&json!({ "defaultTextFont": "   " })).unwrap();
        assert_eq!(blank.default_text_font, DEFAULT_TEXT_FONT);
    }

    #[test]
    fn test_camera_coercion() {
        let doc = SceneDocument::from_value(&json!({
            "camera": { "x": "left", "y": 40.0, "scale": 99.0 }
        }))
        .unwrap();
        assert!((doc.camera.x - 0.0).abs() < EPS);
        assert!((doc.camera.y - 40.0).abs() < EPS);
        assert!((doc.camera.scale - 4.0).abs() < EPS);

        let missing = SceneDocument::from_value(&json!({ "camera": 5 })).unwrap();
        assert_eq!(missing.camera, Camera::default());
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(matches!(
            SceneDocument::from_value(&json!([1, 2])),
            Err(DocumentError::NotAnObject)
        ));
        assert!(matches!(SceneDocument::from_json("{"), Err(DocumentError::Json(_))));
    }

    #[test]
    fn test_json_uses_camel_case() {
        let doc = SceneDocument {
            default_text_scale: None,
            ..SceneDocument::default()
        };
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"textNodes\""));
        assert!(json.contains("\"defaultTextScale\": null"));
        let parsed = SceneDocument::from_json(&json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_merge_by_id_keeps_unknown_local_first() {
        let merged = merge_by_id(vec![(1, "remote"), (2, "remote")], &[(2, "local"), (3, "local")], |item| item.0);
        assert_eq!(merged, vec![(3, "local"), (1, "remote"), (2, "remote")]);
    }
}
