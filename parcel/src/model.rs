use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type GraphicId = u32;
pub type LayerId = u32;

/// Attribute bag attached to a graphic.
pub type Attributes = BTreeMap<String, serde_json::Value>;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl From<[f64; 2]> for Vertex {
    fn from([x, y]: [f64; 2]) -> Self {
        Vertex { x, y }
    }
}

impl From<Vertex> for [f64; 2] {
    fn from(v: Vertex) -> Self {
        [v.x, v.y]
    }
}

/// Closed outline. First and last vertex coincide once closed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ring(pub Vec<Vertex>);

impl Ring {
    pub fn from_coords(coords: &[[f64; 2]]) -> Self {
        Ring(coords.iter().copied().map(Vertex::from).collect())
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        match (self.0.first(), self.0.last()) {
            (Some(a), Some(b)) => self.0.len() > 1 && a == b,
            _ => false,
        }
    }

    /// Append the first vertex when the outline is left open.
    pub fn close(&mut self) {
        if !self.is_closed() {
            if let Some(first) = self.0.first().copied() {
                self.0.push(first);
            }
        }
    }

    /// Reason the ring cannot be rendered as a polygon outline, if any.
    pub fn defect(&self) -> Option<&'static str> {
        if self.0.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
            return Some("non-finite coordinate");
        }
        if self.0.len() < 4 {
            return Some("fewer than 4 vertices");
        }
        if !self.is_closed() {
            return Some("ring is not closed");
        }
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialReference {
    pub wkid: u32,
}

impl SpatialReference {
    pub const WEB_MERCATOR: SpatialReference = SpatialReference { wkid: 3857 };
}

impl Default for SpatialReference {
    fn default() -> Self {
        Self::WEB_MERCATOR
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub rings: Vec<Ring>,
    #[serde(rename = "spatialReference", default)]
    pub spatial_reference: SpatialReference,
}

impl Polygon {
    pub fn new(rings: Vec<Ring>, spatial_reference: SpatialReference) -> Self {
        Polygon { rings, spatial_reference }
    }
}

/// RGB with a fractional alpha, serialized as `[r, g, b, a]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ColorRepr", into = "ColorRepr")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Color { r, g, b, a }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Rgba(u8, u8, u8, f32),
    Rgb(u8, u8, u8),
}

impl From<ColorRepr> for Color {
    fn from(c: ColorRepr) -> Self {
        match c {
            ColorRepr::Rgba(r, g, b, a) => Color::rgba(r, g, b, a.clamp(0.0, 1.0)),
            ColorRepr::Rgb(r, g, b) => Color::rgb(r, g, b),
        }
    }
}

impl From<Color> for ColorRepr {
    fn from(c: Color) -> Self {
        ColorRepr::Rgba(c.r, c.g, c.b, c.a)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillPattern {
    #[default]
    Solid,
    None,
    Horizontal,
    Vertical,
    Cross,
    DiagonalCross,
    ForwardDiagonal,
    BackwardDiagonal,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub color: Color,
    pub width: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub color: Color,
    #[serde(default)]
    pub pattern: FillPattern,
    pub outline: Outline,
}

impl Style {
    pub fn simple_fill(color: Color, pattern: FillPattern, width: f32, outline: Color) -> Self {
        Style { color, pattern, outline: Outline { color: outline, width } }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Graphic {
    pub id: GraphicId,
    pub geometry: Polygon,
    pub symbol: Style,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Graphic {
    pub fn has_marker(&self, key: &str) -> bool {
        marker_set(Some(&self.attributes), key)
    }
}

/// True when `attributes` holds a truthy value under `key`.
///
/// Absent attributes are a non-match rather than an error.
pub fn marker_set(attributes: Option<&Attributes>, key: &str) -> bool {
    attributes.and_then(|a| a.get(key)).is_some_and(is_truthy)
}

/// Host truthiness: null, false, 0, NaN and "" are falsy.
pub fn is_truthy(v: &serde_json::Value) -> bool {
    use serde_json::Value;
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        ScreenPoint { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_matches_host() {
        assert!(is_truthy(&json!("new store")));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!({})));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(null)));
    }

    #[test]
    fn color_accepts_rgb_and_rgba() {
        let c: Color = serde_json::from_value(json!([0, 170, 255, 0.8])).unwrap();
        assert_eq!(c, Color::rgba(0, 170, 255, 0.8));
        let w: Color = serde_json::from_value(json!([255, 255, 255])).unwrap();
        assert_eq!(w, Color::WHITE);
    }

    #[test]
    fn ring_close_and_defects() {
        let mut r = Ring::from_coords(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        assert_eq!(r.defect(), Some("fewer than 4 vertices"));
        r.close();
        assert!(r.is_closed());
        assert_eq!(r.defect(), None);
        r.close();
        assert_eq!(r.len(), 4, "closing twice must not append again");

        let bad = Ring::from_coords(&[[0.0, 0.0], [f64::NAN, 0.0], [1.0, 1.0], [0.0, 0.0]]);
        assert_eq!(bad.defect(), Some("non-finite coordinate"));
    }

    #[test]
    fn missing_attributes_are_not_a_marker() {
        assert!(!marker_set(None, "newDevelopment"));
        let mut a = Attributes::new();
        a.insert("other".into(), json!(true));
        assert!(!marker_set(Some(&a), "newDevelopment"));
    }
}
