use crate::model::{GraphicId, LayerId};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub title: String,
    pub z_index: i32,
    pub visible: bool,
    pub graphics: Vec<GraphicId>,
}

/// Drawing layers and which graphic lives in which layer.
#[derive(Clone, Debug, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
    graphic_to_layer: HashMap<GraphicId, LayerId>,
    next_id: LayerId,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty layer on top of the stack, returns its ID
    pub fn create_layer(&mut self, title: impl Into<String>) -> LayerId {
        let id = self.next_id;
        self.next_id += 1;
        let z_index = self.layers.len() as i32;
        self.layers.push(Layer {
            id,
            title: title.into(),
            z_index,
            visible: true,
            graphics: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Put a graphic into a layer, moving it out of any previous one.
    pub fn add(&mut self, layer: LayerId, graphic: GraphicId) -> bool {
        if self.get(layer).is_none() {
            return false;
        }
        self.remove_graphic(graphic);
        if let Some(l) = self.get_mut(layer) {
            l.graphics.push(graphic);
        }
        self.graphic_to_layer.insert(graphic, layer);
        true
    }

    pub fn add_many(&mut self, layer: LayerId, graphics: &[GraphicId]) -> bool {
        if self.get(layer).is_none() {
            return false;
        }
        for &g in graphics {
            self.add(layer, g);
        }
        true
    }

    pub fn remove_graphic(&mut self, graphic: GraphicId) {
        if let Some(layer_id) = self.graphic_to_layer.remove(&graphic) {
            if let Some(layer) = self.get_mut(layer_id) {
                layer.graphics.retain(|&g| g != graphic);
            }
        }
    }

    pub fn layer_of(&self, graphic: GraphicId) -> Option<LayerId> {
        self.graphic_to_layer.get(&graphic).copied()
    }

    pub fn contains(&self, layer: LayerId, graphic: GraphicId) -> bool {
        self.layer_of(graphic) == Some(layer)
    }

    /// Layers in z-order (bottom to top)
    pub fn ordered(&self) -> Vec<&Layer> {
        let mut layers: Vec<_> = self.layers.iter().collect();
        layers.sort_by_key(|l| l.z_index);
        layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphics_live_in_one_layer() {
        let mut s = LayerStack::new();
        let a = s.create_layer("a");
        let b = s.create_layer("b");
        assert!(s.add(a, 7));
        assert!(s.contains(a, 7));
        assert!(s.add(b, 7));
        assert!(!s.contains(a, 7));
        assert!(s.get(a).unwrap().graphics.is_empty());
        assert_eq!(s.layer_of(7), Some(b));
    }

    #[test]
    fn add_to_unknown_layer_fails() {
        let mut s = LayerStack::new();
        assert!(!s.add(42, 1));
        assert!(!s.add_many(42, &[1, 2]));
        assert_eq!(s.layer_of(1), None);
    }

    #[test]
    fn ordered_is_bottom_to_top() {
        let mut s = LayerStack::new();
        let a = s.create_layer("bottom");
        let b = s.create_layer("top");
        let ids: Vec<_> = s.ordered().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
