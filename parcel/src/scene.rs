use crate::engine::View;
use crate::layers::LayerStack;
use crate::model::{Graphic, GraphicId, LayerId, Polygon, ScreenPoint};
use crate::store::{GeometryStore, RegionDef};
use std::collections::HashMap;

pub const EDITABLE_LAYER_TITLE: &str = "Editable region";
pub const BOUNDARY_LAYER_TITLE: &str = "Boundary";

/// Owns the two drawing layers and the graphics built from a [`GeometryStore`].
///
/// A binder only exists after [`SceneBinder::initialize`] has populated the
/// view, so anything holding one may hit-test.
pub struct SceneBinder<V> {
    view: V,
    layers: LayerStack,
    graphics: HashMap<GraphicId, Graphic>,
    editable_layer: LayerId,
    boundary_layer: LayerId,
    editable_graphic: GraphicId,
    boundary_graphic: GraphicId,
    marker_key: String,
}

impl<V: View> SceneBinder<V> {
    pub fn initialize(mut view: V, store: &GeometryStore) -> Self {
        let mut layers = LayerStack::new();
        let editable_layer = layers.create_layer(EDITABLE_LAYER_TITLE);
        let boundary_layer = layers.create_layer(BOUNDARY_LAYER_TITLE);

        let sr = view.spatial_reference();
        let build = |id: GraphicId, def: &RegionDef| Graphic {
            id,
            geometry: Polygon::new(def.rings.clone(), sr),
            symbol: def.symbol,
            attributes: def.attributes.clone(),
        };
        let editable = build(0, store.editable_region());
        let boundary = build(1, store.boundary());

        layers.add_many(editable_layer, &[editable.id]);
        layers.add(boundary_layer, boundary.id);

        for layer in layers.ordered() {
            view.add_layer(layer);
        }
        view.add_graphics(editable_layer, std::slice::from_ref(&editable));
        view.add_graphics(boundary_layer, std::slice::from_ref(&boundary));
        tracing::debug!(editable_layer, boundary_layer, "scene initialized");

        let editable_graphic = editable.id;
        let boundary_graphic = boundary.id;
        let graphics = HashMap::from([(editable.id, editable), (boundary.id, boundary)]);
        SceneBinder {
            view,
            layers,
            graphics,
            editable_layer,
            boundary_layer,
            editable_graphic,
            boundary_graphic,
            marker_key: store.marker_key().to_string(),
        }
    }

    /// Candidates from any layer, topmost first. Filtering is up to the caller.
    pub fn hit_test(&self, point: ScreenPoint) -> V::HitTest {
        self.view.hit_test(point)
    }
}

impl<V> SceneBinder<V> {
    pub fn editable_layer(&self) -> LayerId {
        self.editable_layer
    }

    pub fn boundary_layer(&self) -> LayerId {
        self.boundary_layer
    }

    pub fn editable_graphic(&self) -> GraphicId {
        self.editable_graphic
    }

    pub fn boundary_graphic(&self) -> GraphicId {
        self.boundary_graphic
    }

    pub fn graphic(&self, id: GraphicId) -> Option<&Graphic> {
        self.graphics.get(&id)
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn contains(&self, layer: LayerId, graphic: GraphicId) -> bool {
        self.layers.contains(layer, graphic)
    }

    pub fn marker_key(&self) -> &str {
        &self.marker_key
    }

    /// Swap in the geometry the tool committed for `graphic`.
    pub fn replace_geometry(&mut self, graphic: GraphicId, geometry: Polygon) -> bool {
        match self.graphics.get_mut(&graphic) {
            Some(g) => {
                g.geometry = geometry;
                true
            }
            None => false,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}
