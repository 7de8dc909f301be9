use serde::Serialize;
use sticker_shared::Coordinate;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::config::{TILE_ATTRIBUTION, TILE_URL};
use crate::markers::MapSurface;
use crate::viewport::ViewportBounds;

const TILE_MAX_ZOOM: u8 = 19;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = L, js_name = Map)]
    pub type LeafletMap;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    fn create_map(element_id: &str) -> Result<LeafletMap, JsValue>;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &LeafletMap, center: &JsValue, zoom: f64) -> LeafletMap;

    #[wasm_bindgen(method, js_name = fitBounds)]
    fn fit_lat_lng_bounds(this: &LeafletMap, bounds: &JsValue) -> LeafletMap;

    #[wasm_bindgen(method, js_name = removeLayer)]
    fn remove_layer(this: &LeafletMap, layer: &LeafletMarker) -> LeafletMap;

    #[wasm_bindgen(js_namespace = L, js_name = TileLayer)]
    type LeafletTileLayer;

    #[wasm_bindgen(catch, js_namespace = L, js_name = tileLayer)]
    fn create_tile_layer(url: &str, options: &JsValue) -> Result<LeafletTileLayer, JsValue>;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_tiles_to(this: &LeafletTileLayer, map: &LeafletMap) -> LeafletTileLayer;

    #[wasm_bindgen(js_namespace = L, js_name = Marker)]
    pub type LeafletMarker;

    #[wasm_bindgen(catch, js_namespace = L, js_name = marker)]
    fn create_marker(at: &JsValue) -> Result<LeafletMarker, JsValue>;

    #[wasm_bindgen(method, js_name = bindPopup)]
    fn bind_popup(this: &LeafletMarker, content: &str) -> LeafletMarker;

    #[wasm_bindgen(catch, method, js_name = addTo)]
    fn add_marker_to(this: &LeafletMarker, map: &LeafletMap) -> Result<LeafletMarker, JsValue>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TileOptions {
    attribution: &'static str,
    max_zoom: u8,
}

fn lat_lng(at: Coordinate) -> JsValue {
    js_sys::Array::of2(&JsValue::from_f64(at.lat), &JsValue::from_f64(at.lon)).into()
}

fn lat_lng_bounds(bounds: &ViewportBounds) -> JsValue {
    js_sys::Array::of2(&lat_lng(bounds.south_west), &lat_lng(bounds.north_east)).into()
}

pub(crate) fn js_error_text(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// A Leaflet map with an OpenStreetMap tile layer, driven through [`MapSurface`].
pub struct LeafletSurface {
    map: LeafletMap,
}

impl LeafletSurface {
    /// Attach a map to the element with `element_id` and center it on `origin`.
    pub fn mount(element_id: &str, origin: Coordinate, zoom: f64) -> Result<Self, String> {
        let map = create_map(element_id).map_err(|e| format!("map init: {}", js_error_text(&e)))?;
        map.set_view(&lat_lng(origin), zoom);

        let options = serde_wasm_bindgen::to_value(&TileOptions {
            attribution: TILE_ATTRIBUTION,
            max_zoom: TILE_MAX_ZOOM,
        })
        .map_err(|e| format!("tile options: {e}"))?;
        create_tile_layer(TILE_URL, &options)
            .map_err(|e| format!("tile layer: {}", js_error_text(&e)))?
            .add_tiles_to(&map);

        tracing::info!(element = element_id, zoom, "map mounted");
        Ok(Self { map })
    }
}

impl MapSurface for LeafletSurface {
    type Marker = LeafletMarker;

    fn add_marker(&mut self, at: Coordinate, popup: &str) -> Result<LeafletMarker, String> {
        let marker = create_marker(&lat_lng(at)).map_err(|e| js_error_text(&e))?;
        marker.bind_popup(popup);
        marker
            .add_marker_to(&self.map)
            .map_err(|e| js_error_text(&e))
    }

    fn remove_marker(&mut self, marker: LeafletMarker) {
        self.map.remove_layer(&marker);
    }

    fn fit_bounds(&mut self, bounds: &ViewportBounds) {
        self.map.fit_lat_lng_bounds(&lat_lng_bounds(bounds));
    }
}
