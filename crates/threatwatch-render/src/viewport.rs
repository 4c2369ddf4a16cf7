//! Map viewport. Auto-fit happens once; afterwards only the operator moves it.

use serde::Serialize;

use threatwatch_core::{GeoBounds, Position};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Viewport {
    bounds: Option<GeoBounds>,
    max_zoom: Option<u8>,
    auto_fitted: bool,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit to `positions` if no fit has happened yet and there is anything
    /// to fit. Returns `true` when the view changed.
    pub fn fit_once(&mut self, positions: &[Position], padding: f64, max_zoom: u8) -> bool {
        if self.auto_fitted {
            return false;
        }
        let Some(bounds) = GeoBounds::from_points(positions) else {
            return false;
        };
        self.bounds = Some(bounds.pad(padding));
        self.max_zoom = Some(max_zoom);
        self.auto_fitted = true;
        true
    }

    pub fn set_view(&mut self, bounds: GeoBounds) {
        self.bounds = Some(bounds);
        self.max_zoom = None;
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        self.bounds
    }

    pub fn max_zoom(&self) -> Option<u8> {
        self.max_zoom
    }

    pub fn is_auto_fitted(&self) -> bool {
        self.auto_fitted
    }
}
