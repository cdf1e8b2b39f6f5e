use crate::domain::rating::Location;

/// Half-width of the search box in degrees, roughly 500m at mid-latitudes.
pub const DEFAULT_RADIUS: f64 = 0.005;

/// Axis-aligned rectangle in degree space. All four edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn around(center: Location, radius: f64) -> Self {
        Self {
            min_lat: center.lat - radius,
            max_lat: center.lat + radius,
            min_lng: center.lng - radius,
            max_lng: center.lng + radius,
        }
    }

    pub fn contains(&self, location: &Location) -> bool {
        location.lat >= self.min_lat
            && location.lat <= self.max_lat
            && location.lng >= self.min_lng
            && location.lng <= self.max_lng
    }
}
