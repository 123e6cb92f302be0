//! Routes returned by the path backend.

use serde::{Deserialize, Serialize};

use crate::error::{RouterError, RouterResult};
use crate::geo::{BoundingBox, Position};

/// A route coordinate as it appears on the wire.
///
/// The backend has served both `[lat, lon]` pairs and
/// `{"latitude": .., "longitude": ..}` records; both decode to the same
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteCoordinate {
    Pair([f64; 2]),
    Record { latitude: f64, longitude: f64 },
}

impl RouteCoordinate {
    pub fn to_position(&self) -> RouterResult<Position> {
        match *self {
            RouteCoordinate::Pair([latitude, longitude]) => Position::new(latitude, longitude),
            RouteCoordinate::Record {
                latitude,
                longitude,
            } => Position::new(latitude, longitude),
        }
    }
}

/// Body of `/calculate-shortest-path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    /// `null` when the backend found no path.
    #[serde(default)]
    pub route: Option<Vec<RouteCoordinate>>,
    /// Total weighted distance of the path, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl RouteResponse {
    /// Normalize the response into a [`Route`].
    pub fn into_route(self) -> RouterResult<Route> {
        let coordinates = self.route.ok_or_else(|| {
            RouterError::Domain("No route exists between the requested points".to_string())
        })?;
        let mut route = Route::from_coordinates(&coordinates)?;
        route.weight = self.weight.filter(|w| w.is_finite());
        Ok(route)
    }
}

/// An ordered path of positions; the first is the start, the last the end.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Route {
    coordinates: Vec<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
}

impl Route {
    pub fn new(coordinates: Vec<Position>) -> Self {
        Self {
            coordinates,
            weight: None,
        }
    }

    /// Build a route from wire coordinates in either encoding.
    pub fn from_coordinates(coordinates: &[RouteCoordinate]) -> RouterResult<Self> {
        let coordinates = coordinates
            .iter()
            .map(RouteCoordinate::to_position)
            .collect::<RouterResult<Vec<_>>>()?;
        Ok(Self::new(coordinates))
    }

    pub fn coordinates(&self) -> &[Position] {
        &self.coordinates
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn start(&self) -> Option<&Position> {
        self.coordinates.first()
    }

    pub fn end(&self) -> Option<&Position> {
        self.coordinates.last()
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    /// Bounding box of every coordinate in the route.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_positions(&self.coordinates)
    }

    /// Coordinates as bare `[lat, lon]` pairs.
    pub fn as_pairs(&self) -> Vec<[f64; 2]> {
        self.coordinates.iter().map(Position::as_pair).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_and_records_decode_equal() {
        let pairs: RouteResponse =
            serde_json::from_str(r#"{"route": [[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]}"#).unwrap();
        let records: RouteResponse = serde_json::from_str(
            r#"{"route": [
                {"latitude": 1.0, "longitude": 1.0},
                {"latitude": 2.0, "longitude": 2.0},
                {"latitude": 3.0, "longitude": 3.0}
            ]}"#,
        )
        .unwrap();

        assert_eq!(pairs.into_route().unwrap(), records.into_route().unwrap());
    }

    #[test]
    fn test_mixed_encodings() {
        let response: RouteResponse =
            serde_json::from_str(r#"{"route": [[1.0, 2.0], {"latitude": 3.0, "longitude": 4.0}]}"#)
                .unwrap();
        let route = response.into_route().unwrap();
        assert_eq!(route.as_pairs(), vec![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn test_null_route_is_domain_error() {
        let response: RouteResponse =
            serde_json::from_str(r#"{"route": null, "weight": null}"#).unwrap();
        assert!(matches!(response.into_route(), Err(RouterError::Domain(_))));
    }

    #[test]
    fn test_start_end_and_bounds() {
        let route = Route::new(vec![
            Position::new(1.0, 1.0).unwrap(),
            Position::new(2.0, 2.0).unwrap(),
            Position::new(3.0, 3.0).unwrap(),
        ]);
        assert_eq!(route.start().unwrap().as_pair(), [1.0, 1.0]);
        assert_eq!(route.end().unwrap().as_pair(), [3.0, 3.0]);
        assert_eq!(route.bounds().unwrap(), BoundingBox::new(1.0, 1.0, 3.0, 3.0));
    }

    #[test]
    fn test_single_point_route() {
        let route = Route::new(vec![Position::new(5.0, 6.0).unwrap()]);
        assert_eq!(route.start(), route.end());
        assert_eq!(route.len(), 1);
    }

    #[test]
    fn test_invalid_coordinate_rejected() {
        let response: RouteResponse =
            serde_json::from_str(r#"{"route": [[120.0, 1.0]]}"#).unwrap();
        assert!(matches!(
            response.into_route(),
            Err(RouterError::InvalidPosition(_))
        ));
    }
}
