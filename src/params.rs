use std::collections::BTreeSet;

use geo_types::{LineString, MultiPoint, Point, Polygon};
use wkt::ToWkt;

use crate::error::Error;

/// Geographic area of a query: a single point, a set of points, or a polygon.
///
/// A bare `(lon, lat)` tuple converts into the point variant, matching the
/// coordinate order WKT uses. Already-constructed `geo_types` geometries
/// convert via `From` without further validation.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryLocation {
    Point(Point<f64>),
    MultiPoint(MultiPoint<f64>),
    Polygon(Polygon<f64>),
}

impl QueryLocation {
    pub fn point(lon: f64, lat: f64) -> Self {
        Self::Point(Point::new(lon, lat))
    }

    /// Builds a multi-point location from `(lon, lat)` pairs.
    pub fn multi_point(coords: &[(f64, f64)]) -> Result<Self, Error> {
        if coords.is_empty() {
            return Err(Error::InvalidLocation(
                "multi-point location needs at least one coordinate".to_string(),
            ));
        }
        let points = coords.iter().map(|&(lon, lat)| Point::new(lon, lat)).collect();
        Ok(Self::MultiPoint(MultiPoint(points)))
    }

    /// Builds a polygon location from an exterior ring of `(lon, lat)` pairs.
    ///
    /// The ring must already be closed (first coordinate equal to the last),
    /// per WKT convention; rings are never closed implicitly.
    pub fn polygon(ring: &[(f64, f64)]) -> Result<Self, Error> {
        if ring.len() < 4 {
            return Err(Error::InvalidLocation(format!(
                "polygon ring needs at least 4 coordinates, got {}",
                ring.len()
            )));
        }
        if ring.first() != ring.last() {
            return Err(Error::InvalidLocation(
                "polygon ring is not closed: first and last coordinates differ".to_string(),
            ));
        }
        let exterior = LineString::from(ring.to_vec());
        Ok(Self::Polygon(Polygon::new(exterior, Vec::new())))
    }

    /// Serializes the location as a WKT string, e.g. `POINT(-93.1 45.1)`.
    pub fn to_wkt(&self) -> String {
        match self {
            Self::Point(p) => p.wkt_string(),
            Self::MultiPoint(mp) => mp.wkt_string(),
            Self::Polygon(poly) => poly.wkt_string(),
        }
    }
}

impl From<(f64, f64)> for QueryLocation {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self::point(lon, lat)
    }
}

impl From<Point<f64>> for QueryLocation {
    fn from(p: Point<f64>) -> Self {
        Self::Point(p)
    }
}

impl From<MultiPoint<f64>> for QueryLocation {
    fn from(mp: MultiPoint<f64>) -> Self {
        Self::MultiPoint(mp)
    }
}

impl From<Polygon<f64>> for QueryLocation {
    fn from(poly: Polygon<f64>) -> Self {
        Self::Polygon(poly)
    }
}

/// An attribute or dataset-name list, accepted as a single string, an
/// integer, or a sequence of either.
///
/// A single string containing commas is treated as a comma-delimited list and
/// split with whitespace trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListParam {
    One(String),
    Many(Vec<String>),
}

impl ListParam {
    /// Renders the list as the comma-joined wire string.
    ///
    /// With an allow list the result is the set intersection: entries the
    /// endpoint does not recognize are dropped silently, duplicates collapse,
    /// and the output is sorted so identical inputs always produce identical
    /// query strings. An empty intersection yields an empty string and the
    /// request still goes out; the server reports the rejection. Without an
    /// allow list the entries are joined as given, duplicates included.
    ///
    /// `single_only` is advisory: endpoints documented to take one entry
    /// still receive everything that survived the intersection.
    pub fn normalize(&self, allow_list: Option<&[&str]>, single_only: bool) -> String {
        let entries: Vec<String> = match self {
            Self::One(s) if s.contains(',') => {
                s.split(',').map(|part| part.trim().to_string()).collect()
            }
            Self::One(s) => vec![s.clone()],
            Self::Many(items) => items.clone(),
        };

        let joined = match allow_list {
            None => entries.join(","),
            Some(allowed) => {
                let allowed: BTreeSet<&str> = allowed.iter().copied().collect();
                let kept: BTreeSet<&str> = entries
                    .iter()
                    .map(String::as_str)
                    .filter(|entry| allowed.contains(entry))
                    .collect();
                kept.into_iter().collect::<Vec<_>>().join(",")
            }
        };

        if single_only && joined.contains(',') {
            log::debug!(
                "endpoint expects a single entry, sending {}",
                joined.split(',').count()
            );
        }

        joined
    }
}

impl From<&str> for ListParam {
    fn from(s: &str) -> Self {
        Self::One(s.to_string())
    }
}

impl From<String> for ListParam {
    fn from(s: String) -> Self {
        Self::One(s)
    }
}

impl From<i64> for ListParam {
    fn from(n: i64) -> Self {
        Self::One(n.to_string())
    }
}

impl From<i32> for ListParam {
    fn from(n: i32) -> Self {
        Self::One(n.to_string())
    }
}

impl From<Vec<String>> for ListParam {
    fn from(items: Vec<String>) -> Self {
        Self::Many(items)
    }
}

impl From<Vec<&str>> for ListParam {
    fn from(items: Vec<&str>) -> Self {
        Self::Many(items.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<i64>> for ListParam {
    fn from(items: Vec<i64>) -> Self {
        Self::Many(items.into_iter().map(|n| n.to_string()).collect())
    }
}

impl From<Vec<i32>> for ListParam {
    fn from(items: Vec<i32>) -> Self {
        Self::Many(items.into_iter().map(|n| n.to_string()).collect())
    }
}

impl From<&[&str]> for ListParam {
    fn from(items: &[&str]) -> Self {
        Self::Many(items.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ListParam {
    fn from(items: [&str; N]) -> Self {
        Self::Many(items.iter().map(|s| s.to_string()).collect())
    }
}

pub(crate) fn wire_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
