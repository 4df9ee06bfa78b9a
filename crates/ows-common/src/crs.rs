//! Coordinate Reference System types and rectangle reprojection.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use crate::{BoundingBox, OwsError, OwsResult};

/// Half the circumference of the Web Mercator sphere, in meters.
const MERCATOR_MAX_EXTENT: f64 = 20037508.342789244;

/// Latitude limit of the Web Mercator square.
const MERCATOR_MAX_LAT: f64 = 85.0511287798066;

/// Number of segments sampled along each rectangle edge when reprojecting.
const EDGE_SAMPLES: usize = 20;

/// Sphere radius used by the projected systems (WGS84 semi-major axis).
const EARTH_RADIUS: f64 = 6378137.0;

/// Spherical polar stereographic projection, true scale at `lat_ts`.
#[derive(Debug, Clone, Copy)]
struct PolarStereographic {
    /// Latitude of true scale in degrees; its sign picks the pole
    lat_ts: f64,
    /// Central meridian in degrees
    lon0: f64,
}

impl PolarStereographic {
    fn north(&self) -> bool {
        self.lat_ts >= 0.0
    }

    /// Radius at which the latitude of true scale has unit scale.
    fn scale(&self) -> f64 {
        EARTH_RADIUS * (1.0 + self.lat_ts.abs().to_radians().sin())
    }

    fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let dlon = (lon - self.lon0).to_radians();
        if self.north() {
            let rho = self.scale() * (PI / 4.0 - lat.to_radians() / 2.0).tan();
            (rho * dlon.sin(), -rho * dlon.cos())
        } else {
            let rho = self.scale() * (PI / 4.0 + lat.to_radians() / 2.0).tan();
            (rho * dlon.sin(), rho * dlon.cos())
        }
    }

    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let rho = x.hypot(y);
        let (lat, lon) = if self.north() {
            (
                PI / 2.0 - 2.0 * (rho / self.scale()).atan(),
                self.lon0 + x.atan2(-y).to_degrees(),
            )
        } else {
            (
                2.0 * (rho / self.scale()).atan() - PI / 2.0,
                self.lon0 + x.atan2(y).to_degrees(),
            )
        };
        (normalize_lon(lon), lat.to_degrees())
    }

    /// Latitude of the pole sitting at the projection origin.
    fn pole_latitude(&self) -> f64 {
        if self.north() {
            90.0
        } else {
            -90.0
        }
    }
}

/// Spherical Albers equal-area conic projection.
#[derive(Debug, Clone, Copy)]
struct AlbersEqualArea {
    lat1: f64,
    lat2: f64,
    lat0: f64,
    lon0: f64,
}

impl AlbersEqualArea {
    /// Cone constant, `C` and the radius of the origin parallel.
    fn constants(&self) -> (f64, f64, f64) {
        let (s1, s2) = (self.lat1.to_radians().sin(), self.lat2.to_radians().sin());
        let n = (s1 + s2) / 2.0;
        let c = self.lat1.to_radians().cos().powi(2) + 2.0 * n * s1;
        let rho0 = EARTH_RADIUS * (c - 2.0 * n * self.lat0.to_radians().sin()).sqrt() / n;
        (n, c, rho0)
    }

    fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (n, c, rho0) = self.constants();
        let theta = n * normalize_lon(lon - self.lon0).to_radians();
        let rho = EARTH_RADIUS * (c - 2.0 * n * lat.to_radians().sin()).max(0.0).sqrt() / n;
        (rho * theta.sin(), rho0 - rho * theta.cos())
    }

    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let (n, c, rho0) = self.constants();
        let dy = rho0 - y;
        let rho = x.hypot(dy);
        let theta = x.atan2(dy);
        let q = rho * n / EARTH_RADIUS;
        let lat = ((c - q * q) / (2.0 * n)).clamp(-1.0, 1.0).asin();
        (normalize_lon(self.lon0 + (theta / n).to_degrees()), lat.to_degrees())
    }
}

/// NSIDC Sea Ice Polar Stereographic North
const EPSG_3413: PolarStereographic = PolarStereographic {
    lat_ts: 70.0,
    lon0: -45.0,
};

/// Antarctic Polar Stereographic
const EPSG_3031: PolarStereographic = PolarStereographic {
    lat_ts: -71.0,
    lon0: 0.0,
};

/// CONUS Albers
const EPSG_5070: AlbersEqualArea = AlbersEqualArea {
    lat1: 29.5,
    lat2: 45.5,
    lat0: 23.0,
    lon0: -96.0,
};

fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Well-known CRS codes understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CrsCode {
    /// WGS84 Geographic (lat/lon in degrees)
    Epsg4326,
    /// Web Mercator (meters)
    Epsg3857,
    /// NAD83 Geographic
    Epsg4269,
    /// Albers Equal Area (CONUS)
    Epsg5070,
    /// Polar Stereographic North
    Epsg3413,
    /// Polar Stereographic South
    Epsg3031,
}

impl CrsCode {
    /// Parse a CRS identifier as found in mapfiles and requests.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326"
    /// - "epsg:4326"
    /// - "init=epsg:4326" (proj4 style)
    /// - "CRS:84" (equivalent to EPSG:4326 with lon/lat axis order)
    pub fn from_identifier(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();
        let normalized = normalized.strip_prefix("INIT=").unwrap_or(normalized.as_str());

        match normalized {
            "EPSG:4326" | "CRS:84" => Ok(CrsCode::Epsg4326),
            "EPSG:3857" | "EPSG:900913" => Ok(CrsCode::Epsg3857),
            "EPSG:4269" => Ok(CrsCode::Epsg4269),
            "EPSG:5070" => Ok(CrsCode::Epsg5070),
            "EPSG:3413" => Ok(CrsCode::Epsg3413),
            "EPSG:3031" => Ok(CrsCode::Epsg3031),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326 | CrsCode::Epsg4269)
    }

    /// Convert a point in this CRS to geographic degrees.
    fn to_geographic(self, x: f64, y: f64) -> (f64, f64) {
        match self {
            CrsCode::Epsg4326 | CrsCode::Epsg4269 => (x, y),
            CrsCode::Epsg3857 => mercator_to_wgs84(x, y),
            CrsCode::Epsg5070 => EPSG_5070.inverse(x, y),
            CrsCode::Epsg3413 => EPSG_3413.inverse(x, y),
            CrsCode::Epsg3031 => EPSG_3031.inverse(x, y),
        }
    }

    /// Convert a point in geographic degrees to this CRS.
    fn project_geographic(self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            CrsCode::Epsg4326 | CrsCode::Epsg4269 => (lon, lat),
            CrsCode::Epsg3857 => wgs84_to_mercator(lon, lat),
            CrsCode::Epsg5070 => EPSG_5070.forward(lon, lat),
            CrsCode::Epsg3413 => EPSG_3413.forward(lon, lat),
            CrsCode::Epsg3031 => EPSG_3031.forward(lon, lat),
        }
    }

    /// Latitude of the pole projected to the origin, for azimuthal systems.
    fn origin_pole(self) -> Option<f64> {
        match self {
            CrsCode::Epsg3413 => Some(EPSG_3413.pole_latitude()),
            CrsCode::Epsg3031 => Some(EPSG_3031.pole_latitude()),
            _ => None,
        }
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CrsCode::Epsg4326 => "EPSG:4326",
            CrsCode::Epsg3857 => "EPSG:3857",
            CrsCode::Epsg4269 => "EPSG:4269",
            CrsCode::Epsg5070 => "EPSG:5070",
            CrsCode::Epsg3413 => "EPSG:3413",
            CrsCode::Epsg3031 => "EPSG:3031",
        };
        write!(f, "{}", code)
    }
}

impl TryFrom<String> for CrsCode {
    type Error = CrsParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CrsCode::from_identifier(&value)
    }
}

impl From<CrsCode> for String {
    fn from(code: CrsCode) -> Self {
        code.to_string()
    }
}

/// Projection attached to a map or layer.
///
/// An undefined projection (no code) means coordinates are taken as-is
/// and never reprojected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Projection {
    pub code: Option<CrsCode>,
}

impl Projection {
    pub fn new(code: CrsCode) -> Self {
        Self { code: Some(code) }
    }

    /// The geographic WGS84 projection.
    pub fn geographic() -> Self {
        Self::new(CrsCode::Epsg4326)
    }

    pub fn is_defined(&self) -> bool {
        self.code.is_some()
    }

    /// Check if this is a geographic (lat/lon) projection.
    pub fn is_geographic(&self) -> bool {
        self.code.map(|c| c.is_geographic()).unwrap_or(false)
    }

    /// Reproject a rectangle into another projection.
    ///
    /// Points are sampled along every edge of the rectangle and the
    /// result is the bounds of the transformed samples. A rectangle
    /// enclosing the pole of a polar projection also covers every
    /// meridian at that pole.
    pub fn project_rect(&self, rect: &BoundingBox, target: &Projection) -> OwsResult<BoundingBox> {
        let (from, to) = match (self.code, target.code) {
            (Some(from), Some(to)) => (from, to),
            _ => return Ok(*rect),
        };
        if from == to || (from.is_geographic() && to.is_geographic()) {
            return Ok(*rect);
        }

        let transform = |x: f64, y: f64| {
            let (lon, lat) = from.to_geographic(x, y);
            to.project_geographic(lon, lat)
        };

        let (x0, y0) = transform(rect.min_x, rect.min_y);
        let mut result = BoundingBox::from_point(x0, y0);

        let dx = rect.width() / EDGE_SAMPLES as f64;
        let dy = rect.height() / EDGE_SAMPLES as f64;
        for i in 0..=EDGE_SAMPLES {
            let x = rect.min_x + dx * i as f64;
            let y = rect.min_y + dy * i as f64;
            for (px, py) in [
                (x, rect.min_y),
                (x, rect.max_y),
                (rect.min_x, y),
                (rect.max_x, y),
            ] {
                let (tx, ty) = transform(px, py);
                result.include(tx, ty);
            }
        }

        if let Some(pole_lat) = from.origin_pole() {
            if rect.contains_point(0.0, 0.0) {
                for i in 0..=EDGE_SAMPLES {
                    let lon = -180.0 + 360.0 * i as f64 / EDGE_SAMPLES as f64;
                    let (tx, ty) = to.project_geographic(lon, pole_lat);
                    result.include(tx, ty);
                }
            }
        }

        if !(result.min_x.is_finite()
            && result.min_y.is_finite()
            && result.max_x.is_finite()
            && result.max_y.is_finite())
        {
            return Err(OwsError::Projection(format!(
                "Extent cannot be transformed from {} to {}",
                from, to
            )));
        }

        Ok(result)
    }
}

/// Convert Web Mercator (EPSG:3857) coordinates to WGS84 (EPSG:4326)
pub fn mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / MERCATOR_MAX_EXTENT) * 180.0;
    let lat = (y / MERCATOR_MAX_EXTENT) * 180.0;
    let lat = 180.0 / PI * (2.0 * (lat * PI / 180.0).exp().atan() - PI / 2.0);
    (lon, lat)
}

/// Convert WGS84 (EPSG:4326) coordinates to Web Mercator (EPSG:3857)
pub fn wgs84_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT);
    let x = lon * MERCATOR_MAX_EXTENT / 180.0;
    let y = ((90.0 + lat) * PI / 360.0).tan().ln() / (PI / 180.0);
    (x, y * MERCATOR_MAX_EXTENT / 180.0)
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}
