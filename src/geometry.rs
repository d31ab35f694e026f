//! Linear geometries and their GeoPackage binary encoding.
//!
//! A GeoPackage geometry blob is a small header (magic `GP`, version, flags,
//! SRS id, envelope) followed by standard WKB. Only little-endian LINESTRINGs
//! with an XY envelope are written; that is all the profile stores.

use crate::error::{Error, Result};
use crate::schema::types::BRITISH_NATIONAL_GRID;

const MAGIC: [u8; 2] = *b"GP";
const VERSION: u8 = 0;
/// Little-endian, envelope `[minx, maxx, miny, maxy]`, not empty
const FLAGS_LE_XY_ENVELOPE: u8 = 0b0000_0011;
const WKB_LITTLE_ENDIAN: u8 = 1;
const WKB_LINESTRING: u32 = 2;

/// British National Grid bounds, in metres
pub const BNG_EXTENT: Envelope = Envelope {
    min_x: 0.0,
    max_x: 700_000.0,
    min_y: 0.0,
    max_y: 1_300_000.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Envelope {
    pub fn contains(&self, other: &Envelope) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }
}

/// A LINESTRING tagged with its SRS
#[derive(Debug, Clone, PartialEq)]
pub struct LineString {
    pub srs_id: i32,
    pub points: Vec<Point>,
}

impl LineString {
    /// A line in British National Grid coordinates
    pub fn bng(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self {
            srs_id: BRITISH_NATIONAL_GRID,
            points: points.into_iter().map(Point::from).collect(),
        }
    }

    pub fn envelope(&self) -> Option<Envelope> {
        let first = self.points.first()?;
        let init = Envelope {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        Some(self.points.iter().fold(init, |env, p| Envelope {
            min_x: env.min_x.min(p.x),
            max_x: env.max_x.max(p.x),
            min_y: env.min_y.min(p.y),
            max_y: env.max_y.max(p.y),
        }))
    }

    /// Check the line is non-empty, simple and open.
    ///
    /// Rejects fewer than two vertices, non-finite ordinates, repeated
    /// consecutive vertices, closed rings and any crossing or touching of
    /// non-adjacent segments.
    pub fn validate(&self) -> Result<()> {
        if self.points.len() < 2 {
            return Err(Error::InvalidGeometry(format!(
                "linestring needs at least 2 points, got {}",
                self.points.len()
            )));
        }
        if let Some(p) = self.points.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(Error::InvalidGeometry(format!("non-finite ordinate in {p:?}")));
        }
        if let Some(w) = self.points.windows(2).find(|w| w[0] == w[1]) {
            return Err(Error::InvalidGeometry(format!("repeated vertex {:?}", w[0])));
        }
        if self.points.first() == self.points.last() {
            return Err(Error::InvalidGeometry("linestring is closed".to_string()));
        }

        let segments: Vec<(Point, Point)> =
            self.points.windows(2).map(|w| (w[0], w[1])).collect();
        for i in 0..segments.len() {
            for j in (i + 1)..segments.len() {
                let (a, b) = segments[i];
                let (c, d) = segments[j];
                let touches = if j == i + 1 {
                    // Adjacent segments share `b == c`; they may only meet there
                    collinear_overlap(a, b, d)
                } else {
                    segments_intersect(a, b, c, d)
                };
                if touches {
                    return Err(Error::InvalidGeometry(format!(
                        "segments {i} and {j} intersect"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Validate, and check the SRS and extent match the column's
    pub fn validate_for(&self, srs_id: i32) -> Result<()> {
        if self.srs_id != srs_id {
            return Err(Error::WrongSrs {
                expected: srs_id,
                found: self.srs_id,
            });
        }
        self.validate()?;
        if srs_id == BRITISH_NATIONAL_GRID {
            let env = self.envelope().ok_or_else(|| {
                Error::InvalidGeometry("empty linestring".to_string())
            })?;
            if !BNG_EXTENT.contains(&env) {
                return Err(Error::InvalidGeometry(format!(
                    "{env:?} lies outside the British National Grid"
                )));
            }
        }
        Ok(())
    }

    /// Encode as a GeoPackage geometry blob
    pub fn to_gpkg(&self) -> Result<Vec<u8>> {
        let env = self
            .envelope()
            .ok_or_else(|| Error::InvalidGeometry("empty linestring".to_string()))?;
        let mut buf = Vec::with_capacity(8 + 32 + 9 + self.points.len() * 16);

        buf.extend_from_slice(&MAGIC);
        buf.push(VERSION);
        buf.push(FLAGS_LE_XY_ENVELOPE);
        buf.extend_from_slice(&self.srs_id.to_le_bytes());
        for v in [env.min_x, env.max_x, env.min_y, env.max_y] {
            buf.extend_from_slice(&v.to_le_bytes());
        }

        buf.push(WKB_LITTLE_ENDIAN);
        buf.extend_from_slice(&WKB_LINESTRING.to_le_bytes());
        buf.extend_from_slice(&(self.points.len() as u32).to_le_bytes());
        for p in &self.points {
            buf.extend_from_slice(&p.x.to_le_bytes());
            buf.extend_from_slice(&p.y.to_le_bytes());
        }

        Ok(buf)
    }

    /// Decode a GeoPackage geometry blob holding a LINESTRING
    pub fn from_gpkg(blob: &[u8]) -> Result<Self> {
        let mut r = Reader::new(blob);

        if r.take(2)? != MAGIC {
            return Err(Error::InvalidGeometry("missing GP magic".to_string()));
        }
        let version = r.u8()?;
        if version != VERSION {
            return Err(Error::InvalidGeometry(format!("unsupported version {version}")));
        }
        let flags = r.u8()?;
        let little = flags & 0b1 == 1;
        let envelope_len = match (flags >> 1) & 0b111 {
            0 => 0,
            1 => 32,
            2 | 3 => 48,
            4 => 64,
            other => {
                return Err(Error::InvalidGeometry(format!("bad envelope indicator {other}")))
            }
        };
        if flags & 0b1_0000 != 0 {
            return Err(Error::InvalidGeometry("empty geometry".to_string()));
        }
        let srs_id = r.i32(little)?;
        r.take(envelope_len)?;

        let wkb_little = r.u8()? == WKB_LITTLE_ENDIAN;
        let kind = r.u32(wkb_little)?;
        if kind != WKB_LINESTRING {
            return Err(Error::InvalidGeometry(format!("wkb type {kind} is not a linestring")));
        }
        let count = r.u32(wkb_little)? as usize;
        let mut points = Vec::with_capacity(count.min(blob.len() / 16));
        for _ in 0..count {
            let x = r.f64(wkb_little)?;
            let y = r.f64(wkb_little)?;
            points.push(Point::new(x, y));
        }

        Ok(Self { srs_id, points })
    }
}

/// Signed area of the triangle `a b c`; zero when collinear
fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// `c` lies within the bounding box of `a b` (assumes collinear)
fn on_segment(a: Point, b: Point, c: Point) -> bool {
    c.x >= a.x.min(b.x) && c.x <= a.x.max(b.x) && c.y >= a.y.min(b.y) && c.y <= a.y.max(b.y)
}

fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);

    if o1 * o2 < 0.0 && o3 * o4 < 0.0 {
        return true;
    }

    (o1 == 0.0 && on_segment(a, b, c))
        || (o2 == 0.0 && on_segment(a, b, d))
        || (o3 == 0.0 && on_segment(c, d, a))
        || (o4 == 0.0 && on_segment(c, d, b))
}

/// Segments `a b` and `b d` fold back over each other
fn collinear_overlap(a: Point, b: Point, d: Point) -> bool {
    if orientation(a, b, d) != 0.0 {
        return false;
    }
    // Collinear: they overlap iff the turn at `b` reverses direction
    let dot = (b.x - a.x) * (d.x - b.x) + (b.y - a.y) * (d.y - b.y);
    dot < 0.0
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos + n;
        let slice = self
            .buf
            .get(self.pos..end)
            .ok_or_else(|| Error::InvalidGeometry("truncated geometry blob".to_string()))?;
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self, little: bool) -> Result<u32> {
        let b = self.array::<4>()?;
        Ok(if little { u32::from_le_bytes(b) } else { u32::from_be_bytes(b) })
    }

    fn i32(&mut self, little: bool) -> Result<i32> {
        let b = self.array::<4>()?;
        Ok(if little { i32::from_le_bytes(b) } else { i32::from_be_bytes(b) })
    }

    fn f64(&mut self, little: bool) -> Result<f64> {
        let b = self.array::<8>()?;
        Ok(if little { f64::from_le_bytes(b) } else { f64::from_be_bytes(b) })
    }
}
