//! STL (Stereolithography) decoding.
//!
//! Uploads arrive as raw bytes, so everything here parses from a slice;
//! the path-based helpers just read the file first.
//!
//! # Format Detection
//!
//! - A file is binary when its length is exactly `84 + 50 * count`, where
//!   `count` is the little-endian `u32` at offset 80. Some exporters write
//!   "solid" into the binary header, so the length check wins.
//! - Otherwise it is ASCII when it starts with `solid` (after whitespace)
//!   and the first 80 bytes contain no NUL.
//! - Anything else is parsed as binary and fails on its own terms.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header (ignored)
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector (ignored)
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count
//! end
//! ```
//!
//! # ASCII Format
//!
//! ```text
//! solid name
//!   facet normal ni nj nk
//!     outer loop
//!       vertex v1x v1y v1z
//!       vertex v2x v2y v2z
//!       vertex v3x v3y v3z
//!     endloop
//!   endfacet
//! endsolid name
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use mesh_types::{IndexedMesh, Vertex};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Header plus the triangle count.
const PREAMBLE_SIZE: usize = HEADER_SIZE + 4;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Parse an STL model from bytes, detecting ASCII vs binary.
///
/// # Errors
///
/// Returns an error if the bytes are empty, a binary body is shorter than
/// its declared triangle count, or an ASCII body has a malformed number
/// or a facet without exactly three vertices.
///
/// # Example
///
/// ```
/// use mesh_io::parse_stl;
///
/// let ascii = b"solid t
/// facet normal 0 0 1
///   outer loop
///     vertex 0 0 0
///     vertex 1 0 0
///     vertex 0 1 0
///   endloop
/// endfacet
/// endsolid t";
///
/// let mesh = parse_stl(ascii).unwrap();
/// assert_eq!(mesh.faces.len(), 1);
/// ```
pub fn parse_stl(bytes: &[u8]) -> IoResult<IndexedMesh> {
    if bytes.is_empty() {
        return Err(IoError::invalid_content("file is empty"));
    }

    if is_ascii_stl(bytes) {
        parse_stl_ascii(bytes)
    } else {
        parse_stl_binary(bytes)
    }
}

/// Load an STL model from a file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the path does not exist, otherwise
/// any error from [`parse_stl`].
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| IoError::from_open(e, path))?;
    parse_stl(&bytes)
}

fn declared_triangle_count(bytes: &[u8]) -> Option<u32> {
    if bytes.len() < PREAMBLE_SIZE {
        return None;
    }
    Some(u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]))
}

fn binary_length_matches(bytes: &[u8]) -> bool {
    declared_triangle_count(bytes).is_some_and(|count| {
        (count as usize)
            .checked_mul(TRIANGLE_SIZE)
            .and_then(|body| body.checked_add(PREAMBLE_SIZE))
            == Some(bytes.len())
    })
}

fn is_ascii_stl(bytes: &[u8]) -> bool {
    if binary_length_matches(bytes) {
        return false;
    }
    let head = &bytes[..bytes.len().min(HEADER_SIZE)];
    if head.contains(&0) {
        return false;
    }
    let start = head
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(head.len());
    head[start..]
        .get(..5)
        .is_some_and(|kw| kw.eq_ignore_ascii_case(b"solid"))
}

fn parse_stl_binary(bytes: &[u8]) -> IoResult<IndexedMesh> {
    let Some(face_count) = declared_triangle_count(bytes) else {
        return Err(IoError::TruncatedHeader {
            required: PREAMBLE_SIZE,
            len: bytes.len(),
        });
    };

    let body = &bytes[PREAMBLE_SIZE..];
    let available = body.len() / TRIANGLE_SIZE;
    if available < face_count as usize {
        return Err(IoError::TruncatedBody {
            declared: face_count,
            complete: u32::try_from(available).unwrap_or(u32::MAX),
        });
    }

    let mut mesh = IndexedMesh::with_capacity(face_count as usize * 3, face_count as usize);
    for record in body.chunks_exact(TRIANGLE_SIZE).take(face_count as usize) {
        // Skip the 12-byte normal, read 3 vertices
        mesh.push_triangle(
            read_vertex(&record[12..24]),
            read_vertex(&record[24..36]),
            read_vertex(&record[36..48]),
        );
    }

    debug!(faces = face_count, "Parsed binary STL");
    Ok(mesh)
}

/// Read a vertex from 12 bytes (3 little-endian f32s).
fn read_vertex(buf: &[u8]) -> Vertex {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    Vertex::from([x, y, z])
}

/// Solid and facet names may be in any 8-bit encoding, so lines are decoded
/// lossily; only the ASCII keywords and numbers matter.
fn parse_stl_ascii(bytes: &[u8]) -> IoResult<IndexedMesh> {
    let mut mesh = IndexedMesh::new();
    let mut in_loop = false;
    let mut corners: Vec<Vertex> = Vec::with_capacity(3);

    for (line_no, raw) in bytes.split(|&b| b == b'\n').enumerate() {
        let line = String::from_utf8_lossy(raw);
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "outer" => {
                in_loop = true;
                corners.clear();
            }
            "vertex" if in_loop => {
                let mut coord = || -> IoResult<f64> {
                    let token = parts.next().ok_or_else(|| {
                        IoError::invalid_content(format!(
                            "line {}: vertex needs three coordinates",
                            line_no + 1
                        ))
                    })?;
                    Ok(token.parse::<f64>()?)
                };
                let (x, y, z) = (coord()?, coord()?, coord()?);
                corners.push(Vertex::from_coords(x, y, z));
            }
            "endloop" => in_loop = false,
            "endfacet" => {
                let [v0, v1, v2] = corners[..] else {
                    return Err(IoError::invalid_content(format!(
                        "line {}: facet has {} vertices, expected 3",
                        line_no + 1,
                        corners.len()
                    )));
                };
                mesh.push_triangle(v0, v1, v2);
                corners.clear();
            }
            "endsolid" => break,
            _ => {}
        }
    }

    debug!(faces = mesh.faces.len(), "Parsed ASCII STL");
    Ok(mesh)
}

/// Write a mesh as binary STL.
///
/// Facet normals are computed from the winding.
///
/// # Errors
///
/// Returns an error if a face references a missing vertex or the writer
/// fails.
pub fn write_stl<W: Write>(mesh: &IndexedMesh, mut writer: W) -> IoResult<()> {
    let mut header = [b' '; HEADER_SIZE];
    let text = b"binary STL written by mesh-io";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    let face_count = u32::try_from(mesh.faces.len())
        .map_err(|_| IoError::invalid_content("too many faces for STL"))?;
    writer.write_all(&face_count.to_le_bytes())?;

    for (face_idx, &[i0, i1, i2]) in mesh.faces.iter().enumerate() {
        let corner = |i: u32| {
            mesh.vertices.get(i as usize).map(|v| v.position).ok_or_else(|| {
                IoError::invalid_content(format!("face {face_idx} references missing vertex {i}"))
            })
        };
        let (v0, v1, v2) = (corner(i0)?, corner(i1)?, corner(i2)?);

        let normal = (v1 - v0).cross(&(v2 - v0));
        let len = normal.norm();
        let normal = if len > f64::EPSILON {
            normal / len
        } else {
            normal * 0.0
        };

        #[allow(clippy::cast_possible_truncation)]
        // Truncation: STL stores f32
        for value in [
            normal.x, normal.y, normal.z, v0.x, v0.y, v0.z, v1.x, v1.y, v1.z, v2.x, v2.y, v2.z,
        ] {
            writer.write_all(&(value as f32).to_le_bytes())?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }

    writer.flush()?;
    Ok(())
}

/// Save a mesh to a binary STL file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_stl<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let file = File::create(path)?;
    write_stl(mesh, BufWriter::new(file))
}
