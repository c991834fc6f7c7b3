//! 3MF (3D Manufacturing Format) decoding.
//!
//! A 3MF file is a ZIP archive whose root model part (normally
//! `3D/3dmodel.model`) is XML describing objects and a build. An object is
//! either a `<mesh>` of `<vertex>` and `<triangle>` elements or a list of
//! `<component>` references to other objects. Slicers put the meshes in
//! separate parts such as `3D/Objects/object_1.model` and reference them
//! with the production extension's `p:path` attribute.
//!
//! Every build item is instantiated with its `transform`, components are
//! resolved recursively with their own transforms, and the result is one
//! mesh. Mirrored instances have their winding flipped so they still add
//! positive volume. Without a build, every object that no component
//! references is used as-is.
//!
//! # Units
//!
//! The root `<model unit="...">` attribute is honored: coordinates are
//! scaled to millimeters so volumes from 3MF and STL uploads are comparable.
//!
//! # Limitations
//!
//! - Materials, colors, and textures are ignored
//! - Beam lattices and slice stacks are ignored

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use mesh_types::{IndexedMesh, Point3, Vertex};
use quick_xml::Reader;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use tracing::debug;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{IoError, IoResult};

/// 3MF core namespace URI.
const NAMESPACE_3MF: &str = "http://schemas.microsoft.com/3dmanufacturing/core/2015/02";

/// Standard locations of the root model part.
const MODEL_PATHS: [&str; 3] = ["3D/3dmodel.model", "3d/3dmodel.model", "3D/3DModel.model"];

/// Components nested deeper than this are treated as a reference cycle.
const MAX_COMPONENT_DEPTH: usize = 32;

/// Parse a 3MF model from bytes.
///
/// All build items are instantiated into one mesh, scaled to millimeters.
///
/// # Errors
///
/// Returns an error if the bytes are not a ZIP archive, no model part is
/// present, a referenced part or object is missing, the XML is malformed,
/// a transform is not twelve numbers, or the unit is not a 3MF unit.
pub fn parse_3mf(bytes: &[u8]) -> IoResult<IndexedMesh> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| IoError::invalid_content(format!("invalid ZIP archive: {e}")))?;

    let root = root_part_name(&archive)?;
    let mut parts = BTreeMap::new();
    let mut pending = vec![root.clone()];
    while let Some(name) = pending.pop() {
        if parts.contains_key(&name) {
            continue;
        }
        let part = parse_part(&read_part(&mut archive, &name)?)?;
        pending.extend(
            part.referenced_parts()
                .filter(|path| !parts.contains_key(*path))
                .map(str::to_string),
        );
        parts.insert(name, part);
    }

    assemble(&root, &parts)
}

/// Load a 3MF model from a file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the path does not exist, otherwise
/// any error from [`parse_3mf`].
pub fn load_3mf<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| IoError::from_open(e, path))?;
    parse_3mf(&bytes)
}

fn root_part_name<R: Read + Seek>(archive: &ZipArchive<R>) -> IoResult<String> {
    MODEL_PATHS
        .iter()
        .find(|p| archive.index_for_name(p).is_some())
        .map(|p| (*p).to_string())
        .or_else(|| {
            archive.file_names().find_map(|n| {
                Path::new(n)
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("model"))
                    .then(|| n.to_string())
            })
        })
        .ok_or_else(|| IoError::invalid_content("3MF archive does not contain a model file"))
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> IoResult<String> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| IoError::invalid_content(format!("failed to read 3MF part '{name}': {e}")))?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

/// Archive entry name for a part path (`/3D/x.model` → `3D/x.model`).
fn part_name(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}

/// Millimeters per model unit, per the 3MF core specification.
fn unit_scale(unit: &str) -> IoResult<f64> {
    match unit {
        "micron" => Ok(0.001),
        "millimeter" => Ok(1.0),
        "centimeter" => Ok(10.0),
        "inch" => Ok(25.4),
        "foot" => Ok(304.8),
        "meter" => Ok(1000.0),
        other => Err(IoError::invalid_content(format!("unknown 3MF unit '{other}'"))),
    }
}

/// Affine transform in 3MF row-vector form: `p' = p · M`.
///
/// Rows 0 to 2 are the linear part, row 3 the translation.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Transform {
    rows: [[f64; 3]; 4],
}

impl Transform {
    const IDENTITY: Self = Self {
        rows: [
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0],
        ],
    };

    const fn uniform_scale(factor: f64) -> Self {
        Self {
            rows: [
                [factor, 0.0, 0.0],
                [0.0, factor, 0.0],
                [0.0, 0.0, factor],
                [0.0, 0.0, 0.0],
            ],
        }
    }

    /// Parse `"m00 m01 m02 m10 m11 m12 m20 m21 m22 m30 m31 m32"`.
    fn parse(text: &str) -> IoResult<Self> {
        let values = text
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()?;
        if values.len() != 12 || values.iter().any(|v| !v.is_finite()) {
            return Err(IoError::invalid_content(format!(
                "3MF transform needs 12 finite numbers, got '{text}'"
            )));
        }
        let mut rows = [[0.0; 3]; 4];
        for (row, chunk) in rows.iter_mut().zip(values.chunks_exact(3)) {
            row.copy_from_slice(chunk);
        }
        Ok(Self { rows })
    }

    fn linear(&self, v: [f64; 3]) -> [f64; 3] {
        let r = &self.rows;
        [0, 1, 2].map(|j| v[0] * r[0][j] + v[1] * r[1][j] + v[2] * r[2][j])
    }

    fn apply(&self, p: &Point3<f64>) -> Point3<f64> {
        let [x, y, z] = self.linear([p.x, p.y, p.z]);
        let t = self.rows[3];
        Point3::new(x + t[0], y + t[1], z + t[2])
    }

    /// `self` followed by `outer`.
    fn then(&self, outer: &Self) -> Self {
        let r = &self.rows;
        let t = outer.linear(r[3]);
        let ot = outer.rows[3];
        Self {
            rows: [
                outer.linear(r[0]),
                outer.linear(r[1]),
                outer.linear(r[2]),
                [t[0] + ot[0], t[1] + ot[1], t[2] + ot[2]],
            ],
        }
    }

    fn determinant(&self) -> f64 {
        let [a, b, c] = [self.rows[0], self.rows[1], self.rows[2]];
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }
}

/// A reference to an object, from a build item or a component.
#[derive(Debug, Clone, PartialEq)]
struct ObjectRef {
    /// Part holding the object; `None` means the referencing part.
    part: Option<String>,
    object_id: u32,
    transform: Transform,
}

#[derive(Debug, Clone, PartialEq)]
enum ObjectContent {
    Empty,
    Mesh(IndexedMesh),
    Components(Vec<ObjectRef>),
}

/// One parsed model part, coordinates still in model units.
#[derive(Debug, Default)]
struct ModelPart {
    unit_scale: Option<f64>,
    objects: Vec<(u32, ObjectContent)>,
    build: Vec<ObjectRef>,
}

impl ModelPart {
    fn object(&self, id: u32) -> Option<&ObjectContent> {
        self.objects
            .iter()
            .find_map(|(object_id, content)| (*object_id == id).then_some(content))
    }

    fn components(&self) -> impl Iterator<Item = &ObjectRef> {
        self.objects.iter().flat_map(|(_, content)| match content {
            ObjectContent::Components(refs) => refs.as_slice(),
            _ => &[][..],
        })
    }

    fn referenced_parts(&self) -> impl Iterator<Item = &str> {
        self.build
            .iter()
            .chain(self.components())
            .filter_map(|r| r.part.as_deref())
    }
}

fn object_ref(element: &BytesStart<'_>) -> IoResult<ObjectRef> {
    let object_id = required(element, b"objectid")?
        .parse::<u32>()
        .map_err(|e| IoError::invalid_content(format!("invalid objectid: {e}")))?;
    let transform = match attribute(element, b"transform")? {
        Some(text) => Transform::parse(&text)?,
        None => Transform::IDENTITY,
    };
    Ok(ObjectRef {
        part: attribute(element, b"path")?.map(|p| part_name(&p)),
        object_id,
        transform,
    })
}

fn parse_part(content: &str) -> IoResult<ModelPart> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut part = ModelPart::default();
    let mut current: Option<(u32, ObjectContent)> = None;
    let mut in_vertices = false;
    let mut in_triangles = false;
    let mut in_build = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"object" => {
                let id = required(e, b"id")?
                    .parse::<u32>()
                    .map_err(|err| IoError::invalid_content(format!("invalid object id: {err}")))?;
                current = Some((id, ObjectContent::Empty));
            }
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"model" => {
                    if let Some(unit) = attribute(e, b"unit")? {
                        part.unit_scale = Some(unit_scale(&unit)?);
                    }
                }
                b"mesh" => {
                    if let Some((_, content)) = current.as_mut() {
                        *content = ObjectContent::Mesh(IndexedMesh::new());
                    }
                }
                b"components" => {
                    if let Some((_, content)) = current.as_mut() {
                        *content = ObjectContent::Components(Vec::new());
                    }
                }
                b"vertices" => in_vertices = true,
                b"triangles" => in_triangles = true,
                b"build" => in_build = true,
                b"vertex" if in_vertices => {
                    if let Some((_, ObjectContent::Mesh(mesh))) = current.as_mut() {
                        let x: f64 = required(e, b"x")?.parse()?;
                        let y: f64 = required(e, b"y")?.parse()?;
                        let z: f64 = required(e, b"z")?.parse()?;
                        mesh.vertices.push(Vertex::from_coords(x, y, z));
                    }
                }
                b"triangle" if in_triangles => {
                    if let Some((_, ObjectContent::Mesh(mesh))) = current.as_mut() {
                        let mut face = [0u32; 3];
                        for (slot, key) in face.iter_mut().zip([&b"v1"[..], &b"v2"[..], &b"v3"[..]])
                        {
                            *slot = required(e, key)?.parse().map_err(|err| {
                                IoError::invalid_content(format!("invalid triangle index: {err}"))
                            })?;
                        }
                        mesh.faces.push(face);
                    }
                }
                b"component" => {
                    if let Some((_, ObjectContent::Components(refs))) = current.as_mut() {
                        refs.push(object_ref(e)?);
                    }
                }
                b"item" if in_build => part.build.push(object_ref(e)?),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"object" => {
                    if let Some(object) = current.take() {
                        part.objects.push(object);
                    }
                }
                b"vertices" => in_vertices = false,
                b"triangles" => in_triangles = false,
                b"build" => in_build = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(IoError::invalid_content(format!("XML parse error: {e}")));
            }
            _ => {}
        }
    }

    Ok(part)
}

/// Instantiate the root part's build into one mesh in millimeters.
fn assemble(root: &str, parts: &BTreeMap<String, ModelPart>) -> IoResult<IndexedMesh> {
    let root_part = parts
        .get(root)
        .ok_or_else(|| IoError::invalid_content(format!("3MF part '{root}' not found")))?;
    let scale = root_part.unit_scale.unwrap_or(1.0);
    let units = Transform::uniform_scale(scale);

    let mut mesh = IndexedMesh::new();
    if root_part.build.is_empty() {
        let referenced: Vec<u32> = root_part
            .components()
            .filter(|r| r.part.as_deref().is_none_or(|p| p == root))
            .map(|r| r.object_id)
            .collect();
        for (id, _) in &root_part.objects {
            if !referenced.contains(id) {
                instantiate(parts, root, *id, &units, 0, &mut mesh)?;
            }
        }
    } else {
        for item in &root_part.build {
            let part = item.part.as_deref().unwrap_or(root);
            let transform = item.transform.then(&units);
            instantiate(parts, part, item.object_id, &transform, 0, &mut mesh)?;
        }
    }

    debug!(
        parts = parts.len(),
        build_items = root_part.build.len(),
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        scale,
        "Parsed 3MF model"
    );
    Ok(mesh)
}

fn instantiate(
    parts: &BTreeMap<String, ModelPart>,
    part: &str,
    object_id: u32,
    transform: &Transform,
    depth: usize,
    out: &mut IndexedMesh,
) -> IoResult<()> {
    if depth > MAX_COMPONENT_DEPTH {
        return Err(IoError::invalid_content(
            "3MF components nest too deeply (reference cycle?)",
        ));
    }
    let object = parts
        .get(part)
        .and_then(|p| p.object(object_id))
        .ok_or_else(|| {
            IoError::invalid_content(format!("3MF object {object_id} not found in '{part}'"))
        })?;

    match object {
        ObjectContent::Empty => Ok(()),
        ObjectContent::Mesh(source) => append_instance(source, transform, out),
        ObjectContent::Components(refs) => refs.iter().try_for_each(|r| {
            let child_part = r.part.as_deref().unwrap_or(part);
            let child_transform = r.transform.then(transform);
            instantiate(parts, child_part, r.object_id, &child_transform, depth + 1, out)
        }),
    }
}

fn append_instance(source: &IndexedMesh, transform: &Transform, out: &mut IndexedMesh) -> IoResult<()> {
    let count = source.vertices.len();
    let offset = u32::try_from(out.vertices.len())
        .ok()
        .filter(|offset| u32::try_from(count).is_ok_and(|n| offset.checked_add(n).is_some()))
        .ok_or_else(|| IoError::invalid_content("too many vertices"))?;

    let mirrored = transform.determinant() < 0.0;
    for (index, face) in source.faces.iter().enumerate() {
        if let Some(&bad) = face.iter().find(|&&v| v as usize >= count) {
            return Err(IoError::invalid_content(format!(
                "triangle {index} references vertex {bad}, object has {count}"
            )));
        }
        let [a, b, c] = face.map(|v| v + offset);
        out.faces.push(if mirrored { [a, c, b] } else { [a, b, c] });
    }
    out.vertices.extend(
        source
            .vertices
            .iter()
            .map(|v| Vertex::new(transform.apply(&v.position))),
    );
    Ok(())
}

fn attribute(element: &BytesStart<'_>, name: &[u8]) -> IoResult<Option<String>> {
    for attr in element.attributes() {
        let attr =
            attr.map_err(|e| IoError::invalid_content(format!("malformed attribute: {e}")))?;
        if attr.key.local_name().as_ref() == name {
            let value = std::str::from_utf8(&attr.value).map_err(|e| {
                IoError::invalid_content(format!("invalid UTF-8 in attribute: {e}"))
            })?;
            return Ok(Some(value.to_string()));
        }
    }
    Ok(None)
}

fn required(element: &BytesStart<'_>, name: &[u8]) -> IoResult<String> {
    attribute(element, name)?.ok_or_else(|| {
        IoError::invalid_content(format!(
            "<{}> is missing attribute '{}'",
            String::from_utf8_lossy(element.local_name().as_ref()),
            String::from_utf8_lossy(name)
        ))
    })
}

/// Write a mesh as a single-object 3MF archive in millimeters.
///
/// # Errors
///
/// Returns an error if the archive or XML cannot be written.
pub fn write_3mf<W: Write + Seek>(mesh: &IndexedMesh, writer: W) -> IoResult<()> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", RELS_XML.to_string()),
        ("3D/3dmodel.model", model_xml(mesh)?),
    ] {
        zip.start_file(name, options)
            .map_err(|e| IoError::invalid_content(format!("failed to create {name}: {e}")))?;
        zip.write_all(body.as_bytes())?;
    }

    zip.finish()
        .map_err(|e| IoError::invalid_content(format!("failed to finalize ZIP archive: {e}")))?;
    Ok(())
}

/// Save a mesh to a 3MF file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_3mf<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let file = File::create(path)?;
    write_3mf(mesh, BufWriter::new(file))
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Target="/3D/3dmodel.model" Id="rel0" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel"/>
</Relationships>"#;

fn model_xml(mesh: &IndexedMesh) -> IoResult<String> {
    let mut writer = quick_xml::Writer::new_with_indent(Vec::new(), b' ', 2);
    let mut emit = |event: Event<'_>| {
        writer
            .write_event(event)
            .map_err(|e| IoError::invalid_content(format!("failed to write XML: {e}")))
    };

    emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut model = BytesStart::new("model");
    model.push_attribute(("xmlns", NAMESPACE_3MF));
    model.push_attribute(("unit", "millimeter"));
    emit(Event::Start(model))?;
    emit(Event::Start(BytesStart::new("resources")))?;

    let mut object = BytesStart::new("object");
    object.push_attribute(("id", "1"));
    object.push_attribute(("type", "model"));
    emit(Event::Start(object))?;
    emit(Event::Start(BytesStart::new("mesh")))?;

    emit(Event::Start(BytesStart::new("vertices")))?;
    for v in &mesh.vertices {
        let mut vertex = BytesStart::new("vertex");
        vertex.push_attribute(("x", v.position.x.to_string().as_str()));
        vertex.push_attribute(("y", v.position.y.to_string().as_str()));
        vertex.push_attribute(("z", v.position.z.to_string().as_str()));
        emit(Event::Empty(vertex))?;
    }
    emit(Event::End(BytesEnd::new("vertices")))?;

    emit(Event::Start(BytesStart::new("triangles")))?;
    for &[v1, v2, v3] in &mesh.faces {
        let mut triangle = BytesStart::new("triangle");
        triangle.push_attribute(("v1", v1.to_string().as_str()));
        triangle.push_attribute(("v2", v2.to_string().as_str()));
        triangle.push_attribute(("v3", v3.to_string().as_str()));
        emit(Event::Empty(triangle))?;
    }
    emit(Event::End(BytesEnd::new("triangles")))?;

    emit(Event::End(BytesEnd::new("mesh")))?;
    emit(Event::End(BytesEnd::new("object")))?;
    emit(Event::End(BytesEnd::new("resources")))?;

    emit(Event::Start(BytesStart::new("build")))?;
    let mut item = BytesStart::new("item");
    item.push_attribute(("objectid", "1"));
    emit(Event::Empty(item))?;
    emit(Event::End(BytesEnd::new("build")))?;
    emit(Event::End(BytesEnd::new("model")))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| IoError::invalid_content(format!("invalid UTF-8 in generated XML: {e}")))
}
