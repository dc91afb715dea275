use std::fs;
use std::path::Path;

use log::{ debug, warn };

use crate::tuple::Tuple4D;
use crate::shape::Shape;
use crate::error::{ Error, Result };

/// One corner of a face: a vertex index and an optional normal index, both
/// one-based as written in the file.
type ObjCorner = (usize, Option<usize>);

/// Name of the group faces land in before any `g` record.
const DEFAULT_GROUP: &str = "";

/// A parser for a subset of Wavefront OBJ.
///
/// A sample OBJ file may look like the following:
///
/// ```obj
/// v -1 1 0
/// v -1 0 0
/// v 1 0 0
/// v 1 1 0
///
/// g FirstGroup
/// f 1 2 3
/// g SecondGroup
/// f 1 3 4
/// ```
///
/// The first word of each line stands for a command, and all words after it
/// are arguments to said command.
///
/// Command `v` specifies a **v**ertex in space, as a point, and `vn` a vertex
/// normal. Command `f` specifies a **f**ace, composed of vertices, optionally
/// with texture and normal indices (`f 1/2/3 ...` or `f 1//3 ...`).
///
/// Command `g` specifies a named **g**roup, which contains several faces.
/// Note that groups do not nest; in the above example, `SecondGroup` is
/// separate from `FirstGroup` (i.e. `SecondGroup` is not a child group).
#[derive(Clone, Debug, Default)]
pub struct ObjParser {
    /// Lines which were skipped: blank lines, unsupported commands and faces
    /// referring to vertices or normals that don't exist.
    pub ignored_lines: usize,

    pub vertices: Vec<Tuple4D>,
    pub normals: Vec<Tuple4D>,

    /// Groups in the order their first face appears in the file.
    groups: Vec<(String, Vec<Shape>)>,
}

impl ObjParser {
    /// Parses OBJ source text.
    ///
    /// Fails on a `v` or `vn` record with missing or malformed coordinates.
    ///
    /// ```
    /// # use whitted_tracer::obj::ObjParser;
    /// let obj = ObjParser::parse_str("v 0 1 0\nv -1 0 0\nv 1 0 0\nf 1 2 3\n")
    ///     .unwrap();
    /// assert_eq!(obj.vertices.len(), 3);
    /// assert_eq!(obj.group("").unwrap().len(), 1);
    /// ```
    pub fn parse_str(source: &str) -> Result<ObjParser> {
        let mut parser = ObjParser::default();
        let mut current_group = String::from(DEFAULT_GROUP);

        for (index, line) in source.lines().enumerate() {
            parser.handle_command(index + 1, line, &mut current_group)?;
        }

        debug!("Parsed OBJ: {} vertices, {} normals, {} triangles in {} groups, \
            {} lines ignored",
            parser.vertices.len(), parser.normals.len(),
            parser.groups.iter().map(|(_, t)| t.len()).sum::<usize>(),
            parser.groups.len(), parser.ignored_lines);

        Ok(parser)
    }

    /// Reads and parses the OBJ file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ObjParser> {
        let source = fs::read_to_string(path.as_ref())?;
        debug!("Loading OBJ file {:?}", path.as_ref());

        ObjParser::parse_str(&source)
    }

    /// The triangles of the group named `name`. Faces listed before any `g`
    /// record belong to the group named `""`.
    pub fn group(&self, name: &str) -> Option<&[Shape]> {
        self.groups.iter()
            .find(|(group, _)| group == name)
            .map(|(_, triangles)| triangles.as_slice())
    }

    /// Names of every group holding at least one triangle, in file order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    /// Builds one group per OBJ group, in file order, wrapped in a parent
    /// group.
    pub fn into_group(self) -> Shape {
        Shape::group(
            self.groups.into_iter()
                .map(|(_, triangles)| Shape::group(triangles))
                .collect()
        )
    }

    fn handle_command(&mut self, line_no: usize, line: &str,
        current_group: &mut String) -> Result<()> {
        let mut params = line.split_whitespace();

        match params.next() {
            Some("v") => {
                let [x, y, z] = Self::coordinates(line_no, params)?;
                self.vertices.push(Tuple4D::point(x, y, z));
            },

            Some("vn") => {
                let [x, y, z] = Self::coordinates(line_no, params)?;
                self.normals.push(Tuple4D::vector(x, y, z));
            },

            Some("f") => {
                let face = match self.face(params) {
                    Some(face) => face,
                    None => {
                        warn!("Skipping invalid OBJ face on line {}", line_no);
                        self.ignored_lines += 1;
                        return Ok(());
                    },
                };

                // Build triangles from the face, and add said triangles to the
                // currently-specified group.
                let triangles = self.fan_triangulation(&face)?;
                match self.groups.iter_mut()
                    .find(|(name, _)| name == current_group) {
                    Some((_, group)) => group.extend(triangles),
                    None => self.groups.push((current_group.clone(), triangles)),
                }
            },

            Some("g") => match params.next() {
                Some(name) => *current_group = name.into(),
                None => self.ignored_lines += 1,
            },

            // Blank lines and unrecognized commands
            _ => self.ignored_lines += 1,
        }

        Ok(())
    }

    fn coordinates<'s, I>(line_no: usize, params: I) -> Result<[f64; 3]>
        where I: Iterator<Item = &'s str> {
        let values = params.take(3)
            .map(|p| p.parse::<f64>().map_err(|e| Error::Obj {
                line: line_no,
                message: format!("bad coordinate {:?}: {}", p, e),
            }))
            .collect::<Result<Vec<f64>>>()?;

        match values.as_slice() {
            &[x, y, z] => Ok([x, y, z]),
            _ => Err(Error::Obj {
                line: line_no,
                message: format!("expected 3 coordinates, got {}", values.len()),
            }),
        }
    }

    /// Parses the corners of a face. `None` if the face has fewer than three
    /// corners, or any corner is malformed or refers to a vertex or normal that
    /// hasn't been defined yet.
    fn face<'s, I>(&self, params: I) -> Option<Vec<ObjCorner>>
        where I: Iterator<Item = &'s str> {
        let face = params
            .map(|corner| self.corner(corner))
            .collect::<Option<Vec<ObjCorner>>>()?;

        if face.len() < 3 {
            None
        } else {
            Some(face)
        }
    }

    fn corner(&self, corner: &str) -> Option<ObjCorner> {
        let mut attributes = corner.split('/');

        let vertex: usize = attributes.next()?.parse().ok()?;
        if vertex == 0 || vertex > self.vertices.len() {
            return None;
        }

        // The texture index is not used
        let _texture = attributes.next();

        let normal = match attributes.next() {
            None | Some("") => None,
            Some(n) => {
                let n: usize = n.parse().ok()?;
                if n == 0 || n > self.normals.len() {
                    return None;
                }
                Some(n)
            },
        };

        if attributes.next().is_some() {
            return None;
        }

        Some((vertex, normal))
    }

    /// Partitions a polygon into triangles.
    ///
    /// In an OBJ file, faces can be specified like so:
    ///
    /// ```obj
    /// f 1 2 3 4 5
    /// ```
    ///
    /// This face references vertices 1, 2, 3, 4 and 5. Typically, these
    /// vertices would make a pentagon of some sort.
    ///
    /// Since we only have triangle primitives, this is done with a "fan
    /// triangulation". Observe the following diagram:
    ///
    /// ```text
    ///         B *
    ///          / \
    ///         /   \
    ///        /     \
    ///     A *       * C
    ///       |       |
    ///       |       |
    ///       |       |
    ///     E * ----- * D
    /// ```
    ///
    /// Starting at `A`, we make a triangle `A-B-C`, then a triangle `A-C-D`,
    /// and finally a triangle `A-D-E`. The first vertex stays fixed and
    /// "rides" the edges of the shape.
    ///
    /// A triangle whose three corners all carry normals is smooth.
    fn fan_triangulation(&self, face: &[ObjCorner]) -> Result<Vec<Shape>> {
        let vertex = |corner: &ObjCorner| self.vertices[corner.0 - 1];
        let mut triangles = Vec::with_capacity(face.len() - 2);

        for i in 1..(face.len() - 1) {
            let (a, b, c) = (&face[0], &face[i], &face[i + 1]);

            let triangle = match (a.1, b.1, c.1) {
                (Some(n1), Some(n2), Some(n3)) => Shape::smooth_triangle(
                    vertex(a), vertex(b), vertex(c),
                    self.normals[n1 - 1],
                    self.normals[n2 - 1],
                    self.normals[n3 - 1],
                )?,
                _ => Shape::triangle(vertex(a), vertex(b), vertex(c))?,
            };

            triangles.push(triangle);
        }

        Ok(triangles)
    }
}

#[test]
fn ignoring_unrecognized_lines() {
    let gibberish = "There was a young lady named Bright\n\
        who traveled much faster than light.\n\
        She set out one day\n\
        in a relative way,\n\
        and came back the previous night.\n";
    let obj = ObjParser::parse_str(gibberish).unwrap();

    assert_eq!(obj.ignored_lines, 5);
    assert!(obj.vertices.is_empty());
}

#[test]
fn vertex_records() {
    let obj = ObjParser::parse_str(
        "v -1 1 0\nv -1.0000 0.5000 0.0000\nv 1 0 0\nv 1 1 0\n"
    ).unwrap();

    assert_eq!(obj.vertices[0], Tuple4D::point(-1.0, 1.0, 0.0));
    assert_eq!(obj.vertices[1], Tuple4D::point(-1.0, 0.5, 0.0));
    assert_eq!(obj.vertices[2], Tuple4D::point( 1.0, 0.0, 0.0));
    assert_eq!(obj.vertices[3], Tuple4D::point( 1.0, 1.0, 0.0));
}

#[test]
fn malformed_vertex_records_are_errors() {
    let bad_number = ObjParser::parse_str("v 0 0 0\nv 1 x 0\n");
    assert!(matches!(bad_number, Err(Error::Obj { line: 2, .. })));

    let too_short = ObjParser::parse_str("vn 1 0\n");
    assert!(matches!(too_short, Err(Error::Obj { line: 1, .. })));
}

#[test]
fn parsing_triangle_faces() {
    let obj = ObjParser::parse_str(
        "v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\n\nf 1 2 3\nf 1 3 4\n"
    ).unwrap();

    let children = obj.group(DEFAULT_GROUP).unwrap();
    let t1 = children[0].triangle_info().unwrap();
    let t2 = children[1].triangle_info().unwrap();

    assert_eq!(t1.p1, obj.vertices[0]);
    assert_eq!(t1.p2, obj.vertices[1]);
    assert_eq!(t1.p3, obj.vertices[2]);
    assert_eq!(t2.p1, obj.vertices[0]);
    assert_eq!(t2.p2, obj.vertices[2]);
    assert_eq!(t2.p3, obj.vertices[3]);
    assert_eq!(obj.ignored_lines, 1);
}

#[test]
fn triangulating_polygons() {
    let obj = ObjParser::parse_str(
        "v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\nv 0 2 0\n\nf 1 2 3 4 5\n"
    ).unwrap();

    let children = obj.group(DEFAULT_GROUP).unwrap();
    assert_eq!(children.len(), 3);

    let t1 = children[0].triangle_info().unwrap();
    let t2 = children[1].triangle_info().unwrap();
    let t3 = children[2].triangle_info().unwrap();

    assert_eq!(t1.p1, obj.vertices[0]);
    assert_eq!(t1.p2, obj.vertices[1]);
    assert_eq!(t1.p3, obj.vertices[2]);
    assert_eq!(t2.p1, obj.vertices[0]);
    assert_eq!(t2.p2, obj.vertices[2]);
    assert_eq!(t2.p3, obj.vertices[3]);
    assert_eq!(t3.p1, obj.vertices[0]);
    assert_eq!(t3.p2, obj.vertices[3]);
    assert_eq!(t3.p3, obj.vertices[4]);
}

#[cfg(test)]
const GROUPED_TRIANGLES: &str = "v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\n\
    \ng FirstGroup\nf 1 2 3\ng SecondGroup\nf 1 3 4\n";

#[test]
fn triangles_in_groups() {
    let obj = ObjParser::parse_str(GROUPED_TRIANGLES).unwrap();

    let names: Vec<&str> = obj.group_names().collect();
    assert_eq!(names, vec!["FirstGroup", "SecondGroup"]);

    let t1 = obj.group("FirstGroup").unwrap()[0].triangle_info().unwrap();
    let t2 = obj.group("SecondGroup").unwrap()[0].triangle_info().unwrap();

    assert_eq!(t1.p2, obj.vertices[1]);
    assert_eq!(t2.p2, obj.vertices[2]);
    assert!(obj.group(DEFAULT_GROUP).is_none());
}

#[test]
fn groups_keep_file_order() {
    let obj = ObjParser::parse_str(
        "v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\n\
        g Zeta\nf 1 2 3\ng Alpha\nf 1 3 4\ng Zeta\nf 1 2 4\nf 1 2 3\n"
    ).unwrap();

    let names: Vec<&str> = obj.group_names().collect();
    assert_eq!(names, vec!["Zeta", "Alpha"]);
    assert_eq!(obj.group("Zeta").unwrap().len(), 3);

    let group = obj.into_group();
    let children = group.children().unwrap();
    assert_eq!(children[0].children().unwrap().len(), 3);
    assert_eq!(children[1].children().unwrap().len(), 1);
}

#[test]
fn converting_obj_to_group() {
    let obj = ObjParser::parse_str(GROUPED_TRIANGLES).unwrap();
    let group = obj.into_group();

    let children = group.children().unwrap();
    assert_eq!(children.len(), 2);
    for child in children {
        assert_eq!(child.children().unwrap().len(), 1);
    }
}

#[test]
fn faces_with_unknown_vertices_are_skipped() {
    let obj = ObjParser::parse_str(
        "v 0 1 0\nv -1 0 0\nv 1 0 0\nf 1 2 4\nf 0 1 2\nf 1 2\nf 1 2 3\n"
    ).unwrap();

    assert_eq!(obj.ignored_lines, 3);
    assert_eq!(obj.group(DEFAULT_GROUP).unwrap().len(), 1);
}

#[test]
fn vertex_normal_records() {
    let obj = ObjParser::parse_str(
        "vn 0 0 1\nvn 0.707 0 -0.707\nvn 1 2 3\n"
    ).unwrap();

    assert_eq!(obj.normals[0], Tuple4D::vector(0.0, 0.0, 1.0));
    assert_eq!(obj.normals[1], Tuple4D::vector(0.707, 0.0, -0.707));
    assert_eq!(obj.normals[2], Tuple4D::vector(1.0, 2.0, 3.0));
}

#[test]
fn faces_with_normals() {
    let obj = ObjParser::parse_str(
        "v 0 1 0\nv -1 0 0\nv 1 0 0\n\
        vn -1 0 0\nvn 1 0 0\nvn 0 1 0\n\
        f 1//3 2//1 3//2\nf 1/0/3 2/102/1 3/14/2\n"
    ).unwrap();

    let children = obj.group(DEFAULT_GROUP).unwrap();
    let t1 = children[0].smooth_triangle_info().unwrap();
    let t2 = children[1].smooth_triangle_info().unwrap();

    assert_eq!(t1.triangle_info.p1, obj.vertices[0]);
    assert_eq!(t1.triangle_info.p2, obj.vertices[1]);
    assert_eq!(t1.triangle_info.p3, obj.vertices[2]);
    assert_eq!(t1.n1, obj.normals[2]);
    assert_eq!(t1.n2, obj.normals[0]);
    assert_eq!(t1.n3, obj.normals[1]);
    assert_eq!(t1, t2);
}

#[test]
fn missing_obj_file_is_an_io_error() {
    let result = ObjParser::from_file("./no/such/model.obj");

    assert!(matches!(result, Err(Error::Io(_))));
}
