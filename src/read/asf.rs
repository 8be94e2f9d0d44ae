use super::utilities::*;
use super::LineReader;
use crate::error::{Error, Result, Warning};
use crate::skeleton::{Bone, Skeleton};
use crate::{units, Axis};

use cgmath::{InnerSpace, Vector3};
use log::*;

use std::collections::HashMap;
use std::io::BufRead;

const ASF_VERSION: &str = "1.10";

impl Skeleton {
    /// Reads an ASF skeleton. Warnings are only logged.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        Self::parse_with_warnings(reader).map(|(skeleton, _)| skeleton)
    }

    /// Reads an ASF skeleton, also returning every non-fatal anomaly.
    pub fn parse_with_warnings<R: BufRead>(reader: R) -> Result<(Self, Vec<Warning>)> {
        AsfReader::new(reader).read()
    }
}

struct AsfReader<R> {
    lines: LineReader<R>,
    warnings: Vec<Warning>,
    bones: Vec<Bone>,
    names: HashMap<String, usize>,
    root: Option<usize>,
    root_axis: Vec<Axis>,
    root_order: Vec<Axis>,
    root_position: Vector3<f32>,
    root_orientation: Vector3<f32>,
    length_unit: f32,
    angle_unit: f32,
    mass_default: f32,
    length_default: f32,
}

impl<R: BufRead> AsfReader<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: LineReader::new(reader),
            warnings: vec![],
            bones: vec![],
            names: HashMap::new(),
            root: None,
            root_axis: vec![],
            root_order: vec![],
            root_position: Vector3::new(0., 0., 0.),
            root_orientation: Vector3::new(0., 0., 0.),
            length_unit: units::INCHES_TO_METERS,
            angle_unit: units::RADIANS,
            mass_default: 1.,
            length_default: 1.,
        }
    }

    fn read(mut self) -> Result<(Skeleton, Vec<Warning>)> {
        while let Some(line) = self.lines.next_line()? {
            let header = match line.strip_prefix(':') {
                Some(header) => header.trim(),
                None => {
                    return Err(Error::UnexpectedLine {
                        line: self.lines.line_number(),
                        content: line,
                    })
                }
            };
            let mut words = header.split_whitespace();
            let section = words.next().unwrap_or_default().to_owned();
            let argument = words.next().map(str::to_owned);
            trace!("section :{}", section);

            match &section[..] {
                "version" => self.read_version(argument),
                "units" => self.read_units()?,
                "root" => self.read_root()?,
                "bonedata" => self.read_bonedata()?,
                "hierarchy" => self.read_hierarchy()?,
                name => {
                    if name != "name" && name != "documentation" {
                        let line = self.lines.line_number();
                        self.warn(Warning::UnknownSection { line, name: name.to_owned() });
                    }
                    while self.section_line()?.is_some() {}
                }
            }
        }
        self.finish()
    }

    fn finish(self) -> Result<(Skeleton, Vec<Warning>)> {
        let root = self.root.ok_or(Error::MissingRoot)?;
        let skeleton = Skeleton {
            bones: self.bones,
            names: self.names,
            root,
            root_axis: self.root_axis,
            root_order: self.root_order,
            root_position: self.root_position,
            root_orientation: self.root_orientation,
            length_unit: self.length_unit,
            angle_unit: self.angle_unit,
            mass_default: self.mass_default,
            length_default: self.length_default,
        };
        skeleton.dump_hierarchy();
        Ok((skeleton, self.warnings))
    }

    fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Next line of the current section, `None` once a new section starts.
    fn section_line(&mut self) -> Result<Option<String>> {
        match self.lines.next_line()? {
            Some(line) if line.starts_with(':') => {
                self.lines.push_back(line);
                Ok(None)
            }
            line => Ok(line),
        }
    }

    fn malformed(&self, message: String) -> Error {
        Error::Parse {
            line: self.lines.line_number(),
            message,
        }
    }

    fn float(&self, input: &str, what: &str) -> Result<f32> {
        parse_all(float, input).ok_or_else(|| self.malformed(format!("expected a number for {}, got `{}`", what, input)))
    }

    fn vec3(&self, input: &str, what: &str) -> Result<Vector3<f32>> {
        parse_all(vec3, input).ok_or_else(|| self.malformed(format!("expected three numbers for {}, got `{}`", what, input)))
    }

    fn axis_letters(&self, input: &str) -> Result<Vec<Axis>> {
        parse_all(axis_letters, input).ok_or_else(|| Error::InvalidAxis {
            line: self.lines.line_number(),
            axis: input.to_owned(),
        })
    }

    fn axis_tokens(&self, input: &str) -> Result<Vec<Axis>> {
        input
            .split_whitespace()
            .map(|token| {
                Axis::from_token(token).ok_or_else(|| Error::InvalidAxis {
                    line: self.lines.line_number(),
                    axis: token.to_owned(),
                })
            })
            .collect()
    }

    fn read_version(&mut self, version: Option<String>) {
        let version = version.unwrap_or_default();
        if version != ASF_VERSION {
            self.warn(Warning::UnknownVersion(version));
        }
    }

    fn read_units(&mut self) -> Result<()> {
        while let Some(line) = self.section_line()? {
            let (unit, value) = keyword(&line);
            match unit {
                "mass" => self.mass_default = self.float(value, "mass")?,
                "length" => self.length_unit = self.float(value, "length")?,
                "angle" => {
                    self.angle_unit = units::angle_unit(value).ok_or_else(|| Error::UnknownAngleUnit {
                        line: self.lines.line_number(),
                        unit: value.to_owned(),
                    })?
                }
                name => {
                    let line = self.lines.line_number();
                    self.warn(Warning::UnknownUnit { line, name: name.to_owned() });
                }
            }
        }
        Ok(())
    }

    fn read_root(&mut self) -> Result<()> {
        if self.root.is_some() {
            return Err(Error::RootRedefined {
                line: self.lines.line_number(),
            });
        }

        while let Some(line) = self.section_line()? {
            let (keyword, rest) = keyword(&line);
            match keyword {
                "axis" => self.root_axis = self.axis_letters(rest)?,
                "order" => self.root_order = self.axis_tokens(rest)?,
                "position" => self.root_position = self.vec3(rest, "root position")?,
                "orientation" => self.root_orientation = self.vec3(rest, "root orientation")?,
                keyword => {
                    let line = self.lines.line_number();
                    self.warn(Warning::UnknownKeyword {
                        line,
                        context: "root section".to_owned(),
                        keyword: keyword.to_owned(),
                    });
                }
            }
        }

        let mut root = Bone::new("root".to_owned(), self.root_axis.clone(), 0.);
        root.direction = Vector3::unit_y();
        self.root = Some(self.push_bone(root));
        Ok(())
    }

    fn push_bone(&mut self, bone: Bone) -> usize {
        let index = self.bones.len();
        self.names.entry(bone.name.clone()).or_insert(index);
        self.bones.push(bone);
        index
    }

    fn read_bonedata(&mut self) -> Result<()> {
        while let Some(line) = self.section_line()? {
            if line != "begin" {
                return Err(Error::Expected {
                    line: self.lines.line_number(),
                    expected: "begin",
                    found: line,
                });
            }
            let bone = self.read_bone()?;
            self.push_bone(bone);
        }
        Ok(())
    }

    fn read_bone(&mut self) -> Result<Bone> {
        let mut bone = Bone::new(String::new(), self.root_axis.clone(), self.length_default);

        loop {
            let line = match self.section_line()? {
                Some(line) => line,
                None => {
                    return Err(Error::Unterminated {
                        line: self.lines.line_number(),
                        block: format!("bone `{}`", bone.name),
                    })
                }
            };
            if line == "end" {
                return Ok(bone);
            }

            let (keyword, rest) = keyword(&line);
            match keyword {
                "id" => {
                    bone.id = rest
                        .parse()
                        .map_err(|_| self.malformed(format!("invalid bone id `{}`", rest)))?
                }
                "name" => {
                    bone.name = rest
                        .split_whitespace()
                        .next()
                        .ok_or_else(|| self.malformed("missing bone name".to_owned()))?
                        .to_owned()
                }
                "direction" => {
                    let direction = self.vec3(rest, "direction")?;
                    bone.direction = if direction.magnitude2() > 0. {
                        direction.normalize()
                    } else {
                        direction
                    };
                }
                "length" => bone.length = self.float(rest, "length")?,
                "axis" => {
                    let (angles, order) = parse_all(angles_and_order, rest).ok_or_else(|| Error::InvalidAxis {
                        line: self.lines.line_number(),
                        axis: rest.to_owned(),
                    })?;
                    bone.axis = angles * self.angle_unit;
                    bone.axis_order = order;
                }
                "dof" => {
                    bone.dof_order = self.axis_tokens(rest)?;
                    bone.dof_limits = bone
                        .dof_order
                        .iter()
                        .map(|&axis| (axis, (f32::NEG_INFINITY, f32::INFINITY)))
                        .collect();
                }
                "limits" => self.read_limits(&mut bone, &line)?,
                keyword => {
                    let line = self.lines.line_number();
                    self.warn(Warning::UnknownKeyword {
                        line,
                        context: format!("bone `{}`", bone.name),
                        keyword: keyword.to_owned(),
                    });
                }
            }
        }
    }

    /// Consumes one `(min max)` pair per declared dof, the first one being
    /// on the `limits` line itself.
    fn read_limits(&mut self, bone: &mut Bone, first: &str) -> Result<()> {
        if bone.dof_order.is_empty() {
            return Err(Error::LimitsWithoutDof {
                line: self.lines.line_number(),
                bone: bone.name.clone(),
            });
        }

        for (i, &axis) in bone.dof_order.iter().enumerate() {
            let line = if i == 0 {
                first.to_owned()
            } else {
                match self.lines.next_line()? {
                    Some(line) if line.starts_with(':') => {
                        return Err(Error::Unterminated {
                            line: self.lines.line_number(),
                            block: format!("limits of bone `{}`", bone.name),
                        })
                    }
                    Some(line) => line,
                    None => return Err(Error::UnexpectedEof { expected: "bone limit pair" }),
                }
            };

            let pair = if i == 0 {
                parse_all(limits_line, &line)
            } else {
                parse_all(limit_pair, &line)
            };
            let (min, max) = pair.ok_or_else(|| Error::LimitMismatch {
                line: self.lines.line_number(),
                bone: bone.name.clone(),
                found: line.clone(),
            })?;
            bone.dof_limits
                .insert(axis, (min * self.angle_unit, max * self.angle_unit));
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<usize> {
        self.names.get(name).copied().ok_or_else(|| Error::UnknownBone {
            line: self.lines.line_number(),
            name: name.to_owned(),
        })
    }

    fn read_hierarchy(&mut self) -> Result<()> {
        match self.lines.next_line()? {
            Some(line) if line == "begin" => {}
            Some(line) => {
                return Err(Error::Expected {
                    line: self.lines.line_number(),
                    expected: "begin",
                    found: line,
                })
            }
            None => return Err(Error::UnexpectedEof { expected: "begin of hierarchy" }),
        }

        loop {
            let line = match self.lines.next_line()? {
                Some(line) if line == "end" => return Ok(()),
                Some(line) if line.starts_with(':') => {
                    return Err(Error::Unterminated {
                        line: self.lines.line_number(),
                        block: "hierarchy".to_owned(),
                    })
                }
                Some(line) => line,
                None => return Err(Error::UnexpectedEof { expected: "end of hierarchy" }),
            };

            let mut names = line.split_whitespace();
            let parent = match names.next() {
                Some(name) => self.lookup(name)?,
                None => continue,
            };
            for name in names {
                let child = self.lookup(name)?;
                self.link(parent, child)?;
            }
        }
    }

    /// Appends `child` to the end of `parent`'s sibling chain.
    fn link(&mut self, parent: usize, child: usize) -> Result<()> {
        let line = self.lines.line_number();
        if Some(child) == self.root {
            return Err(Error::ParentedRoot { line });
        }

        match self.bones[child].parent {
            Some(existing) if existing == parent => {
                let warning = Warning::DuplicateParent {
                    line,
                    child: self.bones[child].name.clone(),
                    parent: self.bones[parent].name.clone(),
                };
                self.warn(warning);
                return Ok(());
            }
            Some(existing) => {
                return Err(Error::MultipleParents {
                    line,
                    child: self.bones[child].name.clone(),
                    existing: self.bones[existing].name.clone(),
                    parent: self.bones[parent].name.clone(),
                })
            }
            None => {}
        }

        let mut ancestor = Some(parent);
        while let Some(i) = ancestor {
            if i == child {
                return Err(Error::Cycle {
                    line,
                    child: self.bones[child].name.clone(),
                    parent: self.bones[parent].name.clone(),
                });
            }
            ancestor = self.bones[i].parent;
        }

        let mut tail = self.bones[parent].first_child;
        while let Some(next) = tail.and_then(|t| self.bones[t].next_sibling) {
            tail = Some(next);
        }
        match tail {
            Some(last) => self.bones[last].next_sibling = Some(child),
            None => self.bones[parent].first_child = Some(child),
        }
        self.bones[child].parent = Some(parent);
        Ok(())
    }
}
