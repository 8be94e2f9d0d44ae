use super::utilities::*;
use super::LineReader;
use crate::error::{Error, Result, Warning};
use crate::motion::Motion;
use crate::skeleton::Skeleton;
use crate::units;

use log::*;

use std::convert::TryFrom;
use std::io::BufRead;

impl Motion {
    /// Reads an AMC motion whose bone names resolve against `skeleton`.
    pub fn parse<R: BufRead>(reader: R, skeleton: &Skeleton) -> Result<Self> {
        Self::parse_with_warnings(reader, skeleton).map(|(motion, _)| motion)
    }

    pub fn parse_with_warnings<R: BufRead>(
        reader: R,
        skeleton: &Skeleton,
    ) -> Result<(Self, Vec<Warning>)> {
        AmcReader::new(reader, skeleton).read()
    }
}

struct AmcReader<'s, R> {
    lines: LineReader<R>,
    skeleton: &'s Skeleton,
    motion: Motion,
    warnings: Vec<Warning>,
    angle_unit: f32,
    /// Absolute number of the frame data lines currently go to.
    current: Option<usize>,
}

impl<'s, R: BufRead> AmcReader<'s, R> {
    fn new(reader: R, skeleton: &'s Skeleton) -> Self {
        Self {
            lines: LineReader::new(reader),
            skeleton,
            motion: Motion::new(skeleton.bones().len()),
            warnings: vec![],
            angle_unit: units::RADIANS,
            current: None,
        }
    }

    fn read(mut self) -> Result<(Motion, Vec<Warning>)> {
        while let Some(line) = self.lines.next_line()? {
            if line.starts_with(':') {
                self.read_keyword(&line);
            } else if let Ok(number) = line.parse::<i64>() {
                self.start_frame(number)?;
            } else {
                self.read_channels(&line)?;
            }
        }
        debug!(
            "read {} frames starting at {}",
            self.motion.frame_count(),
            self.motion.first_frame()
        );
        Ok((self.motion, self.warnings))
    }

    fn read_keyword(&mut self, line: &str) {
        match line {
            ":DEGREES" => self.angle_unit = units::DEGREES,
            ":FULLY-SPECIFIED" => {}
            keyword => {
                let warning = Warning::UnknownMotionKeyword {
                    line: self.lines.line_number(),
                    keyword: keyword.to_owned(),
                };
                warn!("{}", warning);
                self.warnings.push(warning);
            }
        }
    }

    fn start_frame(&mut self, number: i64) -> Result<()> {
        let number = usize::try_from(number).map_err(|_| Error::NegativeFrame {
            line: self.lines.line_number(),
            frame: number,
        })?;
        if self.motion.frame_slot(number).is_none() {
            return Err(Error::FrameBufferTooLarge {
                line: self.lines.line_number(),
                frame: number,
            });
        }
        self.current = Some(number);
        Ok(())
    }

    fn read_channels(&mut self, line: &str) -> Result<()> {
        let line_number = self.lines.line_number();
        let frame_number = self
            .current
            .ok_or(Error::DataBeforeFrame { line: line_number })?;

        let mut tokens = line.split_whitespace();
        let entity = tokens.next().unwrap_or_default();
        let values = tokens
            .map(|token| {
                parse_all(float, token).ok_or_else(|| Error::Parse {
                    line: line_number,
                    message: format!("invalid channel value `{}` for `{}`", token, entity),
                })
            })
            .collect::<Result<Vec<f32>>>()?;

        let skeleton = self.skeleton;
        let angle_unit = self.angle_unit;
        let channel_count = |expected: usize| Error::ChannelCount {
            line: line_number,
            entity: entity.to_owned(),
            frame: frame_number,
            expected,
            found: values.len(),
        };

        let index = frame_number - self.motion.first_frame();
        let frame = self
            .motion
            .frame_at_mut(index)
            .ok_or(Error::DataBeforeFrame { line: line_number })?;

        if entity == "root" {
            let order = skeleton.root_order();
            if values.len() != order.len() {
                return Err(channel_count(order.len()));
            }
            for (&axis, &value) in order.iter().zip(&values) {
                if axis.is_rotation() {
                    frame.root_rotation[axis.component()] = value * angle_unit;
                } else {
                    frame.root_translation[axis.component()] = value * skeleton.length_unit();
                }
            }
            return Ok(());
        }

        let bone_index = skeleton.bone_index(entity).ok_or_else(|| Error::UnknownBone {
            line: line_number,
            name: entity.to_owned(),
        })?;
        let bone = &skeleton.bones()[bone_index];
        if values.len() != bone.dof_order.len() {
            return Err(channel_count(bone.dof_order.len()));
        }
        let transformation = &mut frame.transformations[bone_index];
        for (&axis, &value) in bone.dof_order.iter().zip(&values) {
            if !transformation.set(axis, value * angle_unit) {
                return Err(Error::NonRotationalDof {
                    line: line_number,
                    bone: bone.name.clone(),
                    axis,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Axis;

    use approx::assert_abs_diff_eq;
    use cgmath::Vector3;
    use std::f32::consts::PI;

    const ASF: &str = include_str!("../../assets/sample.asf");
    const AMC: &str = include_str!("../../assets/sample.amc");

    fn skeleton() -> Skeleton {
        Skeleton::parse(ASF.as_bytes()).unwrap()
    }

    fn parse(input: &str) -> Result<(Motion, Vec<Warning>)> {
        Motion::parse_with_warnings(input.as_bytes(), &skeleton())
    }

    fn frame_block(number: usize, value: f32) -> String {
        format!(
            "{}\nroot {v} 0 0 0 0 0\nlowerback {v} 0 0\nlfemur 0 {v} 0\nltibia {v}\nrfemur 0 0 {v}\n",
            number,
            v = value
        )
    }

    #[test]
    fn sample_motion() {
        let skeleton = skeleton();
        let (motion, warnings) = Motion::parse_with_warnings(AMC.as_bytes(), &skeleton).unwrap();
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert_eq!(motion.first_frame(), 1);
        assert_eq!(motion.frame_count(), 2);
        assert_eq!(motion.bone_count(), skeleton.bones().len());

        let first = motion.frame(1).unwrap();
        assert_abs_diff_eq!(first.root_translation, Vector3::new(0.45, 0.9, 1.35), epsilon = 1e-6);
        assert_abs_diff_eq!(first.root_rotation.x, PI / 2., epsilon = 1e-6);
        let ltibia = skeleton.bone_index("ltibia").unwrap();
        assert_abs_diff_eq!(first.transformations[ltibia].rx, PI / 4., epsilon = 1e-6);
        let rfemur = skeleton.bone_index("rfemur").unwrap();
        assert_abs_diff_eq!(first.transformations[rfemur].rz, PI / 2., epsilon = 1e-6);

        let second = motion.frame(2).unwrap();
        let lfemur = skeleton.bone_index("lfemur").unwrap();
        assert_abs_diff_eq!(second.transformations[lfemur].rx, -PI / 6., epsilon = 1e-6);
        assert_eq!(second.transformations[skeleton.root_index()].rx, 0.);
    }

    #[test]
    fn degrees_keyword() {
        let input = format!(":DEGREES\n{}", frame_block(0, 90.));
        let (motion, _) = parse(&input).unwrap();
        let lowerback = &motion.frames()[0].transformations[1];
        assert_abs_diff_eq!(lowerback.rx, PI / 2., epsilon = 1e-6);

        let (motion, _) = parse(&frame_block(0, 1.5)).unwrap();
        assert_eq!(motion.frames()[0].transformations[1].rx, 1.5);
    }

    #[test]
    fn frames_in_any_order() {
        let input = format!(
            "{}{}{}",
            frame_block(5, 5.),
            frame_block(3, 3.),
            frame_block(7, 7.)
        );
        let (motion, _) = parse(&input).unwrap();

        assert_eq!(motion.first_frame(), 3);
        assert_eq!(motion.frame_count(), 5);
        for &(index, value) in [(0, 3.), (2, 5.), (4, 7.)].iter() {
            let frame = &motion.frames()[index];
            assert_eq!(frame.transformations[1].rx, value);
            assert_eq!(frame.transformations[2].ry, value);
            assert_eq!(frame.transformations[4].rz, value);
        }
        for &index in [1, 3].iter() {
            assert_eq!(motion.frames()[index], crate::Frame::new(5));
        }
    }

    #[test]
    fn later_lines_overwrite_the_same_frame() {
        let input = format!("{}{}2\nltibia 8\n", frame_block(2, 1.), frame_block(4, 1.));
        let (motion, _) = parse(&input).unwrap();
        assert_eq!(motion.frame_count(), 3);
        assert_eq!(motion.frame(2).unwrap().transformations[3].rx, 8.);
        assert_eq!(motion.frame(4).unwrap().transformations[3].rx, 1.);
    }

    #[test]
    fn channel_counts_are_checked() {
        let result = parse("1\nroot 0 0 0 0 0\n");
        assert!(matches!(
            result,
            Err(Error::ChannelCount { expected: 6, found: 5, frame: 1, .. })
        ));

        let result = parse("1\nltibia 1 2\n");
        assert!(matches!(
            result,
            Err(Error::ChannelCount { expected: 1, found: 2, line: 2, .. })
        ));

        let result = parse("1\nlfemur 1 x 2\n");
        assert!(matches!(result, Err(Error::Parse { line: 2, .. })));
    }

    #[test]
    fn structural_errors() {
        let result = parse("1\nrhumerus 0 0 0\n");
        assert!(matches!(result, Err(Error::UnknownBone { name, .. }) if name == "rhumerus"));

        let result = parse("lfemur 0 0 0\n1\n");
        assert!(matches!(result, Err(Error::DataBeforeFrame { line: 1 })));

        let result = parse("1\n-4\n");
        assert!(matches!(result, Err(Error::NegativeFrame { frame: -4, line: 2 })));

        let result = parse("0\nltibia 1\n9223372036854775807\n");
        assert!(matches!(
            result,
            Err(Error::FrameBufferTooLarge { line: 3, frame }) if frame == i64::MAX as usize
        ));
    }

    #[test]
    fn root_channels_follow_root_order() {
        let asf = ":units\nlength 0.5\nangle deg\n:root\norder RZ TX RY TZ RX TY\naxis ZYX\n";
        let skeleton = Skeleton::parse(asf.as_bytes()).unwrap();
        let (motion, _) =
            Motion::parse_with_warnings(":DEGREES\n0\nroot 30 1 20 3 10 2\n".as_bytes(), &skeleton).unwrap();
        let frame = motion.frame(0).unwrap();
        assert_abs_diff_eq!(frame.root_translation, Vector3::new(0.5, 1., 1.5), epsilon = 1e-6);
        assert_abs_diff_eq!(
            frame.root_rotation,
            Vector3::new(10f32.to_radians(), 20f32.to_radians(), 30f32.to_radians()),
            epsilon = 1e-6
        );
    }

    #[test]
    fn translational_dof_is_rejected() {
        let asf = ":root\norder RX\naxis XYZ\n:bonedata\nbegin\nname slider\ndof tx ry\nend\n:hierarchy\nbegin\nroot slider\nend\n";
        let skeleton = Skeleton::parse(asf.as_bytes()).unwrap();
        assert_eq!(skeleton.bones()[1].dof_order, vec![Axis::Tx, Axis::Ry]);
        let result = Motion::parse("0\nslider 1 2\n".as_bytes(), &skeleton);
        assert!(matches!(
            result,
            Err(Error::NonRotationalDof { axis: Axis::Tx, .. })
        ));
    }

    #[test]
    fn unknown_keyword_warns() {
        let (motion, warnings) = parse(":FULLY-SPECIFIED\n:RADIANS\n0\nltibia 1\n").unwrap();
        assert_eq!(motion.frame_count(), 1);
        assert_eq!(
            warnings,
            vec![Warning::UnknownMotionKeyword {
                line: 2,
                keyword: ":RADIANS".to_owned()
            }]
        );
    }

    #[test]
    fn empty_stream() {
        let (motion, warnings) = parse("# nothing here\n").unwrap();
        assert!(motion.is_empty());
        assert!(warnings.is_empty());
    }
}
