use crate::Axis;

use std::io;
use thiserror::Error;

/// Fatal errors. Parsers return no partial value once one of these occurs.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: unexpected line `{content}`")]
    UnexpectedLine { line: usize, content: String },

    #[error("line {line}: expected `{expected}`, got `{found}`")]
    Expected {
        line: usize,
        expected: &'static str,
        found: String,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("line {line}: {block} block is missing its `end`")]
    Unterminated { line: usize, block: String },

    #[error("line {line}: unknown angle unit `{unit}`")]
    UnknownAngleUnit { line: usize, unit: String },

    #[error("line {line}: invalid axis `{axis}`")]
    InvalidAxis { line: usize, axis: String },

    #[error("line {line}: root bone redefined")]
    RootRedefined { line: usize },

    #[error("skeleton has no root section")]
    MissingRoot,

    #[error("line {line}: limits for bone `{bone}` given before its dof")]
    LimitsWithoutDof { line: usize, bone: String },

    #[error("line {line}: expected a limit pair for bone `{bone}`, got `{found}`")]
    LimitMismatch {
        line: usize,
        bone: String,
        found: String,
    },

    #[error("line {line}: unknown bone `{name}`")]
    UnknownBone { line: usize, name: String },

    #[error("line {line}: bone `{child}` has parent `{existing}`, cannot also be a child of `{parent}`")]
    MultipleParents {
        line: usize,
        child: String,
        existing: String,
        parent: String,
    },

    #[error("line {line}: making `{parent}` the parent of `{child}` would close a cycle")]
    Cycle {
        line: usize,
        child: String,
        parent: String,
    },

    #[error("line {line}: the root bone cannot be given a parent")]
    ParentedRoot { line: usize },

    #[error("line {line}: channel data before the first frame number")]
    DataBeforeFrame { line: usize },

    #[error("line {line}: negative frame {frame}")]
    NegativeFrame { line: usize, frame: i64 },

    #[error("line {line}: frame {frame} is too far from the frames read so far")]
    FrameBufferTooLarge { line: usize, frame: usize },

    #[error("line {line}: expected {expected} value(s) for `{entity}` in frame {frame}, got {found}")]
    ChannelCount {
        line: usize,
        entity: String,
        frame: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: dof {axis:?} of bone `{bone}` is not a rotation")]
    NonRotationalDof { line: usize, bone: String, axis: Axis },

    #[error("frame {frame} is outside of {first}..{end}")]
    FrameOutOfRange { frame: i64, first: usize, end: usize },

    #[error("motion holds {motion} bones per frame, skeleton has {skeleton}")]
    SkeletonMismatch { motion: usize, skeleton: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal anomalies. Parsing continues after each of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Warning {
    #[error("unknown ASF version `{0}`")]
    UnknownVersion(String),

    #[error("line {line}: unknown section `{name}`")]
    UnknownSection { line: usize, name: String },

    #[error("line {line}: unknown unit `{name}`")]
    UnknownUnit { line: usize, name: String },

    #[error("line {line}: unknown keyword `{keyword}` in {context}")]
    UnknownKeyword {
        line: usize,
        context: String,
        keyword: String,
    },

    #[error("line {line}: parent `{parent}` of bone `{child}` given again")]
    DuplicateParent {
        line: usize,
        child: String,
        parent: String,
    },

    #[error("line {line}: unknown motion keyword `{keyword}`")]
    UnknownMotionKeyword { line: usize, keyword: String },
}
