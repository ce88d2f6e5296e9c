//! Streaming XML writer with a guarded tag state machine.
//!
//! The writer never buffers a document tree. Callers open tags, add
//! attributes while a tag is still opening, add scalar values or child tags,
//! and close tags in order. Calls that would produce malformed output are
//! rejected with an [`XmlError`] instead of being written.
//!
//! ```
//! use stagedef_io::xml_writer::{Attribute, Tag, XmlWriter};
//!
//! let mut xml = XmlWriter::new(Vec::new());
//! xml.start_tag(Tag::Stage).unwrap();
//! xml.add_attribute(Attribute::Version, "1.0.0").unwrap();
//! xml.start_tag(Tag::FalloutPlane).unwrap();
//! xml.add_attribute(Attribute::Y, -10.0f32).unwrap();
//! xml.end_tag().unwrap();
//! xml.end_tag().unwrap();
//! xml.finish().unwrap();
//!
//! let text = String::from_utf8(xml.into_inner()).unwrap();
//! assert_eq!(
//!     text,
//!     "\n<superMonkeyBallStage version=\"1.0.0\">\n    <falloutPlane y=\"-10.000000\" />\n</superMonkeyBallStage>\n"
//! );
//! ```

use std::fmt;
use std::io::{self, Write};

use thiserror::Error;

/// Deepest tag nesting the writer accepts.
pub const MAX_DEPTH: usize = 20;

const INDENT: &str = "    ";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum XmlError {
    #[error("operation not allowed while writer is {0:?}")]
    BadState(WriterState),
    #[error("end tag with no open tag")]
    EmptyStack,
    #[error("tag nesting deeper than {MAX_DEPTH}")]
    StackOverflow,
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<io::Error> for XmlError {
    fn from(err: io::Error) -> Self {
        XmlError::Io(err.to_string())
    }
}

pub type XmlResult<T> = Result<T, XmlError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Between tags; values, new tags and end tags are accepted.
    General,
    /// A start tag has been written without its closing `>`.
    OpeningTag,
    /// The document has been finished.
    Closed,
}

/// Element names used in stage documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Stage,
    Start,
    End,
    Name,
    Position,
    Rotation,
    Scale,
    BackgroundModel,
    Fog,
    Red,
    Green,
    Blue,
    FalloutPlane,
    ItemGroup,
    AnimatedModel,
    RotationCenter,
    InitialRotation,
    AnimSeesawType,
    SeesawSensitivity,
    SeesawResetStiffness,
    SeesawRotationBounds,
    ConveyorSpeed,
    CollisionGrid,
    Step,
    Count,
    Goal,
    Type,
    Bumper,
    Jamabar,
    Banana,
    Cone,
    Sphere,
    Cylinder,
    FalloutVolume,
    LevelModel,
    ReflectiveModel,
    Wormhole,
    Switch,
    DestinationName,
    AnimLoopTime,
    AnimKeyframes,
    PosX,
    PosY,
    PosZ,
    RotX,
    RotY,
    RotZ,
    Keyframe,
    AnimGroupId,
    AnimInitialState,
    Radius,
    Height,
}

impl Tag {
    pub const fn name(self) -> &'static str {
        match self {
            Tag::Stage => "superMonkeyBallStage",
            Tag::Start => "start",
            Tag::End => "end",
            Tag::Name => "name",
            Tag::Position => "position",
            Tag::Rotation => "rotation",
            Tag::Scale => "scale",
            Tag::BackgroundModel => "backgroundModel",
            Tag::Fog => "fog",
            Tag::Red => "red",
            Tag::Green => "green",
            Tag::Blue => "blue",
            Tag::FalloutPlane => "falloutPlane",
            Tag::ItemGroup => "itemGroup",
            Tag::AnimatedModel => "animatedModel",
            Tag::RotationCenter => "rotationCenter",
            Tag::InitialRotation => "initialRotation",
            Tag::AnimSeesawType => "animSeesawType",
            Tag::SeesawSensitivity => "seesawSensitivity",
            Tag::SeesawResetStiffness => "seesawResetStiffness",
            Tag::SeesawRotationBounds => "seesawRotationBounds",
            Tag::ConveyorSpeed => "conveyorSpeed",
            Tag::CollisionGrid => "collisionGrid",
            Tag::Step => "step",
            Tag::Count => "count",
            Tag::Goal => "goal",
            Tag::Type => "type",
            Tag::Bumper => "bumper",
            Tag::Jamabar => "jamabar",
            Tag::Banana => "banana",
            Tag::Cone => "cone",
            Tag::Sphere => "sphere",
            Tag::Cylinder => "cylinder",
            Tag::FalloutVolume => "falloutVolume",
            Tag::LevelModel => "levelModel",
            Tag::ReflectiveModel => "reflectiveModel",
            Tag::Wormhole => "wormhole",
            Tag::Switch => "switch",
            Tag::DestinationName => "destinationName",
            Tag::AnimLoopTime => "animLoopTime",
            Tag::AnimKeyframes => "animKeyframes",
            Tag::PosX => "posX",
            Tag::PosY => "posY",
            Tag::PosZ => "posZ",
            Tag::RotX => "rotX",
            Tag::RotY => "rotY",
            Tag::RotZ => "rotZ",
            Tag::Keyframe => "keyframe",
            Tag::AnimGroupId => "animGroupId",
            Tag::AnimInitialState => "animInitialState",
            Tag::Radius => "radius",
            Tag::Height => "height",
        }
    }
}

/// Attribute names used in stage documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Version,
    Type,
    X,
    Y,
    Z,
    Time,
    Value,
    Easing,
}

impl Attribute {
    pub const fn name(self) -> &'static str {
        match self {
            Attribute::Version => "version",
            Attribute::Type => "type",
            Attribute::X => "x",
            Attribute::Y => "y",
            Attribute::Z => "z",
            Attribute::Time => "time",
            Attribute::Value => "value",
            Attribute::Easing => "easing",
        }
    }
}

/// A scalar written as an attribute value or element text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Str(&'a str),
    Int(i64),
    UInt(u64),
    /// Written with six decimals.
    Float(f64),
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Value::Str(s) => write_escaped(f, s),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:.6}"),
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    for c in s.chars() {
        match c {
            '&' => f.write_str("&amp;")?,
            '<' => f.write_str("&lt;")?,
            '>' => f.write_str("&gt;")?,
            '"' => f.write_str("&quot;")?,
            c => write!(f, "{c}")?,
        }
    }
    Ok(())
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Value::Str(v)
    }
}

impl From<i32> for Value<'_> {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value<'_> {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u16> for Value<'_> {
    fn from(v: u16) -> Self {
        Value::UInt(u64::from(v))
    }
}

impl From<u32> for Value<'_> {
    fn from(v: u32) -> Self {
        Value::UInt(u64::from(v))
    }
}

impl From<f32> for Value<'_> {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value<'_> {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

/// Pretty-printing XML writer over any [`Write`] sink.
pub struct XmlWriter<W: Write> {
    sink: W,
    state: WriterState,
    /// Tags whose start tag has been closed with `>`.
    open: Vec<Tag>,
    /// The tag currently in [`WriterState::OpeningTag`].
    opening: Option<Tag>,
    /// Write the next end tag directly after the preceding content.
    close_inline: bool,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            state: WriterState::General,
            open: Vec::with_capacity(MAX_DEPTH),
            opening: None,
            close_inline: false,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Number of tags open around the current position.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Closes a pending start tag with `>` so content can follow it.
    fn promote(&mut self) -> XmlResult<()> {
        match self.state {
            WriterState::OpeningTag => {
                self.sink.write_all(b">")?;
                if let Some(tag) = self.opening.take() {
                    self.open.push(tag);
                }
                self.state = WriterState::General;
                Ok(())
            }
            WriterState::General => Ok(()),
            WriterState::Closed => Err(XmlError::BadState(self.state)),
        }
    }

    fn newline(&mut self) -> XmlResult<()> {
        self.sink.write_all(b"\n")?;
        for _ in 0..self.open.len() {
            self.sink.write_all(INDENT.as_bytes())?;
        }
        Ok(())
    }

    /// Starts a new element on its own line.
    pub fn start_tag(&mut self, tag: Tag) -> XmlResult<()> {
        // The tag being opened counts toward the depth.
        if self.open.len() + usize::from(self.opening.is_some()) >= MAX_DEPTH {
            return Err(XmlError::StackOverflow);
        }
        self.promote()?;
        self.newline()?;
        write!(self.sink, "<{}", tag.name())?;
        self.opening = Some(tag);
        self.state = WriterState::OpeningTag;
        Ok(())
    }

    /// Adds an attribute to the tag being opened.
    pub fn add_attribute<'v>(&mut self, attr: Attribute, value: impl Into<Value<'v>>) -> XmlResult<()> {
        if self.state != WriterState::OpeningTag {
            return Err(XmlError::BadState(self.state));
        }
        write!(self.sink, " {}=\"{}\"", attr.name(), value.into())?;
        self.close_inline = true;
        Ok(())
    }

    /// Writes element text, closing a pending start tag first.
    pub fn add_value<'v>(&mut self, value: impl Into<Value<'v>>) -> XmlResult<()> {
        self.promote()?;
        write!(self.sink, "{}", value.into())?;
        self.close_inline = true;
        Ok(())
    }

    /// Ends the innermost element. A tag still being opened is self-closed.
    pub fn end_tag(&mut self) -> XmlResult<()> {
        match self.state {
            WriterState::OpeningTag => {
                self.sink.write_all(b" />")?;
                self.opening = None;
                self.state = WriterState::General;
                self.close_inline = false;
                Ok(())
            }
            WriterState::General => {
                let tag = self.open.pop().ok_or(XmlError::EmptyStack)?;
                if self.close_inline {
                    self.close_inline = false;
                } else {
                    self.newline()?;
                }
                write!(self.sink, "</{}>", tag.name())?;
                Ok(())
            }
            WriterState::Closed => Err(XmlError::BadState(self.state)),
        }
    }

    /// Writes `<tag>value</tag>`.
    pub fn write_element<'v>(&mut self, tag: Tag, value: impl Into<Value<'v>>) -> XmlResult<()> {
        self.start_tag(tag)?;
        self.add_value(value)?;
        self.end_tag()
    }

    /// Ends the document. Every tag must have been closed.
    pub fn finish(&mut self) -> XmlResult<()> {
        if self.state != WriterState::General || !self.open.is_empty() {
            return Err(XmlError::BadState(self.state));
        }
        self.sink.write_all(b"\n")?;
        self.sink.flush()?;
        self.state = WriterState::Closed;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
