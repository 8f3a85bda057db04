//! Error chain model and bounded trace rendering.
//!
//! # Output
//! ```text
//! c.e.s.ServiceError: lookup failed
//! 	at c.e.s.Handler.handle(Handler.rs:42)
//! 	at c.e.s.Router.route(Router.rs:17)
//! 	... 3 frames excluded
//! 	Suppressed: c.e.CleanupError: close failed
//! 		at c.e.Pool.release(Pool.rs:9)
//! Caused by: std.io.Error: connection reset
//! 	at c.e.n.Socket.read(Socket.rs:88)
//! 	... 12 frames truncated
//! ```
//!
//! # Bounds
//! - `max_frames_per_throwable` caps frames written for each throwable in the chain
//! - `max_length` caps the whole text; once exceeded nothing more is appended
//!   and the buffer is cut back to `max_length` ending in `...`
//!
//! # Design Decisions
//! - The first two frames of every throwable bypass the frame filter
//! - A single excluded frame is written anyway; two or more collapse into a
//!   placeholder line
//! - Length checks happen per line, so the buffer may overshoot before the
//!   final cut

use std::error::Error;
use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::encoder::abbreviator::{AbbreviationPolicy, Abbreviator};

const ELLIPSIS: &str = "...";
const TRUNCATION_MARKER: &str = "...\n";
const CAUSED_BY: &str = "Caused by: ";
const SUPPRESSED: &str = "Suppressed: ";
const WRAPPED_BY: &str = "Wrapped by: ";
const ALWAYS_INCLUDED_FRAMES: usize = 2;

pub const DEFAULT_MAX_LENGTH: usize = 20_000;
const CLASS_NAME_TARGET_LENGTH: usize = 100;

/// One frame of a captured stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackFrame {
    pub class_name: String,
    pub method: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl StackFrame {
    pub fn new(class_name: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method: method.into(),
            file: None,
            line: None,
        }
    }

    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }
}

/// An error with its frames, cause chain and suppressed errors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Throwable {
    pub class_name: String,
    pub message: Option<String>,
    pub frames: Vec<StackFrame>,
    pub cause: Option<Box<Throwable>>,
    pub suppressed: Vec<Throwable>,
}

impl Throwable {
    pub fn new(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn with_frames(mut self, frames: impl IntoIterator<Item = StackFrame>) -> Self {
        self.frames.extend(frames);
        self
    }

    pub fn with_cause(mut self, cause: Throwable) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn with_suppressed(mut self, suppressed: Throwable) -> Self {
        self.suppressed.push(suppressed);
        self
    }

    /// Capture a Rust error and its `source()` chain.
    ///
    /// The outer error is named after its type path (`::` becomes `.` so that
    /// abbreviation applies). Sources are type-erased and are named after the
    /// leading identifier of their `Debug` output instead.
    pub fn from_error<E: Error + 'static>(error: &E) -> Self {
        let class_name = std::any::type_name::<E>().replace("::", ".");
        let mut throwable = Throwable::new(class_name, error.to_string());
        throwable.cause = error.source().map(|source| Box::new(Self::from_source(source)));
        throwable
    }

    fn from_source(error: &(dyn Error + 'static)) -> Self {
        let debug = format!("{:?}", error);
        let ident: String = debug
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        let class_name = if ident.is_empty() { "Error".to_owned() } else { ident };
        let mut throwable = Throwable::new(class_name, error.to_string());
        throwable.cause = error.source().map(|source| Box::new(Self::from_source(source)));
        throwable
    }
}

impl fmt::Display for Throwable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.class_name, message),
            None => f.write_str(&self.class_name),
        }
    }
}

/// Decides which frames are written. Excluded frames are summarized.
pub trait FrameFilter: Send + Sync {
    fn include(&self, frame: &StackFrame) -> bool;
}

impl<F> FrameFilter for F
where
    F: Fn(&StackFrame) -> bool + Send + Sync,
{
    fn include(&self, frame: &StackFrame) -> bool {
        self(frame)
    }
}

/// Includes every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl FrameFilter for AcceptAll {
    fn include(&self, _frame: &StackFrame) -> bool {
        true
    }
}

/// Excludes frames whose class name starts with any of the given prefixes.
#[derive(Debug, Clone, Default)]
pub struct ExcludePrefixes {
    prefixes: Vec<String>,
}

impl ExcludePrefixes {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }
}

impl FrameFilter for ExcludePrefixes {
    fn include(&self, frame: &StackFrame) -> bool {
        !self.prefixes.iter().any(|p| frame.class_name.starts_with(p.as_str()))
    }
}

/// Renders a [`Throwable`] chain to bounded text.
#[derive(Clone)]
pub struct ThrowableRenderer {
    max_length: usize,
    max_frames_per_throwable: usize,
    root_cause_first: bool,
    abbreviator: Arc<dyn Abbreviator>,
    filter: Arc<dyn FrameFilter>,
}

impl fmt::Debug for ThrowableRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThrowableRenderer")
            .field("max_length", &self.max_length)
            .field("max_frames_per_throwable", &self.max_frames_per_throwable)
            .field("root_cause_first", &self.root_cause_first)
            .finish_non_exhaustive()
    }
}

impl Default for ThrowableRenderer {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            max_frames_per_throwable: usize::MAX,
            root_cause_first: false,
            abbreviator: AbbreviationPolicy::Length(CLASS_NAME_TARGET_LENGTH).build(),
            filter: Arc::new(AcceptAll),
        }
    }
}

impl ThrowableRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// `None` removes the per-throwable cap.
    pub fn max_frames_per_throwable(mut self, max_frames: Option<usize>) -> Self {
        self.max_frames_per_throwable = max_frames.unwrap_or(usize::MAX);
        self
    }

    pub fn root_cause_first(mut self, root_cause_first: bool) -> Self {
        self.root_cause_first = root_cause_first;
        self
    }

    pub fn abbreviator(mut self, abbreviator: Arc<dyn Abbreviator>) -> Self {
        self.abbreviator = abbreviator;
        self
    }

    pub fn frame_filter(mut self, filter: Arc<dyn FrameFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// The frame filter, shared with the stack hasher.
    pub fn filter(&self) -> Arc<dyn FrameFilter> {
        Arc::clone(&self.filter)
    }

    pub fn render(&self, throwable: &Throwable) -> String {
        let mut buf = String::with_capacity(self.max_length.saturating_add(100).min(4096));
        if self.root_cause_first {
            self.append_root_cause_first(&mut buf, None, 1, throwable);
        } else {
            self.append_root_cause_last(&mut buf, None, 1, throwable);
        }
        if buf.len() > self.max_length {
            // marker is "...\n", shortened from the front when the limit is tiny
            let marker_len = TRUNCATION_MARKER.len().min(self.max_length);
            let mut cut = self.max_length - marker_len;
            while !buf.is_char_boundary(cut) {
                cut -= 1;
            }
            buf.truncate(cut);
            buf.push_str(&TRUNCATION_MARKER[TRUNCATION_MARKER.len() - marker_len..]);
        }
        buf
    }

    fn exhausted(&self, buf: &str) -> bool {
        buf.len() > self.max_length
    }

    fn append_root_cause_last(&self, buf: &mut String, prefix: Option<&str>, indent: usize, throwable: &Throwable) {
        if self.exhausted(buf) {
            return;
        }
        self.append_first_line(buf, prefix, indent, throwable);
        self.append_frames(buf, indent, &throwable.frames);
        for suppressed in &throwable.suppressed {
            self.append_root_cause_last(buf, Some(SUPPRESSED), indent + 1, suppressed);
        }
        if let Some(cause) = &throwable.cause {
            self.append_root_cause_last(buf, Some(CAUSED_BY), indent, cause);
        }
    }

    fn append_root_cause_first(&self, buf: &mut String, prefix: Option<&str>, indent: usize, throwable: &Throwable) {
        if self.exhausted(buf) {
            return;
        }
        let mut prefix = prefix;
        if let Some(cause) = &throwable.cause {
            self.append_root_cause_first(buf, prefix, indent, cause);
            prefix = Some(WRAPPED_BY);
        }
        self.append_first_line(buf, prefix, indent, throwable);
        self.append_frames(buf, indent, &throwable.frames);
        for suppressed in &throwable.suppressed {
            self.append_root_cause_first(buf, Some(SUPPRESSED), indent + 1, suppressed);
        }
    }

    fn append_first_line(&self, buf: &mut String, prefix: Option<&str>, indent: usize, throwable: &Throwable) {
        if self.exhausted(buf) {
            return;
        }
        push_indent(buf, indent - 1);
        if let Some(prefix) = prefix {
            buf.push_str(prefix);
        }
        buf.push_str(&self.abbreviator.abbreviate(&throwable.class_name));
        if let Some(message) = &throwable.message {
            buf.push_str(": ");
            buf.push_str(message);
        }
        buf.push('\n');
    }

    fn append_frames(&self, buf: &mut String, indent: usize, frames: &[StackFrame]) {
        let mut excluded = 0usize;
        let mut replaying = false;
        let mut appended = 0usize;
        let mut i = 0usize;

        while i < frames.len() {
            if appended >= self.max_frames_per_throwable || self.exhausted(buf) {
                break;
            }
            let frame = &frames[i];
            if i < ALWAYS_INCLUDED_FRAMES || self.filter.include(frame) {
                if excluded >= 2 {
                    self.append_placeholder(buf, indent, excluded, "frames excluded");
                    excluded = 0;
                } else if excluded == 1 {
                    // step back and write the lone excluded frame normally
                    replaying = true;
                    excluded = 0;
                    i -= 1;
                    continue;
                }
                self.append_frame(buf, indent, frame);
                replaying = false;
                appended += 1;
            } else if replaying {
                self.append_frame(buf, indent, frame);
                appended += 1;
            } else {
                excluded += 1;
            }
            i += 1;
        }

        if i < frames.len() {
            if excluded >= 2 {
                self.append_placeholder(buf, indent, excluded, "frames excluded");
            } else if excluded == 1 {
                i -= 1;
            }
            self.append_placeholder(buf, indent, frames.len() - i, "frames truncated");
        } else if excluded >= 2 {
            self.append_placeholder(buf, indent, excluded, "frames excluded");
        } else if excluded == 1 {
            self.append_frame(buf, indent, &frames[frames.len() - 1]);
        }
    }

    fn append_frame(&self, buf: &mut String, indent: usize, frame: &StackFrame) {
        if self.exhausted(buf) {
            return;
        }
        push_indent(buf, indent);
        buf.push_str("at ");
        buf.push_str(&self.abbreviator.abbreviate(&frame.class_name));
        buf.push('.');
        buf.push_str(&frame.method);
        buf.push('(');
        buf.push_str(frame.file.as_deref().unwrap_or("Unknown Source"));
        if let Some(line) = frame.line {
            let _ = write!(buf, ":{}", line);
        }
        buf.push_str(")\n");
    }

    fn append_placeholder(&self, buf: &mut String, indent: usize, count: usize, message: &str) {
        push_indent(buf, indent);
        let _ = writeln!(buf, "{} {} {}", ELLIPSIS, count, message);
    }
}

fn push_indent(buf: &mut String, indent: usize) {
    for _ in 0..indent {
        buf.push('\t');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(class: &str, count: usize) -> Vec<StackFrame> {
        (0..count)
            .map(|i| StackFrame::new(class, format!("m{}", i)).at("Src.rs", i as u32 + 1))
            .collect()
    }

    fn renderer() -> ThrowableRenderer {
        ThrowableRenderer::new().abbreviator(AbbreviationPolicy::Full.build())
    }

    #[test]
    fn test_first_line_and_frames() {
        let t = Throwable::new("app.Boom", "it broke").with_frames(frames("app.Worker", 2));
        let text = renderer().render(&t);
        assert_eq!(
            text,
            "app.Boom: it broke\n\tat app.Worker.m0(Src.rs:1)\n\tat app.Worker.m1(Src.rs:2)\n"
        );
    }

    #[test]
    fn test_unknown_source_without_location() {
        let t = Throwable::new("app.Boom", "x").with_frame(StackFrame::new("app.Worker", "run"));
        assert!(renderer().render(&t).contains("\tat app.Worker.run(Unknown Source)\n"));
    }

    #[test]
    fn test_cause_and_suppressed_root_cause_last() {
        let t = Throwable::new("app.Outer", "outer")
            .with_suppressed(Throwable::new("app.Hidden", "hidden"))
            .with_cause(Throwable::new("app.Root", "root"));
        let text = renderer().render(&t);
        assert_eq!(text, "app.Outer: outer\n\tSuppressed: app.Hidden: hidden\nCaused by: app.Root: root\n");
    }

    #[test]
    fn test_root_cause_first() {
        let t = Throwable::new("app.Outer", "outer").with_cause(Throwable::new("app.Root", "root"));
        let text = renderer().root_cause_first(true).render(&t);
        assert_eq!(text, "app.Root: root\nWrapped by: app.Outer: outer\n");
    }

    #[test]
    fn test_excluded_run_collapses() {
        let mut all = frames("app.Keep", 2);
        all.extend(frames("lib.Skip", 3));
        all.extend(frames("app.Keep", 1));
        let t = Throwable::new("app.Boom", "x").with_frames(all);
        let filter: Arc<dyn FrameFilter> = Arc::new(ExcludePrefixes::new(["lib."]));
        let text = renderer().frame_filter(filter).render(&t);

        assert!(text.contains("\t... 3 frames excluded\n"));
        assert!(!text.contains("lib.Skip"));
        assert_eq!(text.matches("\tat app.Keep").count(), 3);
    }

    #[test]
    fn test_single_excluded_frame_is_written() {
        let mut all = frames("app.Keep", 2);
        all.extend(frames("lib.Skip", 1));
        all.extend(frames("app.Keep", 1));
        let t = Throwable::new("app.Boom", "x").with_frames(all);
        let filter: Arc<dyn FrameFilter> = Arc::new(ExcludePrefixes::new(["lib."]));
        let text = renderer().frame_filter(filter).render(&t);

        assert!(!text.contains("excluded"));
        assert!(text.contains("\tat lib.Skip.m0(Src.rs:1)\n"));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_trailing_single_excluded_frame_is_written() {
        let t = Throwable::new("app.Boom", "x").with_frames([
            StackFrame::new("app.A", "a"),
            StackFrame::new("app.B", "b"),
            StackFrame::new("app.C", "c"),
            StackFrame::new("lib.Skip", "skip"),
        ]);
        let filter: Arc<dyn FrameFilter> = Arc::new(ExcludePrefixes::new(["lib."]));
        let text = renderer().frame_filter(filter).render(&t);

        assert_eq!(
            text,
            "app.Boom: x\n\tat app.A.a(Unknown Source)\n\tat app.B.b(Unknown Source)\n\tat app.C.c(Unknown Source)\n\tat lib.Skip.skip(Unknown Source)\n"
        );
    }

    #[test]
    fn test_trailing_excluded_run_collapses() {
        let mut all = frames("app.Keep", 3);
        all.extend(frames("lib.Skip", 2));
        let t = Throwable::new("app.Boom", "x").with_frames(all);
        let filter: Arc<dyn FrameFilter> = Arc::new(ExcludePrefixes::new(["lib."]));
        let text = renderer().frame_filter(filter).render(&t);

        assert!(text.ends_with("\tat app.Keep.m2(Src.rs:3)\n\t... 2 frames excluded\n"));
    }

    #[test]
    fn test_first_two_frames_bypass_filter() {
        let t = Throwable::new("app.Boom", "x").with_frames(frames("lib.Skip", 4));
        let filter: Arc<dyn FrameFilter> = Arc::new(ExcludePrefixes::new(["lib."]));
        let text = renderer().frame_filter(filter).render(&t);

        assert!(text.contains("\tat lib.Skip.m0(Src.rs:1)\n"));
        assert!(text.contains("\tat lib.Skip.m1(Src.rs:2)\n"));
        assert!(text.ends_with("\t... 2 frames excluded\n"));
    }

    #[test]
    fn test_frames_truncated_per_throwable() {
        let t = Throwable::new("app.Boom", "x")
            .with_frames(frames("app.Deep", 10))
            .with_cause(Throwable::new("app.Root", "root").with_frames(frames("app.Root", 4)));
        let text = renderer().max_frames_per_throwable(Some(3)).render(&t);

        assert!(text.contains("\t... 7 frames truncated\n"));
        assert!(text.contains("\t... 1 frames truncated\n"));
        assert_eq!(text.matches("\tat ").count(), 6);
    }

    #[test]
    fn test_total_length_is_bounded() {
        let mut t = Throwable::new("app.Leaf", "leaf").with_frames(frames("app.Frame", 50));
        for depth in 0..40 {
            t = Throwable::new(format!("app.Level{}", depth), "wrapping").with_frames(frames("app.Frame", 50)).with_cause(t);
        }
        let unbounded = renderer().max_length(usize::MAX).render(&t);
        assert!(unbounded.len() > 10 * 2_000);

        let text = renderer().max_length(2_000).render(&t);
        assert!(text.len() <= 2_000);
        assert!(text.ends_with("...\n"));
    }

    #[test]
    fn test_tiny_length_limits_are_honoured() {
        let t = Throwable::new("app.Boom", "some long message here");
        let expected = ["", "\n", ".\n", "..\n", "...\n"];
        for (max, marker) in expected.iter().enumerate() {
            let text = renderer().max_length(max).render(&t);
            assert_eq!(text, *marker, "max_length {}", max);
            assert!(text.len() <= max);
        }

        let text = renderer().max_length(5).render(&t);
        assert_eq!(text, "a...\n");
    }

    #[test]
    fn test_class_names_abbreviated() {
        let t = Throwable::new("com.example.service.Failure", "x")
            .with_frame(StackFrame::new("com.example.service.Handler", "run").at("Handler.rs", 7));
        let text = ThrowableRenderer::new()
            .abbreviator(AbbreviationPolicy::Length(1).build())
            .render(&t);
        assert_eq!(text, "c.e.s.Failure: x\n\tat c.e.s.Handler.run(Handler.rs:7)\n");
    }

    #[test]
    fn test_from_error_walks_sources() {
        let err = "abc".parse::<u32>().unwrap_err();
        let t = Throwable::from_error(&err);
        assert!(t.class_name.ends_with("ParseIntError"));
        assert_eq!(t.message.as_deref(), Some("invalid digit found in string"));
        assert!(t.cause.is_none());
    }
}
