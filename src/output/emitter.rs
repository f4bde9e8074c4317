//! Timestamped diagnostic lines.
//!
//! Line layout: "<timestamp> <call sequence> <message>"
//!
//! Example: "14:03:22.123456 gears::Train.run:40 -> gears.helper:3 meshing 4 teeth"
//! Empty parts are left out together with their separator.

use super::options::EmitOptions;
use crate::inspector::{FrameInspector, ScopeRegistry};
use crate::sequence::{join_chain, SequenceFormatter};
use crate::stack::{self, FrameGuard, Receiver};
use crate::utils::config::{format_datetime, DiagConfig};
use crate::utils::error::ConfigError;
use chrono::{DateTime, Local};
use log::warn;
use std::fmt::Display;
use std::io::{self, Write};
use std::sync::Arc;

/// Writes diagnostic lines for the caller's position in the call chain
///
/// **Public** - cheap to clone, safe to share between threads
#[derive(Debug, Clone)]
pub struct Emitter {
    formatter: SequenceFormatter,
    config: DiagConfig,
}

impl Emitter {
    /// Create an emitter from a formatter and a config
    ///
    /// # Errors
    /// * Any `DiagConfig::validate` error
    pub fn new(formatter: SequenceFormatter, config: DiagConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { formatter, config })
    }

    /// Build the inspector, formatter and emitter from one registry
    pub fn from_registry(
        registry: Arc<ScopeRegistry>,
        config: DiagConfig,
    ) -> Result<Self, ConfigError> {
        let formatter = SequenceFormatter::new(FrameInspector::new(registry), &config);
        Self::new(formatter, config)
    }

    pub fn formatter(&self) -> &SequenceFormatter {
        &self.formatter
    }

    pub fn config(&self) -> &DiagConfig {
        &self.config
    }

    /// Write one line to `options.target`
    ///
    /// **Public** - main entry point for diagnostics
    ///
    /// # Arguments
    /// * `parts` - message values, joined with single spaces
    /// * `options` - depth, timestamp pattern, target and terminator
    ///
    /// # Errors
    /// Write failures from the stream, unchanged
    pub fn emit(&self, parts: &[&dyn Display], options: &EmitOptions) -> io::Result<()> {
        let frame = stack::enter(
            file!(),
            module_path!(),
            "Emitter.emit",
            line!(),
            Receiver::None,
        );
        let line = self.terminated_line(&frame, parts, options);
        options.target.write_all(line.as_bytes())
    }

    /// Write one line to a caller-supplied writer
    ///
    /// `options.target` is ignored.
    pub fn emit_to(
        &self,
        out: &mut dyn Write,
        parts: &[&dyn Display],
        options: &EmitOptions,
    ) -> io::Result<()> {
        let frame = stack::enter(
            file!(),
            module_path!(),
            "Emitter.emit_to",
            line!(),
            Receiver::None,
        );
        let line = self.terminated_line(&frame, parts, options);
        out.write_all(line.as_bytes())?;
        out.flush()
    }

    /// Compose a line without writing it (no terminator)
    pub fn render_line(&self, parts: &[&dyn Display], options: &EmitOptions) -> String {
        let frame = stack::enter(
            file!(),
            module_path!(),
            "Emitter.render_line",
            line!(),
            Receiver::None,
        );
        self.compose(&frame, parts, options)
    }

    fn terminated_line(
        &self,
        frame: &FrameGuard,
        parts: &[&dyn Display],
        options: &EmitOptions,
    ) -> String {
        let mut line = self.compose(frame, parts, options);
        line.push_str(options.end.as_deref().unwrap_or(&self.config.line_end));
        line
    }

    /// `frame` is the guard of the public entry point that called this;
    /// its frame is the innermost one and is left out of the chain.
    fn compose(&self, frame: &FrameGuard, parts: &[&dyn Display], options: &EmitOptions) -> String {
        let timestamp = self.timestamp(&Local::now(), options);

        let depth = options.depth.unwrap_or(self.config.caller_depth);
        // An inert guard pushed nothing, so the caller is already innermost.
        let skip = usize::from(frame.serial() != 0);
        let chain = join_chain(&self.formatter.collect(skip, depth));

        let message = parts
            .iter()
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        [timestamp, chain, message]
            .into_iter()
            .filter(|piece| !piece.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn timestamp(&self, now: &DateTime<Local>, options: &EmitOptions) -> String {
        if let Some(format) = options.datetime_format.as_deref() {
            match format_datetime(now, format) {
                Ok(timestamp) => return timestamp,
                Err(_) => warn!(
                    "Ignoring invalid datetime format {:?}, using {:?}",
                    format, self.config.datetime_format
                ),
            }
        }
        format_datetime(now, &self.config.datetime_format).unwrap_or_else(|_| {
            warn!("Cannot format timestamp with {:?}", self.config.datetime_format);
            String::new()
        })
    }
}

/// Emit a diagnostic line to stdout, recording the caller's line first.
///
/// ```ignore
/// let _frame = enter!("Train.run", recv = self);
/// diag!(emitter; "meshing", teeth, "teeth")?;
/// diag!(emitter, depth = 1; "done")?;
/// diag!(emitter)?;
/// ```
#[macro_export]
macro_rules! diag {
    ($emitter:expr $(, depth = $depth:expr)? ; $($part:expr),* $(,)?) => {{
        $crate::stack::checkpoint(line!());
        let options = $crate::output::EmitOptions::new() $(.with_depth($depth))?;
        $emitter.emit(&[$(&$part as &dyn ::std::fmt::Display),*], &options)
    }};
    ($emitter:expr $(, depth = $depth:expr)?) => {
        $crate::diag!($emitter $(, depth = $depth)? ;)
    };
}

/// Render a call sequence for the caller, recording its line first.
///
/// ```ignore
/// let chain = call_sequence!(formatter);          // default depth
/// let chain = call_sequence!(formatter, 0, 2);    // latest, depth
/// ```
#[macro_export]
macro_rules! call_sequence {
    ($formatter:expr) => {{
        $crate::stack::checkpoint(line!());
        $formatter.format_default(0)
    }};
    ($formatter:expr, $latest:expr, $depth:expr) => {{
        $crate::stack::checkpoint(line!());
        $formatter.format_call_sequence($latest, $depth)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitter(config: DiagConfig) -> Emitter {
        Emitter::from_registry(Arc::new(ScopeRegistry::new()), config).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = DiagConfig::default().with_caller_depth(0);
        assert!(Emitter::from_registry(Arc::new(ScopeRegistry::new()), config).is_err());
    }

    #[test]
    fn test_no_frames_no_message_is_timestamp_only() {
        let emitter = emitter(DiagConfig::default().with_datetime_format("fixed"));
        assert_eq!(emitter.render_line(&[], &EmitOptions::new()), "fixed");
    }

    #[test]
    fn test_invalid_override_falls_back() {
        let emitter = emitter(DiagConfig::default().with_datetime_format("fixed"));
        let options = EmitOptions::new().with_datetime_format("%H:%");
        assert_eq!(emitter.render_line(&[&"x"], &options), "fixed x");
    }

    #[test]
    fn test_parse_only_specifier() {
        let config = DiagConfig::default().with_datetime_format("%#z");
        assert!(matches!(
            Emitter::from_registry(Arc::new(ScopeRegistry::new()), config),
            Err(ConfigError::InvalidDateTimeFormat(_))
        ));

        let emitter = emitter(DiagConfig::default().with_datetime_format("fixed"));
        let options = EmitOptions::new().with_datetime_format("%#z");
        assert_eq!(emitter.render_line(&[&"x"], &options), "fixed x");
    }

    #[test]
    fn test_inert_guard_keeps_caller_frame() {
        let emitter = emitter(DiagConfig::default().with_datetime_format("fixed"));
        let _caller = stack::enter(file!(), module_path!(), "caller", 9, Receiver::None);
        let options = EmitOptions::new().with_depth(1);
        assert_eq!(
            emitter.compose(&FrameGuard::inert(), &[&"x"], &options),
            "fixed emitter.caller:9 x"
        );
    }

    #[test]
    fn test_custom_terminator() {
        let emitter = emitter(DiagConfig::default().with_datetime_format("T"));
        let mut out = Vec::new();
        let options = EmitOptions::new().with_end("|");
        emitter.emit_to(&mut out, &[&"a", &1], &options).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "T a 1|");
    }
}
