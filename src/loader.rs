//! Script loading.
//!
//! A small, line-oriented loader: just enough of the script
//! language to register triggers, declare topic edges and arrays, and enforce
//! the version gate. Loading happens in two phases:
//!
//! ```text
//! source ── parse ──> Script (directives + warnings)
//!             │         └─ `! version` newer than supported -> Err, nothing applied
//!             v
//!        apply ──> Brain
//!                   └─ malformed patterns rejected one by one, rest applied
//! ```
//!
//! Supported lines:
//!
//! ```text
//! ! version = 2.0
//! ! array colors = red green sky blue      (or: red|green|sky blue)
//! > topic name [includes a b] [inherits c]
//! < topic
//! + trigger pattern
//! % previous reply pattern
//! - response
//! ^ response continuation
//! // comment            /* block comment */
//! ```
//!
//! Triggers outside a topic block belong to [`crate::DEFAULT_TOPIC`]. Other
//! commands are skipped and reported as warnings.

use crate::api::{Brain, DEFAULT_TOPIC};
use crate::error::{Error, Result};
use tracing::{info, warn};

/// What a successful load did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Version declared by the source, if any.
    pub version: Option<f64>,
    /// Triggers registered (or re-registered).
    pub triggers: usize,
    /// Triggers whose pattern failed to compile. Each is an
    /// [`Error::MalformedPattern`].
    pub rejected: Vec<Error>,
    /// Lines that were skipped, with their line numbers.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Directive {
    Array { name: String, entries: Vec<String> },
    Topic { name: String, includes: Vec<String>, inherits: Vec<String> },
    Trigger { line: usize, topic: String, pattern: String, previous: Option<String>, responses: Vec<String> },
}

#[derive(Debug, Default)]
struct Script {
    version: Option<f64>,
    directives: Vec<Directive>,
    warnings: Vec<String>,
}

/// Parser state while walking the source lines.
struct ScriptParser {
    supported_version: f64,
    script: Script,
    topic: String,
    pending: Option<Directive>,
    in_comment: bool,
    in_object: bool,
}

impl ScriptParser {
    fn new(supported_version: f64) -> Self {
        ScriptParser {
            supported_version,
            script: Script::default(),
            topic: DEFAULT_TOPIC.to_string(),
            pending: None,
            in_comment: false,
            in_object: false,
        }
    }

    fn warn(&mut self, line: usize, message: impl std::fmt::Display) {
        self.script.warnings.push(format!("line {line}: {message}"));
    }

    fn flush(&mut self) {
        if let Some(trigger) = self.pending.take() {
            self.script.directives.push(trigger);
        }
    }

    fn parse(mut self, source: &str) -> Result<Script> {
        for (idx, raw) in source.lines().enumerate() {
            self.line(idx + 1, raw)?;
        }
        self.flush();
        Ok(self.script)
    }

    fn line(&mut self, number: usize, raw: &str) -> Result<()> {
        let mut line = raw.trim();

        if self.in_comment {
            if line.contains("*/") {
                self.in_comment = false;
            }
            return Ok(());
        }
        if line.starts_with("/*") {
            self.in_comment = !line.contains("*/");
            return Ok(());
        }
        if line.is_empty() || line.starts_with("//") {
            return Ok(());
        }
        if let Some(idx) = line.find(" // ") {
            line = line[..idx].trim_end();
        }

        let mut chars = line.chars();
        let Some(command) = chars.next() else {
            return Ok(());
        };
        let rest = chars.as_str().trim();

        if self.in_object {
            if command == '<' && rest.starts_with("object") {
                self.in_object = false;
            }
            return Ok(());
        }

        match command {
            '!' => self.definition(number, rest)?,
            '>' => self.open_block(number, rest),
            '<' => {
                self.flush();
                self.topic = DEFAULT_TOPIC.to_string();
            }
            '+' => {
                self.flush();
                self.pending = Some(Directive::Trigger {
                    line: number,
                    topic: self.topic.clone(),
                    pattern: rest.to_string(),
                    previous: None,
                    responses: Vec::new(),
                });
            }
            '%' => match self.pending.as_mut() {
                Some(Directive::Trigger { previous, .. }) => *previous = Some(rest.to_string()),
                _ => self.warn(number, "'%' without a trigger"),
            },
            '-' => match self.pending.as_mut() {
                Some(Directive::Trigger { responses, .. }) => responses.push(rest.to_string()),
                _ => self.warn(number, "'-' without a trigger"),
            },
            '^' => match self.pending.as_mut() {
                Some(Directive::Trigger { responses, .. }) if !responses.is_empty() => {
                    if let Some(last) = responses.last_mut() {
                        last.push_str(rest);
                    }
                }
                _ => self.warn(number, "'^' without a response to continue"),
            },
            other => self.warn(number, format!("unsupported command '{other}'")),
        }
        Ok(())
    }

    fn definition(&mut self, number: usize, rest: &str) -> Result<()> {
        let Some(caps) = regex!(r"^(\w+)(?:\s+([^=]*?))?\s*=\s*(.*)$").captures(rest) else {
            self.warn(number, "malformed definition");
            return Ok(());
        };
        let kind = &caps[1];
        let name = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
        let value = caps[3].trim();

        match kind {
            "version" => {
                let declared = value
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| Error::InvalidVersion(value.to_string()))?;
                if declared > self.supported_version {
                    return Err(Error::VersionIncompatible { declared, supported: self.supported_version });
                }
                self.script.version = Some(declared);
            }
            "array" if !name.is_empty() => {
                let entries: Vec<String> = if value.contains('|') {
                    value.split('|').map(|e| e.trim().to_string()).collect()
                } else {
                    value.split_whitespace().map(str::to_string).collect()
                };
                self.script.directives.push(Directive::Array { name: name.to_string(), entries });
            }
            "array" => self.warn(number, "array definition without a name"),
            other => self.warn(number, format!("unsupported definition '{other}'")),
        }
        Ok(())
    }

    fn open_block(&mut self, number: usize, rest: &str) {
        self.flush();
        let mut words = rest.split_whitespace();
        match words.next() {
            Some("topic") => {
                let Some(name) = words.next() else {
                    self.warn(number, "topic without a name");
                    return;
                };
                let (mut includes, mut inherits) = (Vec::new(), Vec::new());
                let mut target: Option<&mut Vec<String>> = None;
                for word in words {
                    match word {
                        "includes" => target = Some(&mut includes),
                        "inherits" => target = Some(&mut inherits),
                        topic => match target.as_mut() {
                            Some(list) => list.push(topic.to_string()),
                            None => self.script.warnings.push(format!("line {number}: stray word '{topic}'")),
                        },
                    }
                }
                self.topic = name.to_string();
                self.script.directives.push(Directive::Topic { name: name.to_string(), includes, inherits });
            }
            Some("begin") => {
                self.topic = "__begin__".to_string();
                self.script.directives.push(Directive::Topic {
                    name: self.topic.clone(),
                    includes: Vec::new(),
                    inherits: Vec::new(),
                });
            }
            Some("object") => self.in_object = true,
            Some(other) => self.warn(number, format!("unsupported block '{other}'")),
            None => self.warn(number, "block without a type"),
        }
    }
}

impl Brain {
    /// Load script `source`.
    ///
    /// A `! version` newer than [`crate::Options::supported_version`] fails
    /// with [`Error::VersionIncompatible`] and nothing from `source` is
    /// applied. Triggers with malformed patterns are skipped individually
    /// and listed in [`LoadReport::rejected`]. Call [`Brain::sort_all`]
    /// afterwards.
    pub fn stream(&mut self, source: &str) -> Result<LoadReport> {
        let script = ScriptParser::new(self.options.supported_version).parse(source)?;

        let mut report = LoadReport { version: script.version, warnings: script.warnings, ..LoadReport::default() };
        for warning in &report.warnings {
            warn!(%warning, "skipped script line");
        }

        for directive in script.directives {
            match directive {
                Directive::Array { name, entries } => self.set_array(&name, entries),
                Directive::Topic { name, includes, inherits } => {
                    self.graph.ensure_topic(&name);
                    for other in &includes {
                        self.add_include(&name, other);
                    }
                    for other in &inherits {
                        self.add_inherit(&name, other);
                    }
                }
                Directive::Trigger { line, topic, pattern, previous, responses } => {
                    match self.register_trigger(&topic, &pattern, responses, previous.as_deref()) {
                        Ok(_) => report.triggers += 1,
                        Err(err) => {
                            warn!(line, %err, "rejected trigger");
                            report.rejected.push(err);
                        }
                    }
                }
            }
        }

        info!(triggers = report.triggers, rejected = report.rejected.len(), "loaded script");
        Ok(report)
    }
}
