//! Edit plans for ffmpeg's `concat` demuxer.
//!
//! A plan lists every slide with its on-screen duration, then repeats the last slide once more
//! without a duration. The concat demuxer ignores the duration of the final `file` entry, so the
//! repeated terminator is what keeps the last real slide on screen for its full time.

use std::path::{Path, PathBuf};

use crate::{
    foundation::error::{CardreelError, CardreelResult},
    render::slide::Slide,
};

/// File name of the plan inside a workspace.
pub const PLAN_FILE_NAME: &str = "slides.txt";

/// Default on-screen time per slide.
pub const DEFAULT_SLIDE_SECS: f64 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct PlanEntry {
    pub path: PathBuf,
    /// `None` only for the trailing terminator entry.
    pub duration_secs: Option<f64>,
}

/// Ordered list of concat entries. Built from slides, never from a directory listing.
#[derive(Clone, Debug, PartialEq)]
pub struct EditPlan {
    entries: Vec<PlanEntry>,
}

impl EditPlan {
    /// One timed entry per slide in the given order, plus the terminator.
    ///
    /// Slide paths must be UTF-8 without line breaks: the concat script is line-oriented text and
    /// anything else would name files that do not exist.
    pub fn from_slides(slides: &[Slide], duration_secs: f64) -> CardreelResult<Self> {
        let Some(last) = slides.last() else {
            return Err(CardreelError::invalid_request(
                "cannot build an edit plan without slides",
            ));
        };
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(CardreelError::config(format!(
                "slide duration must be positive, got {duration_secs}"
            )));
        }
        for slide in slides {
            match slide.path.to_str() {
                Some(p) if !p.contains(['\n', '\r']) => {}
                _ => {
                    return Err(CardreelError::workspace(format!(
                        "slide path '{}' cannot be written to a concat plan \
                         (not UTF-8 or contains a line break)",
                        slide.path.display()
                    )));
                }
            }
        }

        let mut entries = Vec::with_capacity(slides.len() + 1);
        entries.extend(slides.iter().map(|s| PlanEntry {
            path: s.path.clone(),
            duration_secs: Some(duration_secs),
        }));
        entries.push(PlanEntry {
            path: last.path.clone(),
            duration_secs: None,
        });
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    /// Paths of the timed entries, in order (terminator excluded).
    pub fn slide_paths(&self) -> impl Iterator<Item = &Path> {
        self.entries
            .iter()
            .filter(|e| e.duration_secs.is_some())
            .map(|e| e.path.as_path())
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.entries.iter().filter_map(|e| e.duration_secs).sum()
    }

    /// Render the concat script.
    pub fn to_concat_script(&self) -> String {
        let mut out = String::new();
        for e in &self.entries {
            out.push_str("file '");
            out.push_str(&escape_concat_path(&e.path.to_string_lossy()));
            out.push_str("'\n");
            if let Some(d) = e.duration_secs {
                out.push_str(&format!("duration {d}\n"));
            }
        }
        out
    }

    pub fn write_to(&self, path: &Path) -> CardreelResult<()> {
        std::fs::write(path, self.to_concat_script()).map_err(|e| {
            CardreelError::workspace(format!("write edit plan '{}': {e}", path.display()))
        })?;
        tracing::debug!(
            path = %path.display(),
            entries = self.entries.len(),
            "edit plan written"
        );
        Ok(())
    }

    /// Parse a concat script back into entries.
    ///
    /// Understands `file`/`duration` directives, quoted and backslash-escaped paths, comments,
    /// blank lines and the optional `ffconcat version 1.0` header. Other directives are rejected.
    pub fn parse(script: &str) -> CardreelResult<Self> {
        let mut entries = Vec::<PlanEntry>::new();
        for (lineno, raw) in script.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with("ffconcat ") {
                continue;
            }
            let (directive, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            match directive {
                "file" => entries.push(PlanEntry {
                    path: PathBuf::from(unquote_concat_token(rest.trim()).map_err(|e| {
                        CardreelError::invalid_request(format!("line {}: {e}", lineno + 1))
                    })?),
                    duration_secs: None,
                }),
                "duration" => {
                    let secs: f64 = rest.trim().parse().map_err(|_| {
                        CardreelError::invalid_request(format!(
                            "line {}: bad duration '{}'",
                            lineno + 1,
                            rest.trim()
                        ))
                    })?;
                    let Some(last) = entries.last_mut() else {
                        return Err(CardreelError::invalid_request(format!(
                            "line {}: duration before any file",
                            lineno + 1
                        )));
                    };
                    last.duration_secs = Some(secs);
                }
                other => {
                    return Err(CardreelError::invalid_request(format!(
                        "line {}: unsupported directive '{other}'",
                        lineno + 1
                    )));
                }
            }
        }
        Ok(Self { entries })
    }
}

/// Escape a path for use inside single quotes: `'` becomes `'\''`.
pub fn escape_concat_path(path: &str) -> String {
    path.replace('\'', r"'\''")
}

/// Decode one concat token: single-quoted spans are literal, `\x` outside quotes is `x`.
fn unquote_concat_token(token: &str) -> Result<String, &'static str> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' => loop {
                match chars.next() {
                    Some('\'') => break,
                    Some(c) => out.push(c),
                    None => return Err("unterminated quote"),
                }
            },
            '\\' => match chars.next() {
                Some(c) => out.push(c),
                None => return Err("dangling backslash"),
            },
            c => out.push(c),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../tests/unit/plan/concat.rs"]
mod tests;
