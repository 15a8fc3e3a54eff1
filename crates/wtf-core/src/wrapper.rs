//! Optional wrapper scripts around the managed binary.
//!
//! With a non-empty template, [`Wrapper::wrap`] renders the template into
//! a temporary executable script and returns an invocation of that script
//! instead of the binary. Templates are Handlebars in strict mode and see
//! three variables:
//!
//! | name           | value                                        |
//! |----------------|----------------------------------------------|
//! | `Command`      | program and arguments joined by single spaces |
//! | `Verbose`      | whether verbose output was requested         |
//! | `TerraformBin` | the program path alone                       |
//!
//! Go-template references are accepted too, so existing configurations
//! keep working. The supported subset is field references (`{{.Command}}`),
//! `{{if .X}}` and `{{if not .X}}` with `{{else}}` and `{{end}}`, and the
//! `{{-`/`-}}` trim markers. Anything else (pipelines, `range`, `with`,
//! functions other than `not`) must be written as Handlebars.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde_json::json;
use tempfile::TempPath;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WrapperError {
    #[error("cannot render wrapper template: {0}")]
    Template(#[source] Box<handlebars::RenderError>),

    #[error("cannot create wrapper script: {0}")]
    Io(#[from] io::Error),
}

impl From<handlebars::RenderError> for WrapperError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template(Box::new(err))
    }
}

/// A program and the arguments to run it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Wrapper {
    template: String,
    script: Option<TempPath>,
}

impl Wrapper {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            script: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.template.is_empty()
    }

    /// Path of the script created by the last [`wrap`](Self::wrap), until
    /// [`cleanup`](Self::cleanup).
    pub fn script_path(&self) -> Option<&Path> {
        self.script.as_deref()
    }

    /// Turn `program args...` into the invocation to actually execute.
    ///
    /// An empty template returns the input unchanged. A script left over
    /// from an earlier call is removed first.
    pub fn wrap(
        &mut self,
        program: PathBuf,
        args: Vec<String>,
        verbose: bool,
    ) -> Result<Invocation, WrapperError> {
        if self.template.is_empty() {
            return Ok(Invocation { program, args });
        }
        self.cleanup()?;

        let bin = program.display().to_string();
        let command = std::iter::once(bin.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        let data = json!({
            "Command": command,
            "Verbose": verbose,
            "TerraformBin": bin,
        });

        let mut hb = Handlebars::new();
        hb.set_strict_mode(true);
        hb.register_escape_fn(handlebars::no_escape);
        let script = hb.render_template(&translate_go_syntax(&self.template), &data)?;

        let mut file = tempfile::Builder::new()
            .prefix("wrapped.terraform.")
            .suffix(".wtf")
            .tempfile()?;
        file.write_all(script.as_bytes())?;
        file.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o700))?;
        }

        // Close the handle; some kernels refuse to exec a file open for writing.
        let path = file.into_temp_path();
        tracing::debug!("wrapper script written to {}", path.display());

        let invocation = Invocation {
            program: path.to_path_buf(),
            args: Vec::new(),
        };
        self.script = Some(path);
        Ok(invocation)
    }

    /// Remove the script created by [`wrap`](Self::wrap), if any.
    pub fn cleanup(&mut self) -> Result<(), WrapperError> {
        if let Some(path) = self.script.take() {
            tracing::debug!("removing wrapper script {}", path.display());
            path.close()?;
        }
        Ok(())
    }
}

/// Rewrite the Go-template subset used by older configurations into
/// Handlebars:
///
/// | Go                | Handlebars          |
/// |-------------------|---------------------|
/// | `{{.X}}`          | `{{X}}`             |
/// | `{{if .X}}`       | `{{#if X}}`         |
/// | `{{if not .X}}`   | `{{#unless X}}`     |
/// | `{{else}}`        | `{{else}}`          |
/// | `{{end}}`         | `{{/if}}` or `{{/unless}}`, whichever is open |
/// | `{{- ` / ` -}}`   | `{{~` / `~}}`       |
///
/// Other tags pass through untouched.
fn translate_go_syntax(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut open_blocks: Vec<&str> = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            rest = &rest[open..];
            break;
        };
        let tag = &after[..close];
        rest = &after[close + 2..];

        let (trim_before, tag) = strip_trim_start(tag);
        let (trim_after, tag) = strip_trim_end(tag);
        let inner = tag.trim();

        let body = if let Some(field) = go_condition(inner, "if not ") {
            open_blocks.push("unless");
            format!("#unless {field}")
        } else if let Some(field) = go_condition(inner, "if ") {
            open_blocks.push("if");
            format!("#if {field}")
        } else if inner == "end" {
            format!("/{}", open_blocks.pop().unwrap_or("if"))
        } else if let Some(field) = inner.strip_prefix('.') {
            field.to_string()
        } else {
            tag.to_string()
        };

        out.push_str("{{");
        if trim_before {
            out.push('~');
        }
        out.push_str(&body);
        if trim_after {
            out.push('~');
        }
        out.push_str("}}");
    }

    out.push_str(rest);
    out
}

/// `if .X` style condition: the field name after `keyword` and a dot.
fn go_condition<'a>(inner: &'a str, keyword: &str) -> Option<&'a str> {
    inner
        .strip_prefix(keyword)
        .and_then(|cond| cond.trim_start().strip_prefix('.'))
        .map(str::trim_end)
}

/// Go's `{{- ` marker: a dash followed by whitespace.
fn strip_trim_start(tag: &str) -> (bool, &str) {
    match tag.strip_prefix('-') {
        Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest),
        _ => (false, tag),
    }
}

/// Go's ` -}}` marker: whitespace followed by a dash.
fn strip_trim_end(tag: &str) -> (bool, &str) {
    match tag.strip_suffix('-') {
        Some(rest) if rest.ends_with(char::is_whitespace) => (true, rest),
        _ => (false, tag),
    }
}
