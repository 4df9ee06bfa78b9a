//! Metadata and parameter formatters for capabilities documents.
//!
//! Templates carry a single `{}` placeholder that receives the value.
//! Output goes to any [`std::fmt::Write`] sink.

use std::borrow::Cow;
use std::fmt::Write;

use ows_common::{MapConfig, Metadata, OwsResult};
use tracing::warn;

use crate::html::encode_html_entities;

/// What to do when a looked-up value is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingAction {
    /// Emit a warning comment into the output
    Warn,
    /// Stay quiet
    Silent,
}

/// Outcome of a formatter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintStatus {
    /// Output was produced without a warning
    Found,
    /// The value was missing and a warning comment was written
    Warned,
    /// Nothing was written
    NotFound,
}

const MISSING_METADATA: &str = "metadata";
const MISSING_PARAMETER: &str = "mapfile parameter";

fn render<W: Write>(out: &mut W, template: &str, value: &str, encode: bool) -> OwsResult<()> {
    let text = if encode {
        Cow::Owned(encode_html_entities(value)?)
    } else {
        Cow::Borrowed(value)
    };
    out.write_str(&template.replacen("{}", &text, 1))?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn render_found<W: Write>(
    out: &mut W,
    kind: &str,
    name: &str,
    value: Option<&str>,
    action: MissingAction,
    template: &str,
    default: Option<&str>,
    encode: bool,
) -> OwsResult<PrintStatus> {
    if let Some(value) = value {
        render(out, template, value, encode)?;
        return Ok(PrintStatus::Found);
    }

    let mut status = PrintStatus::NotFound;
    if action == MissingAction::Warn {
        warn!(name, kind, "Mandatory value missing");
        writeln!(
            out,
            "<!-- WARNING: Mandatory {} '{}' was missing in this context. -->",
            kind, name
        )?;
        status = PrintStatus::Warned;
    }

    if let Some(default) = default {
        render(out, template, default, encode)?;
        if status == PrintStatus::NotFound {
            status = PrintStatus::Found;
        }
    }

    Ok(status)
}

/// Render a metadata value through `template`, falling back to `default`.
pub fn print_metadata<W: Write>(
    out: &mut W,
    metadata: &Metadata,
    name: &str,
    action: MissingAction,
    template: &str,
    default: Option<&str>,
) -> OwsResult<PrintStatus> {
    let value = metadata.get(name);
    render_found(out, MISSING_METADATA, name, value, action, template, default, false)
}

/// Like [`print_metadata`], but HTML-encodes the value first.
pub fn print_encoded_metadata<W: Write>(
    out: &mut W,
    metadata: &Metadata,
    name: &str,
    action: MissingAction,
    template: &str,
    default: Option<&str>,
) -> OwsResult<PrintStatus> {
    let value = metadata.get(name);
    render_found(out, MISSING_METADATA, name, value, action, template, default, true)
}

/// Render a metadata value found on the layers of `group`.
///
/// Layers are searched in declaration order; the first one carrying the
/// key supplies the value.
pub fn print_group_metadata<W: Write>(
    out: &mut W,
    map: &MapConfig,
    group: &str,
    name: &str,
    action: MissingAction,
    template: &str,
    default: Option<&str>,
) -> OwsResult<PrintStatus> {
    let value = map.group_layers(group).find_map(|l| l.metadata.get(name));
    render_found(out, MISSING_METADATA, name, value, action, template, default, false)
}

/// Like [`print_group_metadata`], but HTML-encodes the value first.
pub fn print_encoded_group_metadata<W: Write>(
    out: &mut W,
    map: &MapConfig,
    group: &str,
    name: &str,
    action: MissingAction,
    template: &str,
    default: Option<&str>,
) -> OwsResult<PrintStatus> {
    let value = map.group_layers(group).find_map(|l| l.metadata.get(name));
    render_found(out, MISSING_METADATA, name, value, action, template, default, true)
}

/// Render a configuration parameter that may be unset. An empty value
/// counts as unset.
pub fn print_param<W: Write>(
    out: &mut W,
    name: &str,
    value: Option<&str>,
    action: MissingAction,
    template: &str,
    default: Option<&str>,
) -> OwsResult<PrintStatus> {
    let value = value.filter(|v| !v.is_empty());
    render_found(out, MISSING_PARAMETER, name, value, action, template, default, false)
}

/// Like [`print_param`], but HTML-encodes the value first.
pub fn print_encoded_param<W: Write>(
    out: &mut W,
    name: &str,
    value: Option<&str>,
    action: MissingAction,
    template: &str,
    default: Option<&str>,
) -> OwsResult<PrintStatus> {
    let value = value.filter(|v| !v.is_empty());
    render_found(out, MISSING_PARAMETER, name, value, action, template, default, true)
}

fn render_list<W: Write>(
    out: &mut W,
    metadata: &Metadata,
    name: &str,
    start_tag: Option<&str>,
    end_tag: Option<&str>,
    item_template: &str,
    encode: bool,
) -> OwsResult<bool> {
    let Some(value) = metadata.get(name) else {
        return Ok(false);
    };

    if let Some(start) = start_tag {
        out.write_str(start)?;
    }
    for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        render(out, item_template, token, encode)?;
    }
    if let Some(end) = end_tag {
        out.write_str(end)?;
    }
    Ok(true)
}

/// Render a comma-separated metadata value as a list.
///
/// Writes `start_tag`, each trimmed non-empty token through `item_template`,
/// then `end_tag`. Writes nothing at all when the key is absent.
pub fn print_metadata_list<W: Write>(
    out: &mut W,
    metadata: &Metadata,
    name: &str,
    start_tag: Option<&str>,
    end_tag: Option<&str>,
    item_template: &str,
) -> OwsResult<bool> {
    render_list(out, metadata, name, start_tag, end_tag, item_template, false)
}

/// Like [`print_metadata_list`], but HTML-encodes each token.
pub fn print_encoded_metadata_list<W: Write>(
    out: &mut W,
    metadata: &Metadata,
    name: &str,
    start_tag: Option<&str>,
    end_tag: Option<&str>,
    item_template: &str,
) -> OwsResult<bool> {
    render_list(out, metadata, name, start_tag, end_tag, item_template, true)
}
