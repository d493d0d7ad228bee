//! Panel markup.
//!
//! Rendering is a pure function of the view state, the active tab's cached
//! scan and the ad-blocker settings: equal inputs give byte-identical HTML.

use std::fmt::Write;

use super::settings::{AdblockSetting, AdblockSettings};
use super::state::{ModalPhase, Tab, TabStatus, ViewState};
use crate::cache::ScanOutput;
use crate::finders::{preview, CategorizedImages, CategorizedLinks, CategorizedVideos, LinkCategory, Preview};
use crate::record::{Categorized, Category};
use crate::tables::export::html_table;
use crate::tables::{ExportFormat, TableModel};
use crate::text::{escape_html, truncate};

/// Element id of the panel root.
pub const PANEL_ID: &str = "page-inspector";

const MAX_LABEL_CHARS: usize = 80;

/// Render the whole panel.
#[must_use]
pub fn render_panel(state: &ViewState, active: Option<&ScanOutput>, settings: &AdblockSettings) -> String {
    let mut out = String::new();
    let phase = phase_name(state.phase);

    if !state.phase.is_visible() {
        let _ = write!(out, r#"<div id="{PANEL_ID}" class="pi-modal" data-phase="{phase}" hidden></div>"#);
        return out;
    }

    let _ = writeln!(
        out,
        r#"<div id="{PANEL_ID}" class="pi-modal" data-phase="{phase}" role="dialog" aria-modal="true">"#
    );
    out.push_str(r#"<button class="pi-close" data-action="close" aria-label="Close">&times;</button>"#);
    out.push('\n');
    render_tabs(&mut out, state);

    let _ = writeln!(
        out,
        r#"<section class="pi-panel" data-tab="{}">"#,
        state.active_tab.id()
    );
    if let Some(notice) = &state.notice {
        let _ = writeln!(out, r#"<p class="pi-notice">{}</p>"#, escape_html(notice));
    }
    match (state.active_tab, state.status(state.active_tab), active) {
        (Tab::AdblockerSettings, _, _) => render_settings(&mut out, settings),
        (_, TabStatus::NotLoaded, _) | (_, _, None) => out.push_str("<p class=\"pi-loading\">Scanning…</p>\n"),
        (tab, TabStatus::Loaded { .. }, Some(output)) => {
            if output.is_empty() {
                let _ = writeln!(out, r#"<p class="pi-empty">No {} found</p>"#, tab.title().to_lowercase());
            } else {
                render_output(&mut out, output);
            }
        }
    }
    out.push_str("</section>\n</div>\n");
    out
}

fn phase_name(phase: ModalPhase) -> &'static str {
    match phase {
        ModalPhase::Closed => "closed",
        ModalPhase::Opening => "opening",
        ModalPhase::Open => "open",
        ModalPhase::Closing => "closing",
    }
}

fn render_tabs(out: &mut String, state: &ViewState) {
    out.push_str("<nav class=\"pi-tabs\" role=\"tablist\">");
    for tab in Tab::ALL {
        let selected = *tab == state.active_tab;
        let count = match state.status(*tab) {
            TabStatus::Loaded { items, .. } if tab.finder().is_some() => format!(" ({items})"),
            _ => String::new(),
        };
        let _ = write!(
            out,
            r#"<button role="tab" data-tab="{}" aria-selected="{selected}"{}>{}{count}</button>"#,
            tab.id(),
            if selected { r#" class="active""# } else { "" },
            tab.title(),
        );
    }
    out.push_str("</nav>\n");
}

fn render_output(out: &mut String, output: &ScanOutput) {
    match output {
        ScanOutput::Links(links) => render_links(out, links),
        ScanOutput::Images(images) => render_images(out, images),
        ScanOutput::Videos(videos) => render_videos(out, videos),
        ScanOutput::Tables(tables) => render_tables(out, tables),
    }
}

fn group_header<K: Category>(out: &mut String, collection: &Categorized<K>, kind: K) -> bool {
    let count = collection.in_category(kind).count();
    if count == 0 {
        return false;
    }
    let _ = writeln!(
        out,
        r#"<section class="pi-group" data-category="{0}"><h3>{0} ({count})</h3>"#,
        kind.label()
    );
    true
}

/// Whether a link may be rendered as a live anchor. Unwanted links and
/// schemes other than http(s) and mailto are shown as text only.
fn clickable(kind: LinkCategory, url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    kind != LinkCategory::Unwanted && ["http://", "https://", "mailto:"].iter().any(|p| lower.starts_with(p))
}

fn render_links(out: &mut String, links: &CategorizedLinks) {
    for kind in LinkCategory::ALL {
        if !group_header(out, links, *kind) {
            continue;
        }
        out.push_str("<ul>\n");
        for link in links.in_category(*kind) {
            let label = link.meta("text").filter(|t| !t.is_empty()).unwrap_or(&link.source_url);
            let status = link
                .meta("status")
                .map(|s| format!(r#" <span class="pi-status">{}</span>"#, escape_html(s)))
                .unwrap_or_default();
            let url = escape_html(&link.source_url);
            let label = escape_html(&truncate(label, MAX_LABEL_CHARS));
            if clickable(*kind, &link.source_url) {
                let _ = writeln!(
                    out,
                    r#"<li><a href="{url}" target="_blank" rel="noopener noreferrer">{label}</a>{status}</li>"#,
                );
            } else {
                let _ = writeln!(
                    out,
                    r#"<li><span class="pi-link-text">{label}</span> <code class="pi-url">{url}</code>{status}</li>"#,
                );
            }
        }
        out.push_str("</ul></section>\n");
    }
}

fn displayable(url: &str) -> bool {
    ["http://", "https://", "data:", "blob:"].iter().any(|p| url.starts_with(p))
}

fn render_images(out: &mut String, images: &CategorizedImages) {
    for kind in crate::finders::ImageCategory::ALL {
        if !group_header(out, images, *kind) {
            continue;
        }
        out.push_str("<div class=\"pi-grid\">\n");
        for image in images.in_category(*kind) {
            let url = escape_html(&image.source_url);
            let caption = image
                .dimensions
                .map(|d| format!("{}×{}", d.width, d.height))
                .unwrap_or_default();
            out.push_str("<figure class=\"pi-item\">");
            if displayable(&image.source_url) {
                let _ = write!(
                    out,
                    r#"<img src="{url}" alt="{}" loading="lazy">"#,
                    escape_html(image.meta("alt").unwrap_or_default())
                );
                let _ = write!(out, r#"<button data-action="download" data-url="{url}">Download</button>"#);
            } else {
                let reason = image.meta("reason").unwrap_or("not available");
                let _ = write!(out, r#"<div class="pi-placeholder">{}</div>"#, escape_html(reason));
            }
            let _ = writeln!(out, "<figcaption>{caption}</figcaption></figure>");
        }
        out.push_str("</div></section>\n");
    }
}

fn render_videos(out: &mut String, videos: &CategorizedVideos) {
    for kind in crate::finders::VideoCategory::ALL {
        if !group_header(out, videos, *kind) {
            continue;
        }
        out.push_str("<ul class=\"pi-videos\">\n");
        for video in videos.in_category(*kind) {
            let mode = match preview(video) {
                Preview::Native { .. } => "native",
                Preview::Embed { .. } => "embed",
                Preview::OpenInNewTab { .. } => "open_in_new_tab",
            };
            let _ = writeln!(
                out,
                r#"<li><img class="pi-thumb" src="{}" alt="" loading="lazy"><button data-action="preview" data-mode="{mode}" data-url="{}">{}</button></li>"#,
                escape_html(video.meta("thumbnail").unwrap_or_default()),
                escape_html(&video.source_url),
                escape_html(&truncate(&video.source_url, MAX_LABEL_CHARS)),
            );
        }
        out.push_str("</ul></section>\n");
    }
}

fn render_tables(out: &mut String, tables: &[TableModel]) {
    for table in tables {
        let _ = writeln!(
            out,
            r#"<div class="pi-table" data-table-id="{}" data-kind="{}">"#,
            escape_html(&table.id),
            table.kind.label(),
        );
        out.push_str(&html_table(table));
        out.push_str("<div class=\"pi-export\">");
        for format in ExportFormat::ALL {
            let _ = write!(
                out,
                r#"<button data-action="export" data-format="{0}">{0}</button>"#,
                format.extension()
            );
        }
        out.push_str("</div>\n</div>\n");
    }
}

fn render_settings(out: &mut String, settings: &AdblockSettings) {
    out.push_str("<form class=\"pi-settings\">\n");
    for setting in AdblockSetting::ALL {
        let checked = if settings.get(*setting) { " checked" } else { "" };
        let disabled = if *setting != AdblockSetting::Enabled && !settings.enabled {
            " disabled"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            r#"<label><input type="checkbox" name="{}" data-action="toggle"{checked}{disabled}> {}</label>"#,
            setting.key(),
            setting.label(),
        );
    }
    out.push_str("</form>\n");
}
