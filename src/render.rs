//! HTML rendering of grouped tables.
//!
//! The renderer only reads [`GroupedTables`]; it never filters or sorts.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::{
    locations::WEATHERS,
    pipeline::{AggregatedEntry, GroupedTables, LocationGroup},
};

pub const NO_RESULTS: &str = "No fish available with this filter.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Icon, name, size, time, chance.
    #[default]
    Compact,
    /// Icon, name, one column per weather, time, chance.
    Verbose,
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn weather_icon_path(weather: &str) -> String {
    format!("icons/weather_{weather}.png")
}

/// Renders every non-empty group, or the no-results notice.
pub fn render_tables(tables: &GroupedTables, layout: Layout) -> String {
    if tables.is_empty() {
        return format!("<p class=\"no-results\">{NO_RESULTS}</p>\n");
    }
    let mut html = String::new();
    for group in tables.non_empty() {
        render_section(&mut html, group, layout);
    }
    html
}

fn render_section(html: &mut String, group: &LocationGroup, layout: Layout) {
    html.push_str("<section class=\"location-section\">\n");
    let _ = writeln!(html, "<h2>{}</h2>", escape_html(&group.location));
    html.push_str("<table class=\"fish-table\">\n");
    render_header(html, layout);
    for entry in &group.entries {
        render_row(html, entry, layout);
    }
    html.push_str("</table>\n</section>\n");
}

fn render_header(html: &mut String, layout: Layout) {
    html.push_str("<tr><th></th><th>Name</th>");
    match layout {
        Layout::Compact => html.push_str("<th>Size</th>"),
        Layout::Verbose => {
            for weather in WEATHERS {
                let _ = write!(
                    html,
                    "<th><img class=\"weather-icon\" src=\"{}\" alt=\"{weather}\"></th>",
                    weather_icon_path(weather)
                );
            }
        }
    }
    html.push_str("<th>Time</th><th>Chance</th></tr>\n");
}

fn render_row(html: &mut String, entry: &AggregatedEntry, layout: Layout) {
    let _ = write!(
        html,
        "<tr><td><img class=\"fish-icon\" src=\"{}\" alt=\"\"></td><td>{}</td>",
        escape_html(&entry.icon_path()),
        escape_html(&entry.name)
    );
    match layout {
        Layout::Compact => {
            let _ = write!(
                html,
                "<td>{}</td>",
                escape_html(entry.size.as_deref().unwrap_or(""))
            );
        }
        Layout::Verbose => {
            for weather in WEATHERS {
                if entry.available_in(weather) {
                    let _ = write!(
                        html,
                        "<td><img class=\"weather-icon\" src=\"{}\" alt=\"{weather}\"></td>",
                        weather_icon_path(weather)
                    );
                } else {
                    html.push_str("<td></td>");
                }
            }
        }
    }
    let _ = writeln!(
        html,
        "<td>{}</td><td>{}</td></tr>",
        escape_html(&entry.time),
        entry.share_label()
    );
}
