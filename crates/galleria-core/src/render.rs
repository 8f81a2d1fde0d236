//! HTML projection of the gallery grid.

use std::fmt::Write as _;

use crate::model::PhotoRecord;

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Image sources are same-origin paths or generated data URIs; they only
/// need to stay inside their quoted attribute.
fn attr_safe(s: &str) -> String {
    s.replace('"', "&quot;")
}

fn figure(out: &mut String, p: &PhotoRecord) {
    let src = attr_safe(&p.image_source);
    let title = escape_html(&p.title);
    let _ = write!(
        out,
        r#"<figure class="photo" data-src="{src}"><img src="{src}" alt="{title}" loading="lazy" onerror="this.remove()"><figcaption class="meta"><div>{title}"#
    );
    if let Some(date) = p.date.as_deref().filter(|d| !d.is_empty()) {
        let date = escape_html(date);
        let _ = write!(out, r#" · <time datetime="{date}">{date}</time>"#);
    }
    out.push_str("</div>");
    if let Some(desc) = p.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(out, r#"<p class="desc">{}</p>"#, escape_html(desc));
    }
    out.push_str(r#"<div class="tags">"#);
    for t in &p.tags {
        let _ = write!(out, r#"<span class="tag">{}</span>"#, escape_html(t));
    }
    out.push_str("</div></figcaption></figure>\n");
}

/// Render the grid contents. Empty input renders as an empty string.
pub fn project(list: &[PhotoRecord]) -> String {
    let mut out = String::new();
    for p in list {
        figure(&mut out, p);
    }
    out
}

/// `<option>` elements for the tag select, led by an "all" entry.
pub fn project_tag_options(tags: &[String], selected: &str) -> String {
    let mut out = String::from("<option value=\"\">All</option>");
    for t in tags {
        let t_esc = escape_html(t);
        let sel = if t == selected { " selected" } else { "" };
        let _ = write!(out, r#"<option value="{t_esc}"{sel}>{t_esc}</option>"#);
    }
    out
}

/// Percent-encode what could end a CSS `url("...")` or the `<style>`
/// element around it.
fn css_url_safe(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("%22"),
            '\'' => out.push_str("%27"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            '\\' => out.push_str("%5C"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Inline style for the page background and hero image.
pub fn project_theme(background: Option<&str>, hero: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(bg) = background {
        let _ = write!(out, "body{{background-color:{};}}", escape_html(bg));
    }
    if let Some(h) = hero {
        let _ = write!(out, ".hero{{background-image:url(\"{}\");}}", css_url_safe(h));
    }
    out
}
