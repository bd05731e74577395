use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Renders review contents to HTML for the preview pane. Raw HTML in the
/// source is emitted as escaped text, and link or image destinations with
/// a scheme other than http, https or mailto are blanked.
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_destination(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_destination(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn safe_destination(dest: CowStr<'_>) -> CowStr<'_> {
    // Browsers drop whitespace and control characters while reading a scheme.
    let compact: String = dest
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    let scheme = match compact.find([':', '/', '?', '#']) {
        Some(i) if compact[i..].starts_with(':') => &compact[..i],
        _ => return dest,
    };

    if SAFE_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) {
        dest
    } else {
        CowStr::Borrowed("")
    }
}
