//! HTML rendering of the digest

use chrono::NaiveDate;

use digest_core::Article;

use crate::ranker::Digest;

const STYLE: &str = "\
body { font-family: Arial; background:#f4f6f8; padding:20px }
.article { background:white; padding:15px; border-radius:8px; margin-bottom:20px }
h2 { border-bottom:3px solid #2c7be5 }
.date { color:#777; font-size:0.85em }
.source { color:#777; font-size:0.85em; margin-left:10px }
img { max-width:100%; border-radius:8px; margin-bottom:10px }
";

/// Render the digest as a standalone HTML document.
///
/// Sections without articles are left out. All feed-supplied text is
/// escaped and non-breaking spaces become plain spaces.
pub fn render_html(digest: &Digest, generated_on: NaiveDate) -> String {
    let today = generated_on.format("%Y-%m-%d");

    let mut html = String::new();
    html.push_str("<html><head><meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>Viktiga Nyheter – {}</title>\n", today));
    html.push_str(&format!("<style>\n{}</style></head><body>\n", STYLE));
    html.push_str(&format!("<h1>DAGENS VIKTIGASTE NYHETER – {}</h1>\n", today));

    for section in &digest.sections {
        if section.articles.is_empty() {
            continue;
        }
        if let Some(heading) = &section.heading {
            html.push_str(&format!("<h2>{}</h2>\n", escape(heading)));
        }
        for article in &section.articles {
            render_article(&mut html, article);
        }
    }

    html.push_str("</body></html>\n");
    html.replace('\u{a0}', " ")
}

fn render_article(html: &mut String, article: &Article) {
    html.push_str(&format!("<div class=\"article\" id=\"a-{}\">\n", escape(&article.id)));
    html.push_str(&format!(
        "<div class=\"date\">{} • vikt {}</div>\n",
        article.published_at.format("%Y-%m-%d"),
        article.score
    ));
    html.push_str(&format!("<h3>{}</h3>\n", escape(&article.title)));
    if let Some(image) = &article.image {
        html.push_str(&format!("<img src=\"{}\">\n", escape(image)));
    }
    html.push_str(&format!("<p>{}</p>\n", escape(&article.description)));
    html.push_str(&format!(
        "<a href=\"{}\">Läs mer</a><span class=\"source\">{}</span>\n",
        escape(&article.link),
        escape(&article.source)
    ));
    html.push_str("</div>\n");
}

/// Escape text for use in element content and quoted attributes
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
