/// Self-contained HTML page rendering: the bundled viewer template with the
/// archive bytes embedded base64-encoded.
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const TEMPLATE: &str = include_str!("../assets/template.html");

/// Fill the viewer template with a page title and the archive contents.
pub fn render_page(title: &str, archive: &[u8]) -> String {
    TEMPLATE
        .replace("{{TITLE}}", title)
        .replace("{{ARCHIVE_BASE64}}", &STANDARD.encode(archive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_embeds_title_and_encoded_archive() {
        let page = render_page("daylight", b"PK\x03\x04");
        assert!(page.contains("<title>daylight</title>"));
        assert!(page.contains(&STANDARD.encode(b"PK\x03\x04")));
        assert!(!page.contains("{{TITLE}}"));
        assert!(!page.contains("{{ARCHIVE_BASE64}}"));
    }
}
