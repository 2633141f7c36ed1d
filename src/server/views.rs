//! HTML fragments rendered server-side. The full chat page lives in
//! `assets/`; only the bot-message placeholder is built per request.

/// Placeholder bot message. The chat controller reads the data attributes
/// back to open the story stream for this turn.
pub fn bot_message(query: &str, top_k: u64) -> String {
    format!(
        r#"<div class="message bot" data-query="{}" data-top-k="{}">
  <div class="movie-card" hidden></div>
  <div class="story"></div>
</div>"#,
        escape_html(query),
        top_k
    )
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"cool" & 'fast'</b>"#),
            "&lt;b&gt;&quot;cool&quot; &amp; &#39;fast&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn fragment_carries_the_turn_parameters() {
        let html = bot_message("a <script> movie", 3);

        assert!(html.contains(r#"data-query="a &lt;script&gt; movie""#));
        assert!(html.contains(r#"data-top-k="3""#));
        assert!(html.contains(r#"class="message bot""#));
        assert!(!html.contains("<script>"));
    }
}
