/// Clean user-supplied text using the ammonia library before it is stored.
///
/// Whitelist-based: safe inline tags survive, `<script>`, `<iframe>` and
/// event-handler attributes are stripped. Plain text passes through
/// unchanged apart from HTML entity escaping of `<`, `>` and `&`.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
