//! Query-centered excerpts of chunk bodies.
//!
//! Positions and lengths are counted in chars, so a snippet never splits a
//! multi-byte character.

const ELLIPSIS: &str = "...";

/// Excerpt of at most `max_len` chars of `content` centered on the leftmost
/// case-insensitive occurrence of any of `terms`.
///
/// Falls back to the head of `content` when no term occurs literally (the
/// hit came from a prefix or fuzzy match). `...` marks each truncated side.
pub fn make_snippet<S: AsRef<str>>(content: &str, terms: &[S], max_len: usize) -> String {
	if content.is_empty() {
		return String::new();
	}
	let chars: Vec<char> = content.chars().collect();
	let folded: Vec<char> = chars.iter().copied().map(fold).collect();

	let first_hit = terms
		.iter()
		.map(AsRef::as_ref)
		.filter(|term| !term.is_empty())
		.filter_map(|term| {
			let needle: Vec<char> = term.chars().map(fold).collect();
			find(&folded, &needle)
		})
		.min();
	let Some(idx) = first_hit else {
		return head_snippet(content, max_len);
	};

	let start = idx.saturating_sub(max_len / 2);
	let end = (start + max_len).min(chars.len());
	let mut snippet = String::with_capacity(max_len + 2 * ELLIPSIS.len());
	if start > 0 {
		snippet.push_str(ELLIPSIS);
	}
	snippet.extend(&chars[start..end]);
	if end < chars.len() {
		snippet.push_str(ELLIPSIS);
	}
	snippet
}

/// The first `max_len` chars of `content`, with `...` appended when cut.
pub fn head_snippet(content: &str, max_len: usize) -> String {
	match content.char_indices().nth(max_len) {
		Some((cut, _)) => format!("{}{ELLIPSIS}", &content[..cut]),
		None => content.to_string(),
	}
}

fn fold(c: char) -> char {
	c.to_lowercase().next().unwrap_or(c)
}

fn find(haystack: &[char], needle: &[char]) -> Option<usize> {
	if needle.is_empty() || needle.len() > haystack.len() {
		return None;
	}
	haystack.windows(needle.len()).position(|window| window == needle)
}
