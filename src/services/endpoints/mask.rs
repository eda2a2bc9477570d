//! URL masking for display.
//!
//! Provider URLs commonly carry the API key as the final path segment, so
//! reads through the admin surface always mask it: segments longer than 8
//! characters keep their first and last 4 characters, shorter ones are
//! fully redacted.

use url::Url;

const KEEP_CHARS: usize = 4;
const MASK: &str = "***";

/// Masks the final path segment of an endpoint URL.
///
/// Unparseable inputs fall back to a 20-character prefix followed by the
/// mask, so raw secrets never leak through malformed rows.
pub fn masked_url(raw: &str) -> String {
	let Ok(mut parsed) = Url::parse(raw) else {
		let prefix: String = raw.chars().take(20).collect();
		return format!("{}{}", prefix, MASK);
	};

	let segments: Vec<String> = parsed.path().split('/').map(str::to_string).collect();
	let Some(last_index) = segments.iter().rposition(|s| !s.is_empty()) else {
		return parsed.to_string();
	};

	let mut masked = segments;
	masked[last_index] = mask_segment(&masked[last_index]);
	parsed.set_path(&masked.join("/"));
	parsed.to_string()
}

fn mask_segment(segment: &str) -> String {
	if segment.chars().count() > 2 * KEEP_CHARS {
		let head: String = segment.chars().take(KEEP_CHARS).collect();
		let tail_start = segment.chars().count() - KEEP_CHARS;
		let tail: String = segment.chars().skip(tail_start).collect();
		format!("{}{}{}", head, MASK, tail)
	} else {
		MASK.to_string()
	}
}
