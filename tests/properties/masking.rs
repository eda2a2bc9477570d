//! URL masking properties.

use deposit_monitor::services::endpoints::masked_url;
use proptest::prelude::*;

proptest! {
	/// Segments longer than 8 characters keep at most 4 characters on each
	/// side; everything in between is replaced by the mask.
	#[test]
	fn long_segments_expose_at_most_four_chars_each_side(
		segment in "[a-zA-Z0-9]{9,40}",
	) {
		let masked = masked_url(&format!("https://rpc.example/{}", segment));
		let expected = format!(
			"https://rpc.example/{}***{}",
			&segment[..4],
			&segment[segment.len() - 4..],
		);
		prop_assert_eq!(masked, expected);
	}

	/// Segments of 8 characters or fewer are fully redacted.
	#[test]
	fn short_segments_are_fully_redacted(segment in "[a-zA-Z0-9]{1,8}") {
		let masked = masked_url(&format!("https://rpc.example/{}", segment));
		prop_assert_eq!(masked, "https://rpc.example/***".to_string());
	}

	/// Only the final segment is masked; the rest of the path survives.
	#[test]
	fn leading_path_segments_survive(
		prefix in "[a-z0-9]{2,6}",
		key in "[a-zA-Z0-9]{12,32}",
	) {
		let masked = masked_url(&format!("https://rpc.example/{}/{}", prefix, key));
		prop_assert!(masked.contains(&format!("/{}/", prefix)), "leading path segment should survive masking");
		prop_assert!(!masked.contains(&key));
	}
}
