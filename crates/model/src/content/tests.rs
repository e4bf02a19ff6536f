use super::*;

fn exact(term: &str, child: &str) -> bool {
	term == child || (term == "block" && matches!(child, "paragraph" | "heading")) || (term == "inline" && child == "text")
}

#[test]
fn test_parse_simple() {
	assert_eq!(ContentExpr::parse("block+").unwrap(), ContentExpr::Plus(Box::new(ContentExpr::Name("block".into()))));
	assert_eq!(ContentExpr::parse("").unwrap(), ContentExpr::Seq(Vec::new()));
	assert_eq!(ContentExpr::parse("   ").unwrap(), ContentExpr::Seq(Vec::new()));
}

#[test]
fn test_parse_nested() {
	let expr = ContentExpr::parse("(paragraph | heading) block*").unwrap();
	assert_eq!(
		expr,
		ContentExpr::Seq(vec![
			ContentExpr::Choice(vec![
				ContentExpr::Name("paragraph".into()),
				ContentExpr::Name("heading".into()),
			]),
			ContentExpr::Star(Box::new(ContentExpr::Name("block".into()))),
		])
	);
	assert_eq!(expr.names(), vec!["paragraph", "heading", "block"]);
}

#[test]
fn test_parse_errors() {
	let err = ContentExpr::parse("block+ )").unwrap_err();
	assert_eq!(err.position, 7);

	let err = ContentExpr::parse("(paragraph").unwrap_err();
	assert_eq!(err.message, "expected ')'");

	assert!(ContentExpr::parse("a | | b").is_err());
	assert!(ContentExpr::parse("*").is_err());
}

#[test]
fn test_matches() {
	let expr = ContentExpr::parse("block+").unwrap();
	assert!(expr.matches(&["paragraph"], &exact));
	assert!(expr.matches(&["paragraph", "heading", "paragraph"], &exact));
	assert!(!expr.matches::<&str>(&[], &exact));
	assert!(!expr.matches(&["text"], &exact));

	let inline = ContentExpr::parse("inline*").unwrap();
	assert!(inline.accepts_empty());
	assert!(inline.matches(&["text", "text"], &exact));
}

#[test]
fn test_matches_sequence_and_option() {
	let expr = ContentExpr::parse("heading paragraph? block*").unwrap();
	assert!(expr.matches(&["heading"], &exact));
	assert!(expr.matches(&["heading", "paragraph"], &exact));
	assert!(expr.matches(&["heading", "paragraph", "heading"], &exact));
	assert!(!expr.matches(&["paragraph"], &exact));
}

#[test]
fn test_fill() {
	let resolve = |term: &str| match term {
		"block" | "paragraph" => Some("paragraph".to_string()),
		_ => None,
	};
	assert_eq!(ContentExpr::parse("block+").unwrap().fill(&resolve), Some(vec!["paragraph".to_string()]));
	assert_eq!(ContentExpr::parse("inline*").unwrap().fill(&resolve), Some(Vec::new()));
	assert_eq!(
		ContentExpr::parse("(image | paragraph) paragraph").unwrap().fill(&resolve),
		Some(vec!["paragraph".to_string(), "paragraph".to_string()])
	);
	assert_eq!(ContentExpr::parse("image").unwrap().fill(&resolve), None);
}
