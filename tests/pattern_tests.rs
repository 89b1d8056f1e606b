use routex::{parse_path, BadRoute, Token};

fn literal(text: &str) -> Token {
    Token::literal(text)
}

fn placeholder(name: &str, regex: &str) -> Token {
    Token::placeholder(name, regex)
}

fn assert_parses(pattern: &str, expected: Vec<Vec<Token>>) {
    let variants = parse_path(pattern).expect("pattern should parse");
    assert_eq!(variants, expected, "unexpected variants for {pattern:?}");
}

fn assert_parse_error(pattern: &str, expected_message: &str) {
    let err = parse_path(pattern).expect_err("pattern should be rejected");
    assert_eq!(err.to_string(), expected_message, "for pattern {pattern:?}");
}

#[test]
fn test_plain_static_pattern() {
    assert_parses("/test", vec![vec![literal("/test")]]);
}

#[test]
fn test_single_placeholder() {
    assert_parses(
        "/test/{param}",
        vec![vec![literal("/test/"), placeholder("param", "[^/]+")]],
    );
}

#[test]
fn test_placeholder_inside_a_segment() {
    assert_parses(
        "/te{ param }st",
        vec![vec![
            literal("/te"),
            placeholder("param", "[^/]+"),
            literal("st"),
        ]],
    );
}

#[test]
fn test_two_placeholders() {
    assert_parses(
        "/test/{param1}/test2/{param2}",
        vec![vec![
            literal("/test/"),
            placeholder("param1", "[^/]+"),
            literal("/test2/"),
            placeholder("param2", "[^/]+"),
        ]],
    );
}

#[test]
fn test_placeholder_with_custom_regex() {
    assert_parses(
        "/test/{param:\\d+}",
        vec![vec![literal("/test/"), placeholder("param", "\\d+")]],
    );
}

#[test]
fn test_placeholder_with_whitespace_and_repetition() {
    assert_parses(
        "/test/{ param : \\d{1,9} }",
        vec![vec![literal("/test/"), placeholder("param", "\\d{1,9}")]],
    );
}

#[test]
fn test_literal_optional_segment() {
    assert_parses(
        "/test[opt]",
        vec![vec![literal("/test")], vec![literal("/testopt")]],
    );
}

#[test]
fn test_optional_placeholder_segment() {
    assert_parses(
        "/test[/{param}]",
        vec![
            vec![literal("/test")],
            vec![literal("/test/"), placeholder("param", "[^/]+")],
        ],
    );
}

#[test]
fn test_optional_literal_after_placeholder() {
    assert_parses(
        "/{param}[opt]",
        vec![
            vec![literal("/"), placeholder("param", "[^/]+")],
            vec![literal("/"), placeholder("param", "[^/]+"), literal("opt")],
        ],
    );
}

#[test]
fn test_nested_optional_segments() {
    assert_parses(
        "/test[/{name}[/{id:[0-9]+}]]",
        vec![
            vec![literal("/test")],
            vec![literal("/test/"), placeholder("name", "[^/]+")],
            vec![
                literal("/test/"),
                placeholder("name", "[^/]+"),
                literal("/"),
                placeholder("id", "[0-9]+"),
            ],
        ],
    );
}

#[test]
fn test_empty_pattern() {
    assert_parses("", vec![vec![literal("")]]);
}

#[test]
fn test_fully_optional_pattern() {
    assert_parses("[test]", vec![vec![literal("")], vec![literal("test")]]);
}

#[test]
fn test_placeholder_name_with_dash() {
    assert_parses(
        "/{foo-bar}",
        vec![vec![literal("/"), placeholder("foo-bar", "[^/]+")]],
    );
}

#[test]
fn test_placeholder_name_with_leading_underscore() {
    assert_parses(
        "/{_foo:.*}",
        vec![vec![literal("/"), placeholder("_foo", ".*")]],
    );
}

#[test]
fn test_unclosed_optional_bracket() {
    assert_parse_error(
        "/test[opt",
        "number of opening '[' and closing ']' brackets do not match",
    );
}

#[test]
fn test_two_opening_brackets_one_closing() {
    assert_parse_error(
        "/test[opt[opt2]",
        "number of opening '[' and closing ']' brackets do not match",
    );
}

#[test]
fn test_closing_bracket_without_opening() {
    assert_parse_error(
        "/testopt]",
        "number of opening '[' and closing ']' brackets do not match",
    );
}

#[test]
fn test_empty_optional_segment() {
    assert_parse_error("/test[]", "optional segments cannot be empty");
}

#[test]
fn test_empty_outer_optional_segment() {
    assert_parse_error("/test[[opt]]", "optional segments cannot be empty");
}

#[test]
fn test_empty_outer_optional_with_no_prefix() {
    assert_parse_error("[[test]]", "optional segments cannot be empty");
}

#[test]
fn test_optional_segment_in_the_middle() {
    assert_parse_error(
        "/test[/opt]/required",
        "optional segments can only occur at the end of a route",
    );
}

#[test]
fn test_error_values_are_comparable() {
    assert_eq!(
        parse_path("/test[]"),
        Err(BadRoute::EmptyOptionalSegment),
    );
}
