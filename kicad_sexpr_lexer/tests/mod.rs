use kicad_sexpr_lexer::*;

/// Lexes the input and compares kinds and byte ranges. Positions are checked
/// separately in the tests that care about them.
#[track_caller]
fn assert_lexed(input: &str, expected: &[(TokenKind, usize, usize)]) {
    let lexer = Lexer::new(input);

    let tokens = lexer
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| panic!("Failed to lex input: {e}"));

    let tokens = tokens
        .into_iter()
        .map(|t| (t.kind, t.span.start, t.span.end))
        .collect::<Vec<_>>();

    assert_eq!(tokens, expected);
}

#[track_caller]
fn assert_error(input: &str, expected: Error) {
    let lexer = Lexer::new(input);

    let error = lexer
        .collect::<Result<Vec<_>, _>>()
        .expect_err("expected lexer to return an error");

    assert_eq!(error, expected);
}

#[test]
fn test_lex_empty_list() {
    assert_lexed(
        "(test)",
        &[
            (TokenKind::OpenParen, 0, 1),
            (TokenKind::Symbol("test"), 1, 5),
            (TokenKind::CloseParen, 5, 6),
        ],
    );
}

#[test]
fn test_lex_empty_list_with_whitespace() {
    assert_lexed(
        "(  test  )",
        &[
            (TokenKind::OpenParen, 0, 1),
            (TokenKind::Symbol("test"), 3, 7),
            (TokenKind::CloseParen, 9, 10),
        ],
    );
}

#[test]
fn test_numbers_are_symbols() {
    assert_lexed("123", &[(TokenKind::Symbol("123"), 0, 3)]);
    assert_lexed("-123.456", &[(TokenKind::Symbol("-123.456"), 0, 8)]);
}

#[test]
fn test_lex_string() {
    assert_lexed(
        r#""Hello, world!""#,
        &[(TokenKind::String("Hello, world!"), 0, 15)],
    );
    assert_lexed(
        r#""Hello, \"world\"!""#,
        &[(TokenKind::String(r#"Hello, \"world\"!"#), 0, 19)],
    );
}

#[test]
fn test_lex_string_ending_in_escaped_backslash() {
    assert_lexed(
        r#"(a "x\\" b)"#,
        &[
            (TokenKind::OpenParen, 0, 1),
            (TokenKind::Symbol("a"), 1, 2),
            (TokenKind::String(r"x\\"), 3, 8),
            (TokenKind::Symbol("b"), 9, 10),
            (TokenKind::CloseParen, 10, 11),
        ],
    );
}

#[test]
fn test_lex_empty_string() {
    assert_lexed(r#""""#, &[(TokenKind::String(""), 0, 2)]);
}

#[test]
fn test_lex_symbol_with_punctuation() {
    assert_lexed(
        "(net 3 /VCC) #PWR01 F.Cu",
        &[
            (TokenKind::OpenParen, 0, 1),
            (TokenKind::Symbol("net"), 1, 4),
            (TokenKind::Symbol("3"), 5, 6),
            (TokenKind::Symbol("/VCC"), 7, 11),
            (TokenKind::CloseParen, 11, 12),
            (TokenKind::Symbol("#PWR01"), 13, 19),
            (TokenKind::Symbol("F.Cu"), 20, 24),
        ],
    );
}

#[test]
fn test_lex_unicode_uses_byte_offsets() {
    assert_lexed(
        "(sexpr ü)",
        &[
            (TokenKind::OpenParen, 0, 1),
            (TokenKind::Symbol("sexpr"), 1, 6),
            (TokenKind::Symbol("ü"), 7, 9),
            (TokenKind::CloseParen, 9, 10),
        ],
    );
}

#[test]
fn test_lex_nested_lists() {
    assert_lexed(
        "(test (nested_one) (nested_two (nested_three)))",
        &[
            (TokenKind::OpenParen, 0, 1),
            (TokenKind::Symbol("test"), 1, 5),
            (TokenKind::OpenParen, 6, 7),
            (TokenKind::Symbol("nested_one"), 7, 17),
            (TokenKind::CloseParen, 17, 18),
            (TokenKind::OpenParen, 19, 20),
            (TokenKind::Symbol("nested_two"), 20, 30),
            (TokenKind::OpenParen, 31, 32),
            (TokenKind::Symbol("nested_three"), 32, 44),
            (TokenKind::CloseParen, 44, 45),
            (TokenKind::CloseParen, 45, 46),
            (TokenKind::CloseParen, 46, 47),
        ],
    );
}

#[test]
fn test_positions_track_lines_and_columns() {
    let tokens = Lexer::new("(pad\n  (at 1 2))")
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let positions = tokens
        .iter()
        .map(|t| t.span.position)
        .collect::<Vec<_>>();

    assert_eq!(
        positions,
        vec![
            Position::new(1, 1),
            Position::new(1, 2),
            Position::new(2, 3),
            Position::new(2, 4),
            Position::new(2, 7),
            Position::new(2, 9),
            Position::new(2, 10),
            Position::new(2, 11),
        ]
    );
}

#[test]
fn test_current_position_follows_the_lexer() {
    let mut lexer = Lexer::new("(pad\n  \"a b\")");
    assert_eq!(lexer.current_position(), Position::new(1, 1));

    lexer.next().unwrap().unwrap();
    assert_eq!(lexer.current_position(), Position::new(1, 2));

    lexer.next().unwrap().unwrap();
    assert_eq!(lexer.current_position(), Position::new(1, 5));

    let string = lexer.next().unwrap().unwrap();
    assert_eq!(string.span.position, Position::new(2, 3));
    assert_eq!(lexer.current_position(), Position::new(2, 8));
}

#[test]
fn test_lex_unterminated_string() {
    assert_error(
        r#"(uuid "2349f563-989d-4999-a369-9f24d984ce74)"#,
        Error {
            kind: ErrorKind::UnterminatedString,
            position: Position::new(1, 7),
        },
    );
}

#[test]
fn test_lex_multiline_string() {
    assert_lexed(
        "\"first line\nsecond line\"",
        &[(TokenKind::String("first line\nsecond line"), 0, 24)],
    );
}

#[test]
fn test_expect_open_paren() {
    let mut lexer = Lexer::new("  (a)");
    let token = lexer.expect_open_paren().unwrap();
    assert_eq!(token.span.position, Position::new(1, 3));

    let mut lexer = Lexer::new("a");
    let error = lexer.expect_open_paren().unwrap_err();
    assert_eq!(error.kind, ErrorKind::ExpectedOpenParen);
    assert_eq!(error.position, Position::new(1, 1));
}

#[test]
fn test_token_kind_helpers() {
    assert_eq!(TokenKind::Symbol("abc").as_symbol(), Some("abc"));
    assert_eq!(TokenKind::String("abc").as_symbol(), None);
    assert_eq!(TokenKind::String("abc").expect_string(), "abc");
    assert!(TokenKind::OpenParen.is_paren());
}
