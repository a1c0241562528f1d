//! Deferred heredoc bodies: ordering, indentation, quoting and rollback.

mod common;

use common::{dump, heredoc_texts, heredocs, parse_err, program, with_parser};
use plfront::{HeredocState, ParseErrorKind, QuoteKind};

// -----------------------------------------------------------
// Ordering.
// -----------------------------------------------------------

#[test]
fn two_heredocs_on_one_line_resolve_in_order() {
    let program = program("foo(<<A, <<B);\na1\nA\nb1\nB\n");
    assert_eq!(heredoc_texts(&program), vec!["a1\n", "b1\n"]);
    assert_eq!(
        plfront::format(&program),
        "(call foo (heredoc A \"a1\\n\") (heredoc B \"b1\\n\"))\n"
    );
}

#[test]
fn colliding_labels_still_resolve_in_order() {
    let program = program("foo(<<X, <<X);\none\nX\ntwo\nX\n");
    assert_eq!(heredoc_texts(&program), vec!["one\n", "two\n"]);
}

#[test]
fn statements_sharing_a_line_share_the_drain() {
    let out = dump("print <<A; print <<B;\nfirst\nA\nsecond\nB\nprint 'after';\n");
    assert_eq!(
        out,
        "(print (heredoc A \"first\\n\"))\n\
         (print (heredoc B \"second\\n\"))\n\
         (print \"after\")"
    );
}

#[test]
fn code_resumes_after_the_last_terminator() {
    let out = dump("my $x = <<END . 'tail';\nbody\nEND\n$x++;\n");
    assert_eq!(
        out,
        "(= (my $x) (. (heredoc END \"body\\n\") \"tail\"))\n(post++ $x)"
    );
}

#[test]
fn heredoc_inside_a_block_drains_at_its_own_line() {
    let out = dump("if ($ok) {\n    print <<EOT;\nyes\nEOT\n}\n");
    assert_eq!(out, "(if $ok (block (print (heredoc EOT \"yes\\n\"))))");
}

// -----------------------------------------------------------
// Indentation stripping.
// -----------------------------------------------------------

#[test]
fn indented_terminator_sets_the_prefix() {
    let out = dump("print <<~END;\n    line1\n    END\n");
    assert_eq!(out, "(print (heredoc END \"line1\\n\"))");
}

#[test]
fn deeper_lines_keep_their_extra_indentation() {
    let program = program("print <<~END;\n  a\n    b\n\n  END\n");
    assert_eq!(heredoc_texts(&program), vec!["a\n  b\n\n"]);
}

#[test]
fn shallow_body_line_is_an_indentation_mismatch() {
    let err = parse_err("print <<~END;\n  a\n    END\n");
    assert_eq!(
        err.kind,
        ParseErrorKind::IndentationMismatch {
            label: "END".into()
        }
    );
}

// -----------------------------------------------------------
// Quoting.
// -----------------------------------------------------------

#[test]
fn raw_body_is_kept_verbatim() {
    let source = "print <<'EOT';\n  $x @y \\n # not a comment\n\tTab\n=pod\nEOT\n";
    let program = program(source);
    assert_eq!(
        heredoc_texts(&program),
        vec!["  $x @y \\n # not a comment\n\tTab\n=pod\n"]
    );
    assert_eq!(heredocs(&program)[0].borrow().quote, QuoteKind::Raw);
}

#[test]
fn backslashed_label_is_raw() {
    let program = program("print <<\\EOT;\n$x\nEOT\n");
    assert_eq!(heredoc_texts(&program), vec!["$x\n"]);
}

#[test]
fn interpolated_body_splits_out_variables() {
    let out = dump("my $name = 'x';\nprint <<EOT;\nHello, $name!\nEOT\n");
    assert_eq!(
        out,
        "(= (my $name) \"x\")\n\
         (print (heredoc EOT (interp \"Hello, \" $name \"!\\n\")))"
    );
}

#[test]
fn command_heredoc_wraps_interpolated_text() {
    let out = dump("my $out = <<`CMD`;\nls $dir\nCMD\n");
    assert_eq!(
        out,
        "(= (my $out) (heredoc CMD (command (interp \"ls \" $dir \"\\n\"))))"
    );
}

#[test]
fn empty_quoted_label_ends_at_blank_line() {
    let program = program("print <<\"\";\nline\n\nrest;\n");
    assert_eq!(heredoc_texts(&program), vec!["line\n"]);
    assert_eq!(program.statements.len(), 2);
}

#[test]
fn quoted_label_may_contain_spaces() {
    let program = program("print << \"END OF TEXT\";\nbody\nEND OF TEXT\n");
    assert_eq!(heredoc_texts(&program), vec!["body\n"]);
}

#[test]
fn bare_operator_with_space_is_rejected() {
    let err = parse_err("print << EOT;\nbody\nEOT\n");
    assert!(err.is_syntax());
    assert!(err.to_string().contains("bare <<"));
}

#[test]
fn crlf_bodies_are_normalized() {
    let program = program("print <<EOT;\r\nline one\r\nline two\r\nEOT\r\n");
    assert_eq!(heredoc_texts(&program), vec!["line one\nline two\n"]);
}

// -----------------------------------------------------------
// Errors and idempotence.
// -----------------------------------------------------------

#[test]
fn missing_terminator_fails_the_placeholder_without_content() {
    with_parser("print <<END;\nbody\n", |parser, result| {
        let err = result.unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnterminatedHeredoc {
                label: "END".into()
            }
        );
        assert_eq!(
            err.to_string(),
            "cannot find string terminator \"END\" anywhere before EOF at line 1, column 7"
        );

        let doc = parser.heredocs().get(0).expect("registered");
        let doc = doc.borrow();
        assert_eq!(doc.state, HeredocState::Failed);
        assert_eq!(doc.content, None);
    });
}

#[test]
fn bad_interpolation_in_body_fails_the_placeholder() {
    with_parser("print <<EOT;\n@{[ 1 + ]}\nEOT\n", |parser, result| {
        assert!(result.unwrap_err().is_syntax());
        let doc = parser.heredocs().get(0).expect("registered");
        let doc = doc.borrow();
        assert_eq!(doc.state, HeredocState::Failed);
        assert_eq!(doc.content, None);
    });
}

#[test]
fn heredoc_on_last_line_without_newline_is_unterminated() {
    let err = parse_err("print <<END;");
    assert!(matches!(
        err.kind,
        ParseErrorKind::UnterminatedHeredoc { ref label } if label == "END"
    ));
}

#[test]
fn resolving_again_is_a_no_op() {
    with_parser("print <<'E';\nx\nE\n", |parser, result| {
        let program = result.unwrap();
        assert!(!parser.heredocs().has_pending());

        parser.resolve_all_pending().unwrap();
        assert_eq!(parser.heredocs().len(), 1);
        assert_eq!(heredoc_texts(&program), vec!["x\n"]);
        assert!(heredocs(&program)[0].borrow().is_resolved());
    });
}

// -----------------------------------------------------------
// Heredocs announced inside interpolation.
// -----------------------------------------------------------

#[test]
fn heredoc_inside_interpolated_body_joins_the_queue() {
    let source = "print <<\"OUTER\";\nbefore @{[ <<INNER ]} after\nOUTER\ninner body\nINNER\n";
    let program = program(source);
    assert_eq!(
        plfront::format(&program),
        "(print (heredoc OUTER (interp \"before \" \
         (deref @ (array (heredoc INNER \"inner body\\n\"))) \" after\\n\")))\n"
    );
    assert_eq!(program.heredoc_count(), 2);
}

#[test]
fn heredoc_inside_interpolated_string_literal() {
    let out = dump("print \"a ${\\ <<E} b\";\nbody\nE\n");
    assert_eq!(
        out,
        "(print (interp \"a \" (deref $ (\\ (heredoc E \"body\\n\"))) \" b\"))"
    );
}

// -----------------------------------------------------------
// Speculative parses.
// -----------------------------------------------------------

#[test]
fn abandoned_trial_drops_its_registration() {
    with_parser("print ${\\ <<E};\nbody\nE\n", |parser, result| {
        let program = result.unwrap();
        assert_eq!(parser.heredocs().len(), 1);
        assert_eq!(
            plfront::format(&program),
            "(print (deref $ (\\ (heredoc E \"body\\n\"))))\n"
        );
    });
}

#[test]
fn bodies_read_during_a_trial_are_not_read_twice() {
    // The handle trial on `${ ... }` crosses the newline and drains E; the
    // committed parse crosses it again and must skip the body.
    let source = "foo(<<E, print ${ \\ \"x\"\nbody\nE\n});";
    with_parser(source, |parser, result| {
        let program = result.unwrap();
        assert_eq!(parser.heredocs().len(), 1);
        assert_eq!(
            plfront::format(&program),
            "(call foo (heredoc E \"body\\n\") (print (deref $ (\\ \"x\"))))\n"
        );
    });
}

#[test]
fn unterminated_body_met_during_a_trial_is_fatal() {
    // The handle trial on `${ ... }` is the first to cross the newline.
    let source = "foo(<<E, print ${ \\ \"x\"\n});\n";
    with_parser(source, |parser, result| {
        let err = result.unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnterminatedHeredoc { label: "E".into() }
        );
        let doc = parser.heredocs().get(0).expect("registered");
        assert_eq!(doc.borrow().state, HeredocState::Failed);
    });
}
