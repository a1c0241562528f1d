//! Statement and expression grammar, checked through the S-expression
//! formatter.

mod common;

use common::{dump, parse_err, program};
use plfront::{HandleTable, Node, ParseErrorKind, parse, tokenize};

// -----------------------------------------------------------
// Operators.
// -----------------------------------------------------------

#[test]
fn arithmetic_precedence() {
    assert_eq!(dump("my $x = 1 + 2 * 3;"), "(= (my $x) (+ 1 (* 2 3)))");
    assert_eq!(dump("(1 + 2) * 3;"), "(* (list (+ 1 2)) 3)");
    assert_eq!(dump("1 - 2 - 3;"), "(- (- 1 2) 3)");
}

#[test]
fn logical_precedence() {
    assert_eq!(dump("$x = $a || $b && $c;"), "(= $x (|| $a (&& $b $c)))");
    assert_eq!(dump("$a and $b or $c;"), "(or (and $a $b) $c)");
    assert_eq!(dump("not $x;"), "(not $x)");
    assert_eq!(dump("!$x == 1;"), "(== (! $x) 1)");
}

#[test]
fn power_is_right_associative() {
    assert_eq!(dump("2 ** 3 ** 2;"), "(** 2 (** 3 2))");
    assert_eq!(dump("-2 ** 2;"), "(- (** 2 2))");
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(dump("$a = $b = 1;"), "(= $a (= $b 1))");
    assert_eq!(dump("$s .= 'x';"), "(.= $s \"x\")");
    assert_eq!(dump("$n ||= 5;"), "(||= $n 5)");
}

#[test]
fn ternary_and_string_operators() {
    assert_eq!(dump("$x ? 1 : 0;"), "(?: $x 1 0)");
    assert_eq!(dump("'a' . 'b' x 3;"), "(. \"a\" (x \"b\" 3))");
    assert_eq!(dump("$a eq $b;"), "(eq $a $b)");
    assert_eq!(dump("$s =~ $re;"), "(=~ $s $re)");
    assert_eq!(dump("1 .. 10;"), "(.. 1 10)");
}

#[test]
fn named_unary_binds_tighter_than_comparison() {
    assert_eq!(dump("defined $x && $y;"), "(&& (call defined $x) $y)");
    assert_eq!(dump("length $s > 3;"), "(> (call length $s) 3)");
    assert_eq!(dump("lc($s) eq 'x';"), "(eq (call lc $s) \"x\")");
}

#[test]
fn increment_operators() {
    assert_eq!(dump("$i++;"), "(post++ $i)");
    assert_eq!(dump("--$i;"), "(-- $i)");
}

// -----------------------------------------------------------
// Terms.
// -----------------------------------------------------------

#[test]
fn numbers() {
    assert_eq!(dump("1.5 + .5;"), "(+ 1.5 .5)");
    assert_eq!(dump("1_000;"), "1_000");
}

#[test]
fn quote_operators() {
    assert_eq!(dump("my @w = qw(a b c);"), "(= (my @w) (qw \"a\" \"b\" \"c\"))");
    assert_eq!(dump("q{it's};"), "\"it's\"");
    assert_eq!(dump("qq<$x>;"), "(interp $x)");
    assert_eq!(dump("my %h = (q => 1);"), "(= (my %h) (list \"q\" 1))");
}

#[test]
fn single_quotes_only_unescape_backslash_and_quote() {
    assert_eq!(dump(r"'it\'s \n';"), r#""it's \\n""#);
}

#[test]
fn double_quote_interpolation() {
    assert_eq!(
        dump(r#""a $x[1] $h{k} $r->{z} @arr ${\ 'lit'}\n";"#),
        r#"(interp "a " (elem @x 1) " " (helem %h "k") " " (helem $r "z") " " @arr " " (deref $ (\ "lit")) "\n")"#
    );
    assert_eq!(dump(r#""cost: \$5\t";"#), r#""cost: $5\t""#);
    assert_eq!(dump(r#""${name}s";"#), r#"(interp $name "s")"#);
}

#[test]
fn variables() {
    assert_eq!(dump("$#list;"), "$#list");
    assert_eq!(dump("$$ref;"), "(deref $ $ref)");
    assert_eq!(dump("@{$aref};"), "(deref @ $aref)");
    assert_eq!(dump("$Foo::bar;"), "$Foo::bar");
    assert_eq!(dump("$::x;"), "$main::x");
    assert_eq!(dump("@_;"), "@_");
}

#[test]
fn punctuation_variables() {
    assert_eq!(dump("$|=1;"), "(= $| 1)");
    assert_eq!(dump("$^W = 1;"), "(= $^W 1)");
    assert_eq!(dump("$@;"), "$@");
    assert_eq!(dump("$0;"), "$0");
}

#[test]
fn subscripts_and_arrows() {
    assert_eq!(
        dump("$h{a}{b}[0];"),
        "(elem (helem (helem %h \"a\") \"b\") 0)"
    );
    assert_eq!(dump("$ref->{name}->[1];"), "(elem (helem $ref \"name\") 1)");
    assert_eq!(dump("$opt{-verbose};"), "(helem %opt \"-verbose\")");
    assert_eq!(dump("$h{$k . 'x'};"), "(helem %h (. $k \"x\"))");
}

#[test]
fn calls_and_methods() {
    assert_eq!(
        dump("Foo::Bar->new(x => 1);"),
        "(method Foo::Bar new \"x\" 1)"
    );
    assert_eq!(dump("$obj->run;"), "(method $obj run)");
    assert_eq!(dump("$code->(1);"), "(invoke $code 1)");
    assert_eq!(dump("&$cb(2);"), "(invoke (deref & $cb) 2)");
    assert_eq!(dump("foo(1, 2);"), "(call foo 1 2)");
    assert_eq!(dump("Some::Pkg;"), "Some::Pkg");
}

#[test]
fn anonymous_constructors() {
    assert_eq!(
        dump("my $h = { a => [1, 2], b => sub { 1 } };"),
        "(= (my $h) (hash \"a\" (array 1 2) \"b\" (anon-sub 1)))"
    );
    assert_eq!(dump("do { 1 };"), "(do 1)");
    assert_eq!(dump("my ($a, $b) = @_;"), "(= (my (list $a $b)) @_)");
    assert_eq!(dump("local $_ = shift;"), "(= (local $_) (call shift))");
}

#[test]
fn readline() {
    assert_eq!(
        dump("while (my $line = <STDIN>) { chomp $line; }"),
        "(while (= (my $line) (readline STDIN)) (block (call chomp $line)))"
    );
    assert_eq!(dump("my @all = <$fh>;"), "(= (my @all) (readline $fh))");
}

#[test]
fn list_operators_with_conditions() {
    assert_eq!(
        dump("open(my $fh, '<', $path) or die \"no: $!\";"),
        "(or (call open (my $fh) \"<\" $path) (call die \"no: $!\"))"
    );
    assert_eq!(
        dump("printf(\"%d\\n\", 1);"),
        "(printf \"%d\\n\" 1)"
    );
}

// -----------------------------------------------------------
// Statements.
// -----------------------------------------------------------

#[test]
fn if_elsif_else() {
    assert_eq!(
        dump("if ($x == 1) { print \"one\"; } elsif ($x) { 1; } else { 0; }"),
        "(if (== $x 1) (block (print \"one\")) (elsif $x (block 1)) (else (block 0)))"
    );
    assert_eq!(
        dump("unless ($ok) { die; }"),
        "(unless $ok (block (call die)))"
    );
}

#[test]
fn loops() {
    assert_eq!(
        dump("foreach my $item (@list) { print $item; }"),
        "(foreach (my $item) (list @list) (block (print $item)))"
    );
    assert_eq!(dump("for (1, 2) { }"), "(foreach (list 1 2) (block))");
    assert_eq!(
        dump("until ($done) { $done = 1 }"),
        "(until $done (block (= $done 1)))"
    );
}

#[test]
fn statement_modifiers() {
    assert_eq!(dump("print \"x\" if $debug;"), "((print \"x\") if $debug)");
    assert_eq!(dump("$i++ while $i < 10;"), "((post++ $i) while (< $i 10))");
    assert_eq!(dump("warn $_ for @errors;"), "((call warn $_) for @errors)");
}

#[test]
fn subroutines_and_return() {
    assert_eq!(dump("sub f { return; }"), "(sub f (block (return)))");
    assert_eq!(
        dump("sub g { return 1, 2; }"),
        "(sub g (block (return (list 1 2))))"
    );
    assert_eq!(dump("sub h;"), "(sub h)");
    assert_eq!(
        dump("sub h;\nh 1, 2;"),
        "(sub h)\n(call h 1 2)"
    );
}

#[test]
fn packages() {
    assert_eq!(
        dump("package Foo::Bar;\nprint __PACKAGE__;"),
        "(package Foo::Bar)\n(print \"Foo::Bar\")"
    );
    assert_eq!(
        dump("package Inner { print __PACKAGE__; }\nprint __PACKAGE__;"),
        "(block (package Inner) (print \"Inner\"))\n(print \"main\")"
    );
}

#[test]
fn line_token() {
    assert_eq!(dump("1;\n\nprint __LINE__;"), "1\n(print 3)");
}

#[test]
fn empty_statements_and_blocks() {
    assert_eq!(dump(";;"), "");
    assert_eq!(dump("{ 1; { 2 } }"), "(block 1 (block 2))");
    assert!(program("").statements.is_empty());
}

#[test]
fn comments_docs_and_end_marker() {
    let source = "=pod\n\nstuff\n\n=cut\n# comment\nprint 1; # trailing\n__END__\nprint 2;\n";
    assert_eq!(dump(source), "(print 1)");
}

#[test]
fn end_markers_only_end_the_script_at_line_start() {
    assert_eq!(
        dump("my $v = $h{__END__};\nprint $v;\n"),
        "(= (my $v) (helem %h \"__END__\"))\n(print $v)"
    );
    assert_eq!(dump("print 1;\n  __DATA__\nnot ( code\n"), "(print 1)");
    assert_eq!(dump("print 1;\n=begin note\n\nskip\n=end note\nprint 2;\n"), "(print 1)\n(print 2)");
}

#[test]
fn parse_with_an_explicit_registry() {
    let table = HandleTable::new().with_handle("OUT", "main");
    let program = parse(tokenize("print OUT 1;"), &table).unwrap();
    assert!(matches!(
        &program.statements[0],
        Node::Print { handle: Some(handle), .. } if **handle == Node::HandleRef("main::OUT".into())
    ));
}

// -----------------------------------------------------------
// Errors.
// -----------------------------------------------------------

#[test]
fn missing_term() {
    let err = parse_err("my $x = ;");
    assert_eq!(
        err.kind,
        ParseErrorKind::UnexpectedToken {
            expected: "a term".into(),
            found: ";".into()
        }
    );
}

#[test]
fn unclosed_block() {
    let err = parse_err("if ($x) { print 1;");
    assert_eq!(
        err.kind,
        ParseErrorKind::UnexpectedEof {
            expected: "'}'".into()
        }
    );
}

#[test]
fn two_terms_in_a_row() {
    let err = parse_err("foo bar;");
    assert_eq!(
        err.to_string(),
        "syntax error: expected ';', got 'bar' at line 1, column 5"
    );
}

#[test]
fn unterminated_string() {
    let err = parse_err("$x = \"open;\n");
    assert!(err.is_syntax());
    assert!(err.to_string().contains("cannot find string terminator"));
}

#[test]
fn bad_arrow() {
    let err = parse_err("$x->;");
    assert!(err.is_syntax());
}
