//! Built-in operator catalog: how each named operator takes its arguments.

/// Operators whose parsing does not fit a generic shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialForm {
    Print,
    Say,
    Printf,
    Return,
}

/// Argument shape of a named operator, looked up once per call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    /// Never takes arguments (`time`, `wantarray`).
    NoArgs,
    /// Named unary operator: nothing, or one argument at named-unary
    /// precedence (`shift`, `lc`, `defined`).
    ZeroOrOneArg,
    /// List operator: zero or more arguments (`die`, `reverse`).
    ListOp,
    /// Arguments follow a prototype over `$@;`.
    Prototype(&'static str),
    Special(SpecialForm),
}

/// Looks up a built-in operator by name.
#[must_use]
pub fn lookup(name: &str) -> Option<CallShape> {
    let shape = match name {
        "time" | "times" | "wantarray" | "wait" | "fork" | "getppid" => CallShape::NoArgs,

        "shift" | "pop" | "lc" | "uc" | "lcfirst" | "ucfirst" | "fc" | "length" | "defined"
        | "chr" | "ord" | "abs" | "int" | "sqrt" | "hex" | "oct" | "chomp" | "chop" | "ref"
        | "exit" | "undef" | "rand" | "srand" | "quotemeta" | "caller" | "close" | "chdir"
        | "rmdir" | "readline" | "localtime" | "gmtime" | "sleep" | "keys" | "values"
        | "each" | "exists" | "delete" | "log" | "exp" | "cos" | "sin" | "umask" => {
            CallShape::ZeroOrOneArg
        }

        "die" | "warn" | "reverse" | "unlink" | "chmod" | "chown" | "kill" | "push"
        | "unshift" | "splice" | "open" | "system" | "exec" | "utime"
        | "binmode" | "bless" => CallShape::ListOp,

        "scalar" => CallShape::Prototype("$"),
        "join" | "sprintf" | "pack" => CallShape::Prototype("$@"),
        "substr" => CallShape::Prototype("$$;$$"),
        "index" | "rindex" => CallShape::Prototype("$$;$"),
        "atan2" | "crypt" => CallShape::Prototype("$$"),
        "vec" => CallShape::Prototype("$$$"),

        "print" => CallShape::Special(SpecialForm::Print),
        "say" => CallShape::Special(SpecialForm::Say),
        "printf" => CallShape::Special(SpecialForm::Printf),
        "return" => CallShape::Special(SpecialForm::Return),

        _ => return None,
    };
    Some(shape)
}

/// Checks a prototype against the `$@;` alphabet. Returns the first bad
/// character, or `@` when it is not last.
#[must_use]
pub fn invalid_prototype_char(prototype: &str) -> Option<char> {
    let last = prototype.chars().count().saturating_sub(1);
    prototype
        .chars()
        .enumerate()
        .find(|&(i, ch)| !matches!(ch, '$' | '@' | ';') || (ch == '@' && i != last))
        .map(|(_, ch)| ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes() {
        assert_eq!(lookup("time"), Some(CallShape::NoArgs));
        assert_eq!(lookup("shift"), Some(CallShape::ZeroOrOneArg));
        assert_eq!(lookup("die"), Some(CallShape::ListOp));
        assert_eq!(lookup("substr"), Some(CallShape::Prototype("$$;$$")));
        assert_eq!(
            lookup("print"),
            Some(CallShape::Special(SpecialForm::Print))
        );
        assert_eq!(lookup("frobnicate"), None);
    }

    #[test]
    fn catalog_prototypes_are_well_formed() {
        for name in ["scalar", "join", "sprintf", "substr", "index", "atan2", "vec"] {
            let Some(CallShape::Prototype(proto)) = lookup(name) else {
                panic!("{name} should be prototype-driven");
            };
            assert_eq!(invalid_prototype_char(proto), None, "{name}");
        }
    }

    #[test]
    fn prototype_validation() {
        assert_eq!(invalid_prototype_char("$$;$"), None);
        assert_eq!(invalid_prototype_char(""), None);
        assert_eq!(invalid_prototype_char("$%"), Some('%'));
        assert_eq!(invalid_prototype_char("@$"), Some('@'));
    }
}
