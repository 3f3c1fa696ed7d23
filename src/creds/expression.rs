use std::fmt;
use std::path::Path;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Expression {
    Constant { value: String },
    Wordlist { filename: String },
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Constant { value } => write!(f, "string '{}'", value),
            Expression::Wordlist { filename } => write!(f, "wordlist {}", filename),
        }
    }
}

/// A path to an existing file is a wordlist, anything else a constant.
pub(crate) fn parse_expression(expr: &str) -> Expression {
    if Path::new(expr).is_file() {
        Expression::Wordlist {
            filename: expr.to_owned(),
        }
    } else {
        Expression::Constant {
            value: expr.to_owned(),
        }
    }
}
