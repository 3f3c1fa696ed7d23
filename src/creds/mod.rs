mod combinator;
mod expression;
mod iterator;

pub(crate) use combinator::Combinator;
pub(crate) use expression::{parse_expression, Expression};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, PartialEq, PartialOrd, Default, Clone, Debug)]
pub(crate) struct Credentials {
    pub username: String,
    pub password: String,
}
