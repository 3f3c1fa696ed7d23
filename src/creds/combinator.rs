use std::fs::File;
use std::io::{BufRead, BufReader};

use itertools::Itertools;

use crate::{
    creds::{expression, iterator, Credentials, Expression},
    options::Options,
    session::Error,
};

/// Yields the credentials to test against a single target, user by user.
pub(crate) struct Combinator {
    description: String,
    product: Box<dyn Iterator<Item = Credentials> + Send>,
    search_space_size: usize,
}

impl Combinator {
    fn for_combinations(path: &str, separator: &str) -> Result<Self, Error> {
        log::debug!("loading combinations from {} ...", path);

        let file = File::open(path).map_err(|e| format!("could not open {}: {}", path, e))?;
        let mut combinations = vec![];

        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| e.to_string())?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }

            if let Some((username, password)) = line.split_once(separator) {
                combinations.push(Credentials {
                    username: username.to_owned(),
                    password: password.to_owned(),
                });
            } else {
                log::warn!(
                    "{}:{}: no '{}' separator found, skipping",
                    path,
                    idx + 1,
                    separator
                );
            }
        }

        Ok(Self {
            description: format!("combinations from {}", path),
            search_space_size: combinations.len(),
            product: Box::new(combinations.into_iter()),
        })
    }

    fn for_double_payload(user_expr: Expression, pass_expr: Expression) -> Result<Self, Error> {
        let users = iterator::new(user_expr.clone())?;
        let passwords: Vec<String> = iterator::new(pass_expr.clone())?.collect();
        let search_space_size = users.search_space_size() * passwords.len();

        let product = users
            .cartesian_product(passwords)
            .map(|(username, password)| Credentials { username, password });

        Ok(Self {
            description: format!("username -> {}, password -> {}", user_expr, pass_expr),
            search_space_size,
            product: Box::new(product),
        })
    }

    pub fn from_options(options: &Options) -> Result<Self, Error> {
        if let Some(path) = options.combinations.as_ref() {
            return Self::for_combinations(path, &options.separator);
        }

        let Some(username) = options.username.as_ref() else {
            return Err("no --username or --combinations argument provided".to_owned());
        };
        let Some(password) = options.password.as_ref() else {
            return Err("no --password or --combinations argument provided".to_owned());
        };

        Self::for_double_payload(
            expression::parse_expression(username),
            expression::parse_expression(password),
        )
    }

    pub fn search_space_size(&self) -> usize {
        self.search_space_size
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Iterator for Combinator {
    type Item = Credentials;

    fn next(&mut self) -> Option<Self::Item> {
        self.product.next()
    }
}
