use std::fs::File;
use std::io::{prelude::*, BufReader, Lines};

use crate::creds::expression::Expression;
use crate::session::Error;

pub(crate) trait Iterator: std::iter::Iterator<Item = String> + Send {
    fn search_space_size(&self) -> usize;
}

pub(crate) fn new(expr: Expression) -> Result<Box<dyn Iterator>, Error> {
    match expr {
        Expression::Constant { value } => Ok(Box::new(Constant::new(value))),
        Expression::Wordlist { filename } => Ok(Box::new(Wordlist::new(filename)?)),
    }
}

struct Constant {
    done: bool,
    value: String,
}

impl Constant {
    pub fn new(value: String) -> Self {
        Self { done: false, value }
    }
}

impl Iterator for Constant {
    fn search_space_size(&self) -> usize {
        1
    }
}

impl std::iter::Iterator for Constant {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            None
        } else {
            self.done = true;
            Some(self.value.to_owned())
        }
    }
}

struct Wordlist {
    lines: Lines<BufReader<File>>,
    current: usize,
    elements: usize,
}

impl Wordlist {
    pub fn new(path: String) -> Result<Self, Error> {
        log::debug!("loading wordlist from {} ...", &path);

        // count the number of lines first
        let file = File::open(&path).map_err(|e| e.to_string())?;
        let reader = BufReader::new(file);
        let elements = reader.lines().count();

        // create actual reader
        let file = File::open(path).map_err(|e| e.to_string())?;
        let reader = BufReader::new(file);

        Ok(Self {
            elements,
            current: 0,
            lines: reader.lines(),
        })
    }
}

impl Iterator for Wordlist {
    fn search_space_size(&self) -> usize {
        self.elements
    }
}

impl std::iter::Iterator for Wordlist {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current < self.elements {
            self.current += 1;
            match self.lines.next() {
                Some(Ok(line)) => return Some(line.trim_end_matches('\r').to_owned()),
                Some(Err(e)) => log::error!("could not read line: {:?}", e),
                None => {}
            }
        }
        None
    }
}
