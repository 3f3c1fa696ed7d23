use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::session::Error;

pub(crate) mod net;

pub(crate) fn parse_target(target: &str, default_port: u16) -> Result<(String, u16), Error> {
    if target.contains(' ') || target.contains(',') {
        return Err(format!("'{}' is not a valid target", target));
    }

    let num_colons = target.matches(':').count();
    let (address, port) = if num_colons <= 1 {
        // domain or ipv4
        if let Some((ip, prt)) = target.rsplit_once(':') {
            (
                ip.to_owned(),
                prt.parse::<u16>().map_err(|e| e.to_string())?,
            )
        } else {
            (target.to_owned(), default_port)
        }
    } else {
        // ipv6
        if let Some((ip, prt)) = target.rsplit_once("]:") {
            (
                ip.strip_prefix('[')
                    .ok_or("invalid [ipv6]:port provided".to_string())?
                    .to_owned(),
                prt.parse::<u16>().map_err(|e| e.to_string())?,
            )
        } else {
            (
                target
                    .trim_start_matches('[')
                    .trim_end_matches(']')
                    .to_owned(),
                default_port,
            )
        }
    };

    if address.is_empty() {
        return Err(format!("'{}' is not a valid target", target));
    }

    Ok((address, port))
}

fn parse_multiple_targets_atom(expression: &str) -> Result<Vec<String>, Error> {
    if let Some(path) = expression.strip_prefix('@') {
        // load from file
        let file = File::open(path).map_err(|e| format!("could not open {}: {}", path, e))?;
        let reader = BufReader::new(file);

        Ok(reader
            .lines()
            .map(|l| l.unwrap_or_default().trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect())
    } else {
        Ok(vec![expression.to_owned()])
    }
}

/// Comma separated list of targets, `@filename` loads one target per line.
pub(crate) fn parse_multiple_targets(expression: &str) -> Result<Vec<String>, Error> {
    let mut all = vec![];

    for atom in expression
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
    {
        all.extend(parse_multiple_targets_atom(atom)?);
    }

    Ok(all)
}
