use super::config::FormConfig;
use super::Error;

/// What kind of reference a redirect target is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PathType {
    Unknown,
    Absolute,
    Relative,
    Uri,
}

pub(crate) fn classify(path: &str) -> PathType {
    let bytes = path.as_bytes();
    if bytes.is_empty() {
        PathType::Unknown
    } else if bytes[0] == b'/' {
        PathType::Absolute
    } else if bytes.len() >= 4 && bytes[..4].eq_ignore_ascii_case(b"http") {
        PathType::Uri
    } else {
        PathType::Relative
    }
}

// RFC 3986, section 5.2.4
fn remove_dot_segments(path: &str) -> String {
    let (absolute, rest) = match path.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, path),
    };

    let mut output: Vec<&str> = vec![];
    let mut trailing_slash = false;

    for segment in rest.split('/') {
        trailing_slash = false;
        match segment {
            "." => trailing_slash = true,
            ".." => {
                output.pop();
                trailing_slash = true;
            }
            _ => output.push(segment),
        }
    }

    if trailing_slash {
        output.push("");
    }

    let joined = output.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Merge a relative reference against the current resource path: drop the
/// last segment of `base`, append `relative` and normalize dot segments.
pub(crate) fn merge(base: &str, relative: &str) -> String {
    let directory = match base.rfind('/') {
        Some(idx) => &base[..=idx],
        None => "/",
    };

    remove_dot_segments(&format!("{}{}", directory, relative))
}

/// Apply a `Location` value to the configuration. The query component is
/// always discarded.
pub(crate) fn resolve_redirect(location: &str, config: &mut FormConfig) -> Result<PathType, Error> {
    let location = match location.split_once('?') {
        Some((path, _query)) => path,
        None => location,
    };

    let path_type = classify(location);
    match path_type {
        PathType::Relative => {
            let merged = merge(&config.resource_path, location);
            config.replace_resource_path(merged);
        }
        PathType::Uri => {
            // the full target becomes both the host header and the resource path
            config.host_header = location.to_owned();
            config.replace_resource_path(location.to_owned());
        }
        PathType::Absolute => config.replace_resource_path(location.to_owned()),
        PathType::Unknown => return Err(Error::UnresolvableRedirect(location.to_owned())),
    }

    log::debug!(
        "redirect {:?} resolved as {:?} -> {}",
        location,
        path_type,
        &config.resource_path
    );

    Ok(path_type)
}
