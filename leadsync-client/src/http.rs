//! Shared HTTP plumbing for both store adapters.

use std::time::Duration;

use leadsync_core::SourceError;

/// Per-call timeout. A timeout is an ordinary transport failure for that call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("leadsync/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Map a ureq failure to a [`SourceError`].
///
/// `endpoint` must be a label without credentials; Trello carries its key and
/// token in the query string, so the request URL itself is never used.
pub(crate) fn call_err(endpoint: &str, err: ureq::Error) -> SourceError {
    match err {
        ureq::Error::Status(404, _) => SourceError::NotFound(endpoint.to_string()),
        ureq::Error::Status(status, response) => SourceError::Status {
            endpoint: endpoint.to_string(),
            status,
            body: truncate(response.into_string().unwrap_or_default()),
        },
        ureq::Error::Transport(transport) => SourceError::Transport {
            endpoint: endpoint.to_string(),
            message: transport.to_string(),
        },
    }
}

pub(crate) fn decode_err(endpoint: &str, err: impl std::fmt::Display) -> SourceError {
    SourceError::Decode {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    }
}

fn truncate(mut body: String) -> String {
    const MAX: usize = 512;
    if body.len() > MAX {
        let mut cut = MAX;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_bodies_are_cut_on_a_char_boundary() {
        let body = "é".repeat(400);
        let cut = truncate(body);
        assert!(cut.ends_with('…'));
        assert!(cut.len() <= 512 + '…'.len_utf8());
    }

    #[test]
    fn short_bodies_are_kept() {
        assert_eq!(truncate("nope".to_string()), "nope");
    }
}
