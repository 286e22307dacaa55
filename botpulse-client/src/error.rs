use thiserror::Error;

/// All errors generated in `botpulse-client`.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP transport failure: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned error status: {status}")]
    Api { status: u16 },

    #[error("session expired: server returned 401, credential cleared")]
    SessionExpired,

    #[error("token storage failure: {0}")]
    Storage(#[from] std::io::Error),
}

impl ClientError {
    /// Determine if an error ends the session and must stop the sync loop.
    ///
    /// Everything else is a refresh-batch failure: logged, previous data
    /// stays on screen.
    pub fn is_session_terminal(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_is_session_terminal() {
        struct TestCase {
            input: ClientError,
            expected: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: 401 ends the session
                input: ClientError::SessionExpired,
                expected: true,
            },
            TestCase {
                // TC1: other API statuses are refresh failures
                input: ClientError::Api { status: 503 },
                expected: false,
            },
            TestCase {
                // TC2: storage faults are refresh failures
                input: ClientError::Storage(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "token file",
                )),
                expected: false,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            assert_eq!(
                test.input.is_session_terminal(),
                test.expected,
                "TC{} failed",
                index
            );
        }
    }
}
