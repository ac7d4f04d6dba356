//! Handshake admission by `Origin` header.
//!
//! The allow-list is a comma-separated list of substrings. Candidates are
//! evaluated in list order and the result of the **last** evaluated
//! candidate is the decision; an earlier match does not short-circuit.
//! Outside dev mode an origin containing `localhost` skips every
//! candidate and is therefore always refused.

/// Substring that is only admitted in dev mode.
const LOCALHOST: &str = "localhost";

/// Immutable origin admission policy, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginPolicy {
    candidates: Vec<String>,
    dev_mode: bool,
}

impl OriginPolicy {
    /// Builds a policy from a comma-separated allow-list.
    ///
    /// Entries are kept verbatim (no trimming). An empty allow-list yields
    /// a single empty candidate, which every origin contains.
    #[must_use]
    pub fn new(allow_list: &str, dev_mode: bool) -> Self {
        Self {
            candidates: allow_list.split(',').map(str::to_owned).collect(),
            dev_mode,
        }
    }

    /// Returns whether a handshake declaring `origin` may connect.
    ///
    /// A request without an `Origin` header should be evaluated with the
    /// empty string.
    #[must_use]
    pub fn is_allowed(&self, origin: &str) -> bool {
        let mut allowed = false;
        for candidate in &self.candidates {
            if !self.dev_mode && origin.contains(LOCALHOST) {
                continue;
            }
            allowed = origin.contains(candidate.as_str());
        }
        allowed
    }

    /// Returns the allow-list candidates in evaluation order.
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Returns `true` when localhost origins are admitted.
    #[must_use]
    pub const fn dev_mode(&self) -> bool {
        self.dev_mode
    }
}

impl Default for OriginPolicy {
    fn default() -> Self {
        Self::new("", false)
    }
}
