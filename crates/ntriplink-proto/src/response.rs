//! Caster response classification.
//!
//! After the handshake request is sent, the first chunk of text the caster
//! returns is captured and handed to [`classify`] exactly once per
//! connection attempt. The outcome decides whether the client proceeds to
//! the correction feed, retries with backoff, or latches a forced shutdown.

/// How the client should react to a classified response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// Handshake accepted; the correction feed follows.
    Success,
    /// Retry the connection, governed by the backoff schedule.
    Transient,
    /// Stop entirely; retrying wastes the caster's resources and ours.
    Permanent,
}

/// Classified caster response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// "200" with no error marker: the mount point stream is live.
    Success,
    /// "200" + "banned": the caster refuses this client outright.
    PermanentBan,
    /// "200" + "sandbox": redirected to a sandbox stream; worth retrying.
    SandboxRedirect,
    /// "200" + "sourcetable": the mount point does not exist, the caster
    /// answered with its source table instead.
    MountNotFound,
    /// "401": credentials rejected.
    Unauthorized,
    /// "406": the caster is still in its startup phase.
    StartupPhase,
    /// Some other non-empty response; treat as a caster-side error.
    CasterError,
    /// Nothing received before the response window closed.
    NoResponse,
}

impl ResponseOutcome {
    /// The retry class of this outcome.
    pub fn class(self) -> ResponseClass {
        match self {
            Self::Success => ResponseClass::Success,
            Self::SandboxRedirect | Self::StartupPhase | Self::NoResponse => {
                ResponseClass::Transient
            }
            Self::PermanentBan
            | Self::MountNotFound
            | Self::Unauthorized
            | Self::CasterError => ResponseClass::Permanent,
        }
    }

    /// Short name for logs and status output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::PermanentBan => "banned",
            Self::SandboxRedirect => "sandbox redirect",
            Self::MountNotFound => "mount point not found",
            Self::Unauthorized => "unauthorized",
            Self::StartupPhase => "caster starting up",
            Self::CasterError => "caster error",
            Self::NoResponse => "no response",
        }
    }
}

/// Classify the captured response text.
///
/// Matching is case-insensitive substring search, evaluated in priority
/// order: the "200" family first (ban, sandbox, sourcetable, then plain
/// success), then "401", then "406", then a catch-all split on whether any
/// bytes arrived at all.
pub fn classify(text: &str, bytes_received: usize) -> ResponseOutcome {
    let lower = text.to_ascii_lowercase();

    if lower.contains("200") {
        if lower.contains("banned") {
            return ResponseOutcome::PermanentBan;
        }
        if lower.contains("sandbox") {
            return ResponseOutcome::SandboxRedirect;
        }
        if lower.contains("sourcetable") {
            return ResponseOutcome::MountNotFound;
        }
        return ResponseOutcome::Success;
    }
    if lower.contains("401") {
        return ResponseOutcome::Unauthorized;
    }
    if lower.contains("406") {
        return ResponseOutcome::StartupPhase;
    }
    if bytes_received > 0 {
        return ResponseOutcome::CasterError;
    }
    ResponseOutcome::NoResponse
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_200_is_success() {
        assert_eq!(classify("ICY 200 OK\r\n\r\n", 14), ResponseOutcome::Success);
        assert_eq!(classify("HTTP/1.1 200 OK", 15), ResponseOutcome::Success);
    }

    #[test]
    fn banned_beats_success() {
        assert_eq!(
            classify("HTTP/1.1 200 OK\r\nYou have been BANNED\r\n", 40),
            ResponseOutcome::PermanentBan
        );
    }

    #[test]
    fn sandbox_beats_success() {
        assert_eq!(
            classify("200 OK redirected to SandBox stream", 35),
            ResponseOutcome::SandboxRedirect
        );
    }

    #[test]
    fn sourcetable_means_missing_mount_point() {
        assert_eq!(
            classify("SOURCETABLE 200 OK\r\nCAS;...\r\n", 29),
            ResponseOutcome::MountNotFound
        );
    }

    #[test]
    fn unauthorized_401() {
        assert_eq!(
            classify("HTTP/1.1 401 Unauthorized", 25),
            ResponseOutcome::Unauthorized
        );
    }

    #[test]
    fn startup_phase_406() {
        assert_eq!(
            classify("406 In Start Up Phase", 21),
            ResponseOutcome::StartupPhase
        );
    }

    #[test]
    fn unrecognized_text_is_caster_error() {
        assert_eq!(
            classify("HTTP/1.1 500 Internal Server Error", 34),
            ResponseOutcome::CasterError
        );
    }

    #[test]
    fn empty_response_is_no_response() {
        assert_eq!(classify("", 0), ResponseOutcome::NoResponse);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(
            classify("200 ok Banned", 13),
            ResponseOutcome::PermanentBan
        );
        assert_eq!(
            classify("200 sourcetable follows", 23),
            ResponseOutcome::MountNotFound
        );
    }

    #[test]
    fn ban_takes_priority_over_sandbox_and_sourcetable() {
        assert_eq!(
            classify("200 banned from sandbox sourcetable", 35),
            ResponseOutcome::PermanentBan
        );
    }

    #[test]
    fn classes_follow_failure_taxonomy() {
        use ResponseClass::*;
        assert_eq!(ResponseOutcome::Success.class(), Success);
        assert_eq!(ResponseOutcome::PermanentBan.class(), Permanent);
        assert_eq!(ResponseOutcome::MountNotFound.class(), Permanent);
        assert_eq!(ResponseOutcome::Unauthorized.class(), Permanent);
        assert_eq!(ResponseOutcome::CasterError.class(), Permanent);
        assert_eq!(ResponseOutcome::SandboxRedirect.class(), Transient);
        assert_eq!(ResponseOutcome::StartupPhase.class(), Transient);
        assert_eq!(ResponseOutcome::NoResponse.class(), Transient);
    }
}
