//! User-facing texts of the event-detail screen.

use freizeit_api::ApiError;

/// Title of every error alert
pub const ERROR_TITLE: &str = "Fehler";

/// Prompt title when an action needs a logged-in user
pub const LOGIN_REQUIRED_TITLE: &str = "Anmeldung erforderlich";
/// Prompt text when an action needs a logged-in user
pub const LOGIN_REQUIRED_MESSAGE: &str = "Bitte melde dich an, um teilzunehmen.";

/// Prompt title when the event is at capacity
pub const EVENT_FULL_TITLE: &str = "Event ausgebucht";
/// Prompt text when the event is at capacity
pub const EVENT_FULL_MESSAGE: &str =
    "Dieses Event ist bereits voll. Es sind keine Plätze mehr frei.";

/// Alert title after a successful join
pub const JOINED_TITLE: &str = "Angemeldet";
/// Alert text after a successful join
pub const JOINED_MESSAGE: &str = "Du nimmst jetzt am Event teil.";

/// Alert title after a successful leave
pub const LEFT_TITLE: &str = "Abgemeldet";
/// Alert text after a successful leave
pub const LEFT_MESSAGE: &str = "Du hast deine Teilnahme erfolgreich beendet.";

/// Alert text when leaving failed
pub const LEAVE_FAILED: &str = "Abmelden fehlgeschlagen.";

/// Replacement for join errors that only carry a status code
pub const JOIN_NOT_POSSIBLE: &str = "Teilnahme nicht möglich. Das Event könnte voll sein oder du erfüllst die Altersanforderungen nicht.";

/// Alert text when a comment could not be saved
pub const COMMENT_FAILED: &str = "Kommentar konnte nicht gespeichert werden.";

/// Alert text when a comment could not be deleted
pub const COMMENT_DELETE_FAILED: &str = "Kommentar konnte nicht gelöscht werden.";

/// Best message to show for a failed join
///
/// The backend answers a full event or an unmet age requirement with a bare
/// 400, so opaque errors get the likely explanation instead.
#[must_use]
pub fn clarify_join_error(error: &ApiError) -> String {
    if error.is_opaque() {
        JOIN_NOT_POSSIBLE.to_string()
    } else {
        error.to_string()
    }
}

/// Best message for a failed comment operation
///
/// Backend validation messages are shown as-is, anything else gets `fallback`.
#[must_use]
pub fn comment_error(error: &ApiError, fallback: &str) -> String {
    match error {
        ApiError::Rejected { message, .. } if !error.is_opaque() => message.clone(),
        ApiError::Unreachable { .. } | ApiError::Unauthorized | ApiError::Forbidden => {
            error.to_string()
        },
        _ => fallback.to_string(),
    }
}
